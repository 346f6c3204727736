//! tutorkit-providers — Generative-model backends.
//!
//! Implements the `TextGenerator` trait for the Cohere API and local
//! Ollama models, plus a mock backend for exercising the pipeline in
//! tests without network access.

pub mod cohere;
pub mod config;
pub mod error;
pub mod mock;
pub mod ollama;

pub use config::{create_provider, load_config, ProviderConfig, TutorConfig};
pub use error::ProviderError;
