//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tutorkit_core::traits::TextGenerator;

use crate::cohere::CohereProvider;
use crate::ollama::OllamaProvider;

/// Configuration for a single text-generation backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure
/// in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Cohere {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cohere {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Cohere")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level tutorkit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Backend configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default backend to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// SQLite database path for conversations and tests.
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_provider() -> String {
    "cohere".to_string()
}
fn default_model() -> String {
    "command-r-plus".to_string()
}
fn default_database_url() -> String {
    "tutorkit.db".to_string()
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            database_url: default_database_url(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Cohere { api_key, base_url } => ProviderConfig::Cohere {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tutorkit.toml` in the current directory
/// 2. `~/.config/tutorkit/config.toml`
///
/// Environment variable override: `TUTORKIT_COHERE_KEY`.
pub fn load_config() -> Result<TutorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TutorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("tutorkit.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<TutorConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TutorConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("TUTORKIT_COHERE_KEY") {
        config
            .providers
            .entry("cohere".into())
            .or_insert(ProviderConfig::Cohere {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Cohere { api_key, .. }) = config.providers.get_mut("cohere") {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tutorkit"))
}

/// Create a generator instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn TextGenerator>> {
    match config {
        ProviderConfig::Cohere { api_key, base_url } => {
            Ok(Arc::new(CohereProvider::new(api_key, base_url.clone())))
        }
        ProviderConfig::Ollama { base_url } => Ok(Arc::new(OllamaProvider::new(base_url))),
    }
}
