//! Collaborator trait definitions.
//!
//! The core never talks to a database or a model service directly: it is
//! handed these traits at construction. `tutorkit-storage` implements the
//! two store traits on SQLite; `tutorkit-providers` implements
//! `TextGenerator` for Cohere, Ollama, and a test mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::model::{NewTest, Submission, TestRecord, Turn};

// ---------------------------------------------------------------------------
// Text generator trait
// ---------------------------------------------------------------------------

/// A generative text backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name (e.g. "cohere").
    fn name(&self) -> &str;

    /// Produce a completion for a fully rendered prompt. May fault; the
    /// gateway decides what callers see.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion>;
}

/// Request for one completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "command-r-plus").
    pub model: String,
    /// The fully assembled prompt.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Stop sequences (empty = let the model finish).
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

/// Response from a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The raw generated text.
    pub text: String,
    /// Model that actually produced the text.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

// ---------------------------------------------------------------------------
// Storage traits
// ---------------------------------------------------------------------------

/// Per-student, append-only conversation log.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append one turn to the student's log.
    async fn append(&self, student_id: &str, turn: &Turn) -> Result<(), StorageError>;

    /// Up to `limit` most recent turns, newest first. Callers wanting
    /// chronological order go through `HistoryFetcher`.
    async fn query_recent(&self, student_id: &str, limit: u32) -> Result<Vec<Turn>, StorageError>;
}

/// Per-student catalog of practice tests.
#[async_trait]
pub trait TestStore: Send + Sync {
    /// Persist a new test and return its generated id.
    async fn create(&self, student_id: &str, test: &NewTest) -> Result<String, StorageError>;

    /// Look up one test. `None` when the (student, test) pair is unknown.
    async fn get(
        &self,
        student_id: &str,
        test_id: &str,
    ) -> Result<Option<TestRecord>, StorageError>;

    /// Mark the test completed and attach the graded submission.
    /// A second submission against the same id overwrites the first.
    async fn record_submission(
        &self,
        student_id: &str,
        test_id: &str,
        submission: &Submission,
    ) -> Result<(), StorageError>;

    /// All of the student's tests, ordered by creation time ascending.
    async fn list_all(&self, student_id: &str) -> Result<Vec<TestRecord>, StorageError>;
}
