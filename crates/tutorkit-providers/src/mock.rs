//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tutorkit_core::traits::{Completion, CompletionRequest, TextGenerator};

/// A mock text generator for exercising the pipeline without real API
/// calls.
///
/// Returns configurable replies based on prompt content matching, or
/// fails every call when built with `failing`.
pub struct MockProvider {
    /// Map of prompt substring to canned reply.
    responses: HashMap<String, String>,
    /// Default reply if no prompt matches.
    default_response: String,
    /// When set, every call fails with this message.
    failure: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    /// Create a mock with the given prompt-substring to reply mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: "Let's keep learning together!".to_string(),
            failure: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: response.to_string(),
            failure: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock whose every call fails, for exercising the
    /// degraded-service paths.
    pub fn failing(message: &str) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: String::new(),
            failure: Some(message.to_string()),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request made to this provider.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }

        let text = self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        Ok(Completion {
            text,
            model: request.model.clone(),
            latency_ms: 1,
        })
    }
}
