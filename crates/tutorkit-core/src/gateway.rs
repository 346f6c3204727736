//! Generation gateway: the one place the core calls the text model.
//!
//! The gateway owns the sampling policy and the degraded-service
//! guarantee: `generate` never fails. A model outage turns into an
//! apology reply, not an aborted chat turn.

use std::sync::Arc;

use crate::traits::{CompletionRequest, TextGenerator};

/// Replies stay concise: roughly a short tutoring paragraph.
pub const REPLY_MAX_TOKENS: u32 = 220;

/// Helpful but reasonably creative.
pub const REPLY_TEMPERATURE: f64 = 0.6;

/// Invokes the injected generator with fixed sampling parameters and
/// normalizes whatever comes back.
#[derive(Clone)]
pub struct GenerationGateway {
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl GenerationGateway {
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// Generate a reply for a fully assembled prompt. Never fails: any
    /// fault is absorbed into a user-facing apology string that embeds
    /// the fault description.
    pub async fn generate(&self, prompt: &str) -> String {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            max_tokens: REPLY_MAX_TOKENS,
            temperature: REPLY_TEMPERATURE,
            stop_sequences: Vec::new(),
        };

        match self.generator.complete(&request).await {
            Ok(completion) => {
                tracing::debug!(
                    backend = self.generator.name(),
                    model = %completion.model,
                    latency_ms = completion.latency_ms,
                    "generation succeeded"
                );
                normalize_reply(&completion.text)
            }
            Err(e) => {
                tracing::warn!(
                    backend = self.generator.name(),
                    error = %e,
                    "generation failed, returning apology reply"
                );
                format!("Oops, I'm having trouble thinking right now: {e:#}")
            }
        }
    }
}

/// Trim the reply and collapse runs of three or more newlines down to a
/// single blank line. Cosmetic normalization of model output.
fn normalize_reply(raw: &str) -> String {
    let mut text = raw.trim().to_string();
    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }
    text
}
