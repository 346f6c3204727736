//! Cohere API provider implementation.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tutorkit_core::traits::{Completion, CompletionRequest, TextGenerator};

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.cohere.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Cohere generate-API provider.
pub struct CohereProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl CohereProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        }
    }
}

#[derive(Serialize)]
struct CohereRequest {
    model: String,
    prompt: String,
    max_tokens: u32,
    temperature: f64,
    /// 0 lets the model sample from its full vocabulary.
    k: u32,
    stop_sequences: Vec<String>,
}

#[derive(Deserialize)]
struct CohereResponse {
    generations: Vec<CohereGeneration>,
}

#[derive(Deserialize)]
struct CohereGeneration {
    text: String,
}

#[derive(Deserialize)]
struct CohereError {
    message: String,
}

#[async_trait]
impl TextGenerator for CohereProvider {
    fn name(&self) -> &str {
        "cohere"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        let start = Instant::now();

        let body = CohereRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            k: 0,
            stop_sequences: request.stop_sequences.clone(),
        };

        let response = self
            .client
            .post(format!("{}/v1/generate", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body).into());
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(request.model.clone()).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CohereError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(ProviderError::ApiError { status, message }.into());
        }

        let api_response: CohereResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let text = api_response
            .generations
            .first()
            .map(|g| g.text.clone())
            .unwrap_or_default();

        Ok(Completion {
            text,
            model: request.model.clone(),
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_request() -> CompletionRequest {
        CompletionRequest {
            model: "command-r-plus".into(),
            prompt: "Explain fractions simply.".into(),
            max_tokens: 220,
            temperature: 0.6,
            stop_sequences: vec![],
        }
    }

    #[tokio::test]
    async fn successful_completion() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "id": "gen-1",
            "generations": [{"id": "g-1", "text": "A fraction is a part of a whole."}]
        });

        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = CohereProvider::new("test-key", Some(server.uri()));
        let completion = provider.complete(&make_request()).await.unwrap();
        assert_eq!(completion.text, "A fraction is a part of a whole.");
        assert_eq!(completion.model, "command-r-plus");
    }

    #[tokio::test]
    async fn empty_generations_yield_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"generations": []})),
            )
            .mount(&server)
            .await;

        let provider = CohereProvider::new("test-key", Some(server.uri()));
        let completion = provider.complete(&make_request()).await.unwrap();
        assert!(completion.text.is_empty());
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api token"))
            .mount(&server)
            .await;

        let provider = CohereProvider::new("bad-key", Some(server.uri()));
        let err = provider.complete(&make_request()).await.unwrap_err();
        assert!(err.to_string().contains("authentication"));
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
            .mount(&server)
            .await;

        let provider = CohereProvider::new("test-key", Some(server.uri()));
        let err = provider.complete(&make_request()).await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn api_error_uses_body_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"message": "internal failure"})),
            )
            .mount(&server)
            .await;

        let provider = CohereProvider::new("test-key", Some(server.uri()));
        let err = provider.complete(&make_request()).await.unwrap_err();
        assert!(err.to_string().contains("internal failure"));
    }
}
