//! OpenAI-compatible chat completions provider
//!
//! Sends the whole prompt as a single user message to
//! `{endpoint}/v1/chat/completions` and returns the first choice.

use crate::{backoff_delay, LlmError, LlmProvider, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Chat completions API provider
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    temperature: f32,
    max_retries: u32,
    retry_base: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider for `model` authenticated with `api_key`
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client: build_client(DEFAULT_TIMEOUT_SECS),
            temperature: 0.0,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base: Duration::from_secs(1),
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.client = build_client(secs);
        self
    }

    /// Set the first backoff delay (doubles on each retry)
    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    async fn attempt(&self, url: &str, body: &ChatRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Authentication(text),
                StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(self.model.clone()),
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
                _ => LlmError::Communication(format!("HTTP {}: {}", status, text)),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Transport failures, rate limits and server errors are worth another try
fn is_retryable(error: &LlmError) -> bool {
    matches!(
        error,
        LlmError::Communication(_) | LlmError::RateLimitExceeded
    )
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt(&url, &body).await {
                Ok(answer) => {
                    debug!("{} answered with {} chars", self.model, answer.len());
                    return Ok(answer);
                }
                Err(e) if is_retryable(&e) && attempts < self.max_retries => {
                    let delay = backoff_delay(self.retry_base, attempts);
                    warn!("{} (attempt {}), retrying in {:?}", e, attempts, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4",
            messages: vec![ChatMessage {
                role: "user",
                content: "Find dates",
            }],
            temperature: 0.0,
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Find dates");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"- Date: x"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("- Date: x"));
    }

    #[test]
    fn test_retry_classification() {
        assert!(is_retryable(&LlmError::RateLimitExceeded));
        assert!(is_retryable(&LlmError::Communication("reset".into())));
        assert!(!is_retryable(&LlmError::Authentication("bad key".into())));
        assert!(!is_retryable(&LlmError::ModelNotAvailable("gpt-9".into())));
    }

    #[test]
    fn test_builders() {
        let provider = OpenAiProvider::new("https://example.test/", "gpt-4", "sk-test")
            .with_temperature(0.2)
            .with_max_retries(5);
        assert_eq!(provider.endpoint, "https://example.test");
        assert_eq!(provider.model_name(), "gpt-4");
        assert_eq!(provider.temperature, 0.2);
        assert_eq!(provider.max_retries, 5);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let provider = OpenAiProvider::new("http://127.0.0.1:9", "gpt-4", "sk-test")
            .with_max_retries(2)
            .with_retry_base(Duration::from_millis(1));

        let result = provider.generate("test").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
