//! HTTP client for OpenAI-compatible chat-completion endpoints.
//!
//! Wraps `reqwest` with bearer auth, provider error extraction and retry.
//! Non-2xx responses become [`LlmError::Status`] carrying the provider's
//! `error.message` when the body has one.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::LlmError;
use crate::retry::retry_with_backoff;
use crate::types::{ChatCompletion, ChatRequest};

/// Transport settings shared by every [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable errors. `0` disables retry.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            user_agent: "versus/0.1 (product-comparison)".to_owned(),
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

/// Client for one chat-completion provider.
///
/// Holds the HTTP client, API key and the resolved `/chat/completions` URL.
/// Point `base_url` at a mock server in tests.
pub struct ChatClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ChatClient {
    /// Creates a client for the provider rooted at `base_url`
    /// (for example `https://api.groq.com/openai/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`LlmError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn new(api_key: &str, base_url: &str, options: &ClientOptions) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .build()?;

        let endpoint = Self::endpoint_url(base_url)?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            max_retries: options.max_retries,
            backoff_base_ms: options.backoff_base_ms,
        })
    }

    /// The URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one chat-completion request, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Status`] on a non-2xx response (after retries for 429/5xx).
    /// - [`LlmError::Http`] on network failure.
    /// - [`LlmError::Deserialize`] if the body is not a chat-completion object.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            max_tokens = request.max_tokens,
            "sending chat completion"
        );

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;

            if !status.is_success() {
                return Err(LlmError::Status {
                    status: status.as_u16(),
                    message: extract_error_message(&body),
                });
            }

            serde_json::from_str::<ChatCompletion>(&body).map_err(|e| LlmError::Deserialize {
                context: format!("chat completion from {}", self.endpoint),
                source: e,
            })
        })
        .await
    }

    /// Resolves `{base_url}/chat/completions`, tolerating a trailing slash.
    fn endpoint_url(base_url: &str) -> Result<Url, LlmError> {
        let normalised = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        Url::parse(&normalised).map_err(|e| LlmError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Handles `{"error": {"message": "..."}}`, `{"error": "..."}` and
/// `{"message": "..."}`. Returns `None` for anything else.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error");
    error
        .and_then(|e| e.get("message"))
        .and_then(serde_json::Value::as_str)
        .or_else(|| error.and_then(serde_json::Value::as_str))
        .or_else(|| value.get("message").and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
