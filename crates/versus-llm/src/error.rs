use thiserror::Error;

/// Errors returned by [`crate::ChatClient`].
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    ///
    /// `message` carries `error.message` from the response body when the
    /// provider sent one.
    #[error("provider returned HTTP {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Status { status: u16, message: Option<String> },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL is not usable.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl LlmError {
    /// The provider's own error message, if the failure carried one.
    #[must_use]
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            LlmError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
