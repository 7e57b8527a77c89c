use thiserror::Error;
use versus_llm::LlmError;

/// Errors that end a comparison run.
///
/// Only validation, research and synthesis failures reach the caller.
/// Spelling correction and follow-up resolution degrade silently and never
/// produce one of these.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Please enter at least {min} items to compare")]
    TooFewItems { min: usize, got: usize },

    #[error("Please limit comparison to {max} items or fewer")]
    TooManyItems { max: usize, got: usize },

    /// One item's research call failed; the whole run is aborted.
    #[error("Failed to search for \"{item}\": {reason}")]
    Research {
        item: String,
        reason: String,
        #[source]
        source: Option<LlmError>,
    },

    #[error("Comparison generation failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("comparison run was cancelled")]
    Cancelled,

    #[error("failed to build provider client: {0}")]
    Client(#[from] LlmError),
}

/// Why the synthesis step could not produce comparison data.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("{message}")]
    Provider {
        message: String,
        #[source]
        source: LlmError,
    },

    #[error("No response from AI")]
    EmptyResponse,

    #[error("Failed to parse comparison data")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid comparison data structure: {reason}")]
    InvalidStructure { reason: String },
}

impl CompareError {
    /// `true` for errors raised before any network call was made.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CompareError::TooFewItems { .. } | CompareError::TooManyItems { .. }
        )
    }
}
