//! Error types for the completion provider path.

use parley_core::error::ParleyError;

/// Errors from resolving a reply through the completion provider.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),
    #[error("provider error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("rate limited by provider")]
    RateLimited,
}

impl From<LlmError> for ParleyError {
    fn from(err: LlmError) -> Self {
        ParleyError::Completion(err.to_string())
    }
}
