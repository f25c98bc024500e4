//! Error types for the session store.

use parley_core::error::ParleyError;
use parley_core::types::SessionId;

/// Errors from session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(SessionId),
}

impl From<SessionError> for ParleyError {
    fn from(err: SessionError) -> Self {
        ParleyError::Session(err.to_string())
    }
}
