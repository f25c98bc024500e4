//! Error types for the voice bridge.

use parley_core::error::ParleyError;

/// Errors from the speech provider.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("transcription failed: {0}")]
    Transcription(String),
    #[error("synthesis failed: {0}")]
    Synthesis(String),
}

impl From<VoiceError> for ParleyError {
    fn from(err: VoiceError) -> Self {
        ParleyError::Speech(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            VoiceError::Transcription("HTTP 500".to_string()).to_string(),
            "transcription failed: HTTP 500"
        );
        assert_eq!(
            VoiceError::Synthesis("HTTP 401".to_string()).to_string(),
            "synthesis failed: HTTP 401"
        );
    }

    #[test]
    fn test_conversion_to_parley_error() {
        let err: ParleyError = VoiceError::Synthesis("timeout".to_string()).into();
        assert!(matches!(err, ParleyError::Speech(_)));
        assert!(err.to_string().contains("timeout"));
    }
}
