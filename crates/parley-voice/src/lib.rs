//! Voice bridge for Parley - hosted speech-to-text and text-to-speech.
//!
//! Wraps an ElevenLabs-style HTTP API. The bridge only exists when an API
//! key is configured; without one the voice endpoints degrade (no audio in
//! replies, transcription reports failure) rather than erroring the server.

pub mod error;
pub mod speech;

pub use error::VoiceError;
pub use speech::SpeechClient;
