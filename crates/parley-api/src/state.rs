//! Application state shared across all route handlers.
//!
//! AppState holds references to all services and shared resources.
//! It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use parley_core::config::ParleyConfig;
use parley_llm::{resolver_from_config, ReplyResolver};
use parley_session::{MemoryStore, SessionStore};
use parley_voice::SpeechClient;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. The config
/// is immutable after startup; mutable state lives inside the session store.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<ParleyConfig>,
    /// Per-session message history.
    pub store: Arc<dyn SessionStore>,
    /// Reply resolution, chosen at startup (provider or echo).
    pub resolver: Arc<dyn ReplyResolver>,
    /// Voice bridge; `None` when no speech key is configured.
    pub speech: Option<Arc<SpeechClient>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Build the state from configuration, wiring the default services.
    pub fn from_config(config: ParleyConfig) -> Self {
        let resolver = resolver_from_config(&config.completion, config.chat.history_window);
        let speech = SpeechClient::from_config(&config.speech).map(Arc::new);
        Self {
            config: Arc::new(config),
            store: Arc::new(MemoryStore::new()),
            resolver,
            speech,
            start_time: Instant::now(),
        }
    }

    /// Replace the resolver. Used by tests to pin a deterministic reply.
    pub fn with_resolver(mut self, resolver: Arc<dyn ReplyResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}
