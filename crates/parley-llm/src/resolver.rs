//! The reply resolver trait and its configuration-time selection.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use parley_core::config::CompletionConfig;
use parley_core::types::Message;

use crate::client::CompletionClient;
use crate::echo::EchoResolver;
use crate::error::LlmError;

/// Produces an assistant reply for a user message and its prior history.
#[async_trait]
pub trait ReplyResolver: Send + Sync {
    async fn resolve(&self, message: &str, history: &[Message]) -> Result<String, LlmError>;
}

/// Select the resolver from configuration.
///
/// This branch is taken exactly once, at startup. Requests never switch
/// resolver: a provider failure mid-call is an error, not a cue to echo,
/// so outages are not masked as "no key configured".
pub fn resolver_from_config(
    config: &CompletionConfig,
    history_window: usize,
) -> Arc<dyn ReplyResolver> {
    if config.is_configured() {
        info!(model = %config.model, "Completion provider configured");
        Arc::new(CompletionClient::with_history_window(
            config.clone(),
            history_window,
        ))
    } else {
        info!("No completion credential - echo fallback active");
        Arc::new(EchoResolver)
    }
}
