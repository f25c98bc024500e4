//! Deterministic echo reply for running without provider credentials.

use async_trait::async_trait;

use parley_core::types::Message;

use crate::error::LlmError;
use crate::resolver::ReplyResolver;

/// Reflects the user's message back with an `echo: ` prefix.
///
/// Identical input always produces identical output, so the server is fully
/// exercisable (and testable) with no credentials at all.
pub struct EchoResolver;

impl EchoResolver {
    pub fn reply(message: &str) -> String {
        format!("echo: {}", message)
    }
}

#[async_trait]
impl ReplyResolver for EchoResolver {
    async fn resolve(&self, message: &str, _history: &[Message]) -> Result<String, LlmError> {
        Ok(Self::reply(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_prefixes_message() {
        let reply = EchoResolver.resolve("hello", &[]).await.unwrap();
        assert_eq!(reply, "echo: hello");
    }

    #[tokio::test]
    async fn test_echo_is_deterministic() {
        let first = EchoResolver.resolve("same input", &[]).await.unwrap();
        let second = EchoResolver.resolve("same input", &[]).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_echo_ignores_history() {
        let history = vec![Message::user("earlier"), Message::assistant("echo: earlier")];
        let with = EchoResolver.resolve("now", &history).await.unwrap();
        let without = EchoResolver.resolve("now", &[]).await.unwrap();
        assert_eq!(with, without);
    }

    #[tokio::test]
    async fn test_echo_preserves_unicode() {
        let reply = EchoResolver
            .resolve("caf\u{00e9} \u{1f44b}", &[])
            .await
            .unwrap();
        assert_eq!(reply, "echo: caf\u{00e9} \u{1f44b}");
    }
}
