//! Completion provider client - request building and response parsing.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. The prior
//! conversation is sent as context, capped to the configured history window.

use async_trait::async_trait;
use tracing::debug;

use parley_core::config::CompletionConfig;
use parley_core::types::{Message, Role};

use crate::error::LlmError;
use crate::resolver::ReplyResolver;

/// HTTP client for the configured completion provider.
pub struct CompletionClient {
    config: CompletionConfig,
    /// Messages of prior history included as context.
    history_window: usize,
    http: reqwest::Client,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.config.api_base)
            .field("model", &self.config.model)
            .finish()
    }
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self::with_history_window(config, 20)
    }

    pub fn with_history_window(config: CompletionConfig, history_window: usize) -> Self {
        Self {
            config,
            history_window,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// The chat completions endpoint for the configured base URL.
    pub(crate) fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    /// Build the JSON request body: system prompt, then the most recent
    /// window of history, then the new user turn.
    pub(crate) fn build_request_body(
        &self,
        message: &str,
        history: &[Message],
    ) -> serde_json::Value {
        let mut msgs = Vec::new();

        if !self.config.system_prompt.is_empty() {
            msgs.push(serde_json::json!({
                "role": "system",
                "content": self.config.system_prompt,
            }));
        }

        let start = history.len().saturating_sub(self.history_window);
        for msg in &history[start..] {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            msgs.push(serde_json::json!({
                "role": role,
                "content": msg.content,
            }));
        }

        msgs.push(serde_json::json!({
            "role": "user",
            "content": message,
        }));

        serde_json::json!({
            "model": self.config.model,
            "messages": msgs,
            "temperature": self.config.temperature,
        })
    }

    /// Extract the assistant's text from a chat completions response.
    pub(crate) fn parse_reply(json: serde_json::Value) -> Result<String, LlmError> {
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| LlmError::Parse("no message content in response".to_string()))
    }
}

#[async_trait]
impl ReplyResolver for CompletionClient {
    async fn resolve(&self, message: &str, history: &[Message]) -> Result<String, LlmError> {
        let body = self.build_request_body(message, history);

        debug!(model = %self.config.model, history_len = history.len(), "Completion request");

        let response = self
            .http
            .post(self.api_url())
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.as_deref().unwrap_or_default()),
            )
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(LlmError::Api(format!("HTTP {status}: {text}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Self::parse_reply(json)
    }
}
