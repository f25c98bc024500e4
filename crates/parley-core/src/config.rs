use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ParleyError, Result};

/// Top-level configuration for the Parley application.
///
/// Loaded from `parley.toml` by default. Every value can also be supplied via
/// environment variables (see [`ParleyConfig::apply_env_overrides`]), which
/// take precedence over the file so the server can run with no config file at
/// all, as the original deployment did.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub completion: CompletionConfig,
    pub speech: SpeechConfig,
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            chat: ChatConfig::default(),
            completion: CompletionConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl ParleyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParleyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ParleyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overlay environment variables on top of the file-loaded values.
    ///
    /// The lookup is injected so tests can pass a plain map instead of
    /// mutating process-global environment state. Recognized keys match the
    /// original deployment contract:
    ///
    /// | Variable              | Field                       |
    /// |-----------------------|-----------------------------|
    /// | `PARLEY_PORT`         | `server.port`               |
    /// | `ALLOW_ORIGIN`        | `server.allow_origin`       |
    /// | `NIM_API_KEY`         | `completion.api_key`        |
    /// | `NIM_API_BASE`        | `completion.api_base`       |
    /// | `MODEL_NAME`          | `completion.model`          |
    /// | `ELEVENLABS_API_KEY`  | `speech.api_key`            |
    /// | `ELEVENLABS_VOICE_ID` | `speech.voice_id`           |
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PARLEY_PORT").and_then(|v| v.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(origin) = lookup("ALLOW_ORIGIN") {
            self.server.allow_origin = origin;
        }
        if let Some(key) = lookup("NIM_API_KEY") {
            self.completion.api_key = Some(key);
        }
        if let Some(base) = lookup("NIM_API_BASE") {
            self.completion.api_base = base;
        }
        if let Some(model) = lookup("MODEL_NAME") {
            self.completion.model = model;
        }
        if let Some(key) = lookup("ELEVENLABS_API_KEY") {
            self.speech.api_key = Some(key);
        }
        if let Some(voice) = lookup("ELEVENLABS_VOICE_ID") {
            self.speech.voice_id = voice;
        }
    }

    /// Overlay the process environment. Thin wrapper for the composition root.
    pub fn apply_process_env(&mut self) {
        self.apply_env_overrides(|key| std::env::var(key).ok());
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to bind.
    pub port: u16,
    /// Browser origin allowed by CORS (the frontend dev server).
    pub allow_origin: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            allow_origin: "http://localhost:3000".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Chat turn limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum accepted message length in characters.
    pub max_message_chars: usize,
    /// Maximum number of prior messages sent to the provider as context.
    pub history_window: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4000,
            history_window: 20,
        }
    }
}

/// Completion provider settings (OpenAI-compatible chat completions API).
///
/// When no API key is configured the server falls back to the deterministic
/// echo reply. That branch is taken once at startup, never at request time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Provider API key. `None` activates the echo fallback.
    pub api_key: Option<String>,
    /// Base URL of the provider, e.g. `https://integrate.api.nvidia.com/v1`.
    pub api_base: String,
    /// Model name passed through to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// System prompt prepended to every conversation.
    pub system_prompt: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: String::new(),
            model: String::new(),
            temperature: 0.7,
            system_prompt:
                "You are a helpful assistant. Be friendly and engaging in your responses."
                    .to_string(),
        }
    }
}

impl CompletionConfig {
    /// Whether the provider can be called: key, base URL, and model all set.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && !self.api_base.is_empty()
            && !self.model.is_empty()
    }
}

/// Speech provider settings (ElevenLabs-style TTS + STT API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Provider API key. `None` disables the voice bridge entirely.
    pub api_key: Option<String>,
    /// Base URL of the provider.
    pub api_base: String,
    /// Voice used for synthesis.
    pub voice_id: String,
    /// Synthesis model.
    pub tts_model: String,
    /// Transcription model.
    pub stt_model: String,
    /// Audio output format requested from the provider.
    pub output_format: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.elevenlabs.io".to_string(),
            voice_id: "JBFqnCBsd6RMkjVDRZzb".to_string(),
            tts_model: "eleven_multilingual_v2".to_string(),
            stt_model: "scribe_v1".to_string(),
            output_format: "mp3_44100_128".to_string(),
        }
    }
}

impl SpeechConfig {
    /// Whether the voice bridge is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
