//! Speech provider client - text-to-speech and speech-to-text.

use tracing::debug;

use parley_core::config::SpeechConfig;

use crate::error::VoiceError;

/// HTTP client for the configured speech provider.
pub struct SpeechClient {
    config: SpeechConfig,
    http: reqwest::Client,
}

impl std::fmt::Debug for SpeechClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechClient")
            .field("api_key", &"[REDACTED]")
            .field("voice_id", &self.config.voice_id)
            .field("tts_model", &self.config.tts_model)
            .field("stt_model", &self.config.stt_model)
            .finish()
    }
}

impl SpeechClient {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(300))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Build a client only when the provider key is configured.
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        if config.is_configured() {
            Some(Self::new(config.clone()))
        } else {
            None
        }
    }

    pub(crate) fn tts_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.voice_id,
            self.config.output_format,
        )
    }

    pub(crate) fn stt_url(&self) -> String {
        format!(
            "{}/v1/speech-to-text",
            self.config.api_base.trim_end_matches('/')
        )
    }

    /// Pick the upload file name from the request MIME type.
    pub(crate) fn upload_filename(mime: &str) -> &'static str {
        match mime {
            "audio/mpeg" | "audio/mp3" => "audio.mp3",
            "audio/wav" | "audio/x-wav" => "audio.wav",
            "audio/ogg" => "audio.ogg",
            "audio/mp4" => "audio.m4a",
            _ => "audio.webm",
        }
    }

    /// Convert a text reply to audio bytes.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        debug!(voice = %self.config.voice_id, chars = text.len(), "Synthesis request");

        let body = serde_json::json!({
            "text": text,
            "model_id": self.config.tts_model,
        });

        let response = self
            .http
            .post(self.tts_url())
            .header("xi-api-key", self.config.api_key.as_deref().unwrap_or_default())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(VoiceError::Synthesis(format!("HTTP {status}: {text}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    /// Convert recorded audio to text.
    ///
    /// `mime` is the upload content type as reported by the client (browser
    /// MediaRecorder output is typically `audio/webm`).
    pub async fn transcribe(&self, audio: Vec<u8>, mime: &str) -> Result<String, VoiceError> {
        debug!(model = %self.config.stt_model, size = audio.len(), "Transcription request");

        let file_part = reqwest::multipart::Part::bytes(audio)
            .file_name(Self::upload_filename(mime))
            .mime_str(mime)
            .map_err(|e| VoiceError::Transcription(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model_id", self.config.stt_model.clone());

        let response = self
            .http
            .post(self.stt_url())
            .header("xi-api-key", self.config.api_key.as_deref().unwrap_or_default())
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Transcription(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(VoiceError::Transcription(format!("HTTP {status}: {text}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VoiceError::Transcription(e.to_string()))?;

        json["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                VoiceError::Transcription("no 'text' field in response".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SpeechConfig {
        let mut config = SpeechConfig::default();
        config.api_key = Some("el-test".to_string());
        config
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(SpeechClient::from_config(&SpeechConfig::default()).is_none());
        assert!(SpeechClient::from_config(&configured()).is_some());
    }

    #[test]
    fn test_tts_url_contains_voice_and_format() {
        let client = SpeechClient::new(configured());
        assert_eq!(
            client.tts_url(),
            "https://api.elevenlabs.io/v1/text-to-speech/JBFqnCBsd6RMkjVDRZzb?output_format=mp3_44100_128"
        );
    }

    #[test]
    fn test_stt_url() {
        let client = SpeechClient::new(configured());
        assert_eq!(client.stt_url(), "https://api.elevenlabs.io/v1/speech-to-text");
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let mut config = configured();
        config.api_base = "https://api.elevenlabs.io/".to_string();
        let client = SpeechClient::new(config);
        assert!(client.stt_url().starts_with("https://api.elevenlabs.io/v1/"));
        assert!(!client.stt_url().contains("io//v1"));
    }

    #[test]
    fn test_upload_filename_by_mime() {
        assert_eq!(SpeechClient::upload_filename("audio/mpeg"), "audio.mp3");
        assert_eq!(SpeechClient::upload_filename("audio/wav"), "audio.wav");
        assert_eq!(SpeechClient::upload_filename("audio/ogg"), "audio.ogg");
        assert_eq!(SpeechClient::upload_filename("audio/mp4"), "audio.m4a");
        assert_eq!(SpeechClient::upload_filename("audio/webm"), "audio.webm");
        // Unknown types fall back to webm, the browser recorder default.
        assert_eq!(SpeechClient::upload_filename("application/octet-stream"), "audio.webm");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = SpeechClient::new(configured());
        let debug = format!("{:?}", client);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("el-test"));
    }
}
