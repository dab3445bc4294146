//! Text-to-speech HTTP client.
//!
//! Sends bounded text to the voice vendor and returns raw audio bytes;
//! the API layer base64-encodes them for transport. Built only when an
//! API key is present in the environment -- an unconfigured service is a
//! `VoiceError::Unconfigured` at call time, decided by the state wiring.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use colloquy_types::config::VoiceConfig;
use colloquy_types::error::VoiceError;

/// MIME type of the audio returned by the vendor.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Client for the text-to-speech vendor API.
pub struct VoiceSynthesizer {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    voice_id: String,
    max_text_chars: usize,
}

impl VoiceSynthesizer {
    pub fn new(api_key: SecretString, config: &VoiceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            voice_id: config.voice_id.clone(),
            max_text_chars: config.max_text_chars,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Validate `text` against the configured bounds.
    ///
    /// Split from [`synthesize`](Self::synthesize) so the handler can
    /// reject bad input with a 400 before any vendor traffic.
    pub fn validate_text(&self, text: &str) -> Result<(), VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::EmptyText);
        }
        let len = text.chars().count();
        if len > self.max_text_chars {
            return Err(VoiceError::TextTooLong {
                len,
                max: self.max_text_chars,
            });
        }
        Ok(())
    }

    /// Synthesize `text` into audio bytes.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        self.validate_text(text)?;

        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let response = self
            .client
            .post(&url)
            .header("xi-api-key", self.api_key.expose_secret())
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| VoiceError::Upstream(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Upstream(format!("HTTP {status}: {body}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Upstream(format!("body read failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesizer() -> VoiceSynthesizer {
        VoiceSynthesizer::new(
            SecretString::from("test-key-not-real"),
            &VoiceConfig {
                base_url: "https://voice.example".to_string(),
                voice_id: "narrator".to_string(),
                max_text_chars: 20,
            },
        )
    }

    #[test]
    fn validate_rejects_empty_text() {
        let err = synthesizer().validate_text("   ").unwrap_err();
        assert!(matches!(err, VoiceError::EmptyText));
    }

    #[test]
    fn validate_rejects_over_limit_text() {
        let err = synthesizer()
            .validate_text("this sentence is well past twenty characters")
            .unwrap_err();
        assert!(matches!(err, VoiceError::TextTooLong { max: 20, .. }));
    }

    #[test]
    fn validate_accepts_text_within_bounds() {
        assert!(synthesizer().validate_text("Hey there.").is_ok());
    }

    #[tokio::test]
    async fn synthesize_validates_before_any_request() {
        // An empty text never reaches the (unroutable) vendor URL.
        let err = synthesizer().synthesize("").await.unwrap_err();
        assert!(matches!(err, VoiceError::EmptyText));
    }
}
