//! Configuration types for Colloquy.
//!
//! `AppConfig` represents the top-level `config.toml` in the data
//! directory. Every field has a default so a missing or partial file
//! still yields a runnable configuration. Secrets are never read from
//! this file; they come from the environment.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Colloquy platform.
///
/// Loaded from `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Language-model settings shared by the turn engine and the analysis
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
        }
    }
}

/// Speech-to-text engine settings.
///
/// The engine is an external binary fed a 16kHz mono PCM wav file; the
/// invocation is bounded by `timeout_secs` of wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Path to the speech engine binary (e.g., whisper-cli).
    #[serde(default = "default_speech_binary")]
    pub binary: String,
    /// Path to the engine's model file.
    #[serde(default)]
    pub model_path: String,
    #[serde(default = "default_speech_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_speech_binary() -> String {
    "whisper-cli".to_string()
}

fn default_speech_timeout_secs() -> u64 {
    30
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            binary: default_speech_binary(),
            model_path: String::new(),
            timeout_secs: default_speech_timeout_secs(),
        }
    }
}

/// Text-to-speech service settings. The API key comes from the
/// environment (`COLLOQUY_VOICE_API_KEY`); an absent key leaves the
/// service unconfigured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_voice_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub voice_id: String,
    /// Maximum length of text accepted by the speak endpoint.
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

fn default_voice_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_max_text_chars() -> usize {
    1_000
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_voice_base_url(),
            voice_id: String::new(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.speech.timeout_secs, 30);
        assert_eq!(config.voice.max_text_chars, 1_000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[server]
port = 9000
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.speech.binary, "whisper-cli");
    }

    #[test]
    fn test_empty_toml_is_valid() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8787);
    }
}
