//! # Configuration Management
//!
//! Loads application configuration from multiple sources:
//! - Default values (built into the code)
//! - TOML configuration file (config.toml)
//! - Environment variables (with APP_ prefix)
//!
//! ## Configuration Priority (highest to lowest):
//! 1. `HOST` / `PORT` (deployment platforms)
//! 2. Environment variables (`APP_SERVER__PORT`, `APP_AUDIO__MAX_UPLOAD_BYTES`, ...)
//! 3. Configuration file (config.toml)
//! 4. Default values (defined in the Default impls)
//!
//! Nested keys are separated by a double underscore so multi-word field names
//! survive the mapping. `APP_TRANSCRIPTION__ALTERNATIVE_LANGUAGES` takes a
//! comma-separated list.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

use crate::audio::WavParseOptions;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub audio: AudioConfig,
    pub transcription: TranscriptionConfig,
}

/// Server-specific configuration settings.
///
/// ## Common values:
/// - `host = "127.0.0.1"`: Only accept connections from localhost (development)
/// - `host = "0.0.0.0"`: Accept connections from any IP address (production)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Limits and policy for incoming audio buffers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Largest request body accepted by the audio endpoints, in bytes.
    pub max_upload_bytes: usize,

    /// Treat byte rate / block align mismatches in WAV headers as errors
    /// instead of warnings.
    pub strict_header_validation: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 25 * 1024 * 1024,
            strict_header_validation: false,
        }
    }
}

impl AudioConfig {
    pub fn wav_parse_options(&self) -> WavParseOptions {
        WavParseOptions {
            strict: self.strict_header_validation,
        }
    }
}

/// Settings handed to the speech-to-text collaborator with every request.
///
/// Built once from configuration and passed by reference into recognition
/// planning; nothing here is process-global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// BCP-47 code of the expected spoken language (e.g. "en-US").
    pub primary_language: String,

    /// Additional languages the recognizer may pick instead.
    pub alternative_languages: Vec<String>,

    pub enable_automatic_punctuation: bool,

    /// Channel count used for containers whose header is not parsed here.
    pub default_channel_count: u16,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            primary_language: "en-US".to_string(),
            alternative_languages: Vec::new(),
            enable_automatic_punctuation: true,
            default_channel_count: 1,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, `config.toml` and the environment.
    ///
    /// ## Environment Variable Examples:
    /// - `APP_SERVER__HOST=0.0.0.0`
    /// - `APP_AUDIO__STRICT_HEADER_VALIDATION=true`
    /// - `APP_TRANSCRIPTION__ALTERNATIVE_LANGUAGES=es-ES,fr-FR`
    /// - `HOST=0.0.0.0` / `PORT=3000`
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("transcription.alternative_languages"),
            );

        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.audio.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("Max upload size must be greater than 0"));
        }

        if self.transcription.primary_language.trim().is_empty() {
            return Err(anyhow::anyhow!("Primary transcription language cannot be empty"));
        }

        if self.transcription.default_channel_count == 0 {
            return Err(anyhow::anyhow!("Default channel count must be at least 1"));
        }

        Ok(())
    }

    /// Apply a partial update from a JSON document, then re-validate.
    ///
    /// Only the fields present in the JSON are changed, so
    /// `{"audio": {"strict_header_validation": true}}` flips just that flag.
    pub fn update_from_json(&mut self, json_str: &str) -> Result<()> {
        let partial_config: serde_json::Value = serde_json::from_str(json_str)?;

        if let Some(server) = partial_config.get("server") {
            if let Some(host) = server.get("host").and_then(|v| v.as_str()) {
                self.server.host = host.to_string();
            }
            if let Some(port) = server.get("port").and_then(|v| v.as_u64()) {
                self.server.port = u16::try_from(port)
                    .map_err(|_| anyhow::anyhow!("Server port out of range: {}", port))?;
            }
        }

        if let Some(audio) = partial_config.get("audio") {
            if let Some(max) = audio.get("max_upload_bytes").and_then(|v| v.as_u64()) {
                self.audio.max_upload_bytes = max as usize;
            }
            if let Some(strict) = audio.get("strict_header_validation").and_then(|v| v.as_bool()) {
                self.audio.strict_header_validation = strict;
            }
        }

        if let Some(transcription) = partial_config.get("transcription") {
            if let Some(lang) = transcription.get("primary_language").and_then(|v| v.as_str()) {
                self.transcription.primary_language = lang.to_string();
            }
            if let Some(alts) = transcription.get("alternative_languages").and_then(|v| v.as_array()) {
                self.transcription.alternative_languages = alts
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
            }
            if let Some(punct) = transcription
                .get("enable_automatic_punctuation")
                .and_then(|v| v.as_bool())
            {
                self.transcription.enable_automatic_punctuation = punct;
            }
            if let Some(channels) = transcription.get("default_channel_count").and_then(|v| v.as_u64()) {
                self.transcription.default_channel_count = u16::try_from(channels)
                    .map_err(|_| anyhow::anyhow!("Channel count out of range: {}", channels))?;
            }
        }

        self.validate()?;
        Ok(())
    }
}
