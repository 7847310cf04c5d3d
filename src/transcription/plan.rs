//! # Recognition Planning
//!
//! Decides which request configurations to send to the speech-to-text
//! collaborator, and in what order, based only on the audio bytes. No
//! request is made here; the caller walks the attempts until one returns text.
//!
//! ## Attempt order:
//! 1. WAV → `LINEAR16` with an explicit sample rate and channel count
//! 2. OGG → `OGG_OPUS`
//! 3. WEBM → `WEBM_OPUS`
//! 4. Always last: `ENCODING_UNSPECIFIED`, letting the service infer from headers

use crate::audio::{self, AudioInspection, ContainerFormat, WavParseOptions};
use crate::config::TranscriptionConfig;
use serde::Serialize;

/// Audio encoding parameter understood by the speech-to-text service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpeechEncoding {
    Linear16,
    OggOpus,
    WebmOpus,
    EncodingUnspecified,
}

impl SpeechEncoding {
    /// Encoding hint for a sniffed container.
    pub fn for_format(format: ContainerFormat) -> Self {
        match format {
            ContainerFormat::Wav => SpeechEncoding::Linear16,
            ContainerFormat::Ogg => SpeechEncoding::OggOpus,
            ContainerFormat::Webm => SpeechEncoding::WebmOpus,
            ContainerFormat::Unknown => SpeechEncoding::EncodingUnspecified,
        }
    }
}

/// One recognition request configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionAttempt {
    pub encoding: SpeechEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate_hertz: Option<u32>,
    pub audio_channel_count: u16,
    pub language_code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternative_language_codes: Vec<String>,
    pub enable_automatic_punctuation: bool,
}

/// Ordered recognition attempts for one buffer. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionPlan {
    pub attempts: Vec<RecognitionAttempt>,
}

impl RecognitionPlan {
    /// Build the plan from an existing inspection.
    ///
    /// `sample_rate_hint` is a rate reported by the capture collaborator; it
    /// wins over the WAV header when present. A zero hint is ignored.
    pub fn from_inspection(
        inspection: &AudioInspection,
        config: &TranscriptionConfig,
        sample_rate_hint: Option<u32>,
    ) -> Self {
        let hint = sample_rate_hint.filter(|rate| *rate > 0);
        let attempt = |encoding, sample_rate_hertz, audio_channel_count| RecognitionAttempt {
            encoding,
            sample_rate_hertz,
            audio_channel_count,
            language_code: config.primary_language.clone(),
            alternative_language_codes: config.alternative_languages.clone(),
            enable_automatic_punctuation: config.enable_automatic_punctuation,
        };

        let mut attempts = Vec::with_capacity(2);
        match inspection.format {
            ContainerFormat::Wav => {
                let playback = inspection.wav.as_ref().map(|info| info.playback_hint());
                let sample_rate = hint.or(playback.map(|p| p.sample_rate_hz));
                let channels = playback
                    .map(|p| p.channel_count)
                    .unwrap_or(config.default_channel_count);
                attempts.push(attempt(SpeechEncoding::Linear16, sample_rate, channels));
            }
            ContainerFormat::Ogg | ContainerFormat::Webm => {
                attempts.push(attempt(
                    SpeechEncoding::for_format(inspection.format),
                    hint,
                    config.default_channel_count,
                ));
            }
            ContainerFormat::Unknown => {}
        }
        attempts.push(attempt(
            SpeechEncoding::EncodingUnspecified,
            hint,
            config.default_channel_count,
        ));

        Self { attempts }
    }

    /// The attempt to try first.
    pub fn primary(&self) -> Option<&RecognitionAttempt> {
        self.attempts.first()
    }
}

/// Sniff, parse and plan in one call.
pub fn plan_recognition(
    bytes: &[u8],
    config: &TranscriptionConfig,
    sample_rate_hint: Option<u32>,
    options: WavParseOptions,
) -> RecognitionPlan {
    let inspection = audio::inspect(bytes, options);
    RecognitionPlan::from_inspection(&inspection, config, sample_rate_hint)
}
