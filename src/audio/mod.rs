//! # Audio Container Inspection
//!
//! The only part of the service that touches raw audio bytes. Everything here
//! is a pure function over a complete in-memory buffer: no I/O, no shared
//! state, safe to call from any number of request handlers at once.
//!
//! ## Key Components:
//! - **format**: magic-number sniffing into [`ContainerFormat`]
//! - **wav**: RIFF chunk walk and `fmt `/`data` extraction into [`WavFormatInfo`]
//! - **reader**: bounds-checked little-endian reads shared by both
//! - **error**: one [`ParseError`] variant per failure kind
//!
//! ## Typical flow:
//! Sniff first; only buffers classified as WAV are handed to the header
//! parser, which still re-checks the signature itself.

pub mod error;
pub mod format;
pub mod reader;
pub mod wav;

pub use error::{ParseError, ParseFailure};
pub use format::{detect_format, ContainerFormat};
pub use wav::{parse_wav_header, parse_wav_header_with, wav_sample_rate, WavFormatInfo, WavParseOptions};

use serde::Serialize;
use tracing::warn;

/// Result of sniffing a buffer and, for WAV, parsing its header.
#[derive(Debug, Clone, Serialize)]
pub struct AudioInspection {
    pub format: ContainerFormat,
    pub mime_type: &'static str,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wav: Option<WavFormatInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wav_error: Option<ParseFailure>,
}

impl AudioInspection {
    /// True when the buffer is a known container and, if WAV, its header parsed.
    pub fn is_usable(&self) -> bool {
        self.format.is_known() && self.wav_error.is_none()
    }
}

/// Sniff `bytes` and parse the WAV header when there is one.
///
/// Header failures are recorded in `wav_error` rather than returned, so a
/// caller always gets the container classification.
pub fn inspect(bytes: &[u8], options: WavParseOptions) -> AudioInspection {
    let format = detect_format(bytes);

    let (wav, wav_error) = match format {
        ContainerFormat::Wav => match parse_wav_header_with(bytes, options) {
            Ok(info) => {
                if info.has_warnings() {
                    warn!(
                        warnings = info.warnings.len(),
                        "WAV header fields disagree with derived values"
                    );
                }
                (Some(info), None)
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "WAV header rejected");
                (None, Some(ParseFailure::from(&e)))
            }
        },
        _ => (None, None),
    };

    AudioInspection {
        format,
        mime_type: format.mime_type(),
        size_bytes: bytes.len(),
        wav,
        wav_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::tests::canonical_wav;

    #[test]
    fn test_inspect_wav() {
        let wav = canonical_wav(16000, 1, 16, 64);
        let inspection = inspect(&wav, WavParseOptions::default());

        assert_eq!(inspection.format, ContainerFormat::Wav);
        assert_eq!(inspection.size_bytes, 108);
        assert_eq!(inspection.wav.as_ref().map(|w| w.sample_rate_hz), Some(16000));
        assert!(inspection.is_usable());
    }

    #[test]
    fn test_inspect_corrupt_wav_keeps_format() {
        let mut wav = canonical_wav(16000, 1, 16, 64);
        wav.truncate(50);
        let inspection = inspect(&wav, WavParseOptions::default());

        assert_eq!(inspection.format, ContainerFormat::Wav);
        assert!(inspection.wav.is_none());
        assert_eq!(
            inspection.wav_error.as_ref().map(|e| e.kind),
            Some("truncated_chunk")
        );
        assert!(!inspection.is_usable());
    }

    #[test]
    fn test_inspect_non_wav() {
        let inspection = inspect(b"OggS\x00\x02", WavParseOptions::default());
        assert_eq!(inspection.format, ContainerFormat::Ogg);
        assert_eq!(inspection.mime_type, "audio/ogg");
        assert!(inspection.wav.is_none() && inspection.wav_error.is_none());

        let empty = inspect(&[], WavParseOptions::default());
        assert_eq!(empty.format, ContainerFormat::Unknown);
        assert!(!empty.is_usable());
    }

    #[test]
    fn test_inspection_json_shape() {
        let inspection = inspect(b"OggS", WavParseOptions::default());
        let json = serde_json::to_value(&inspection).unwrap();
        assert_eq!(json["format"], "ogg");
        assert!(json.get("wav").is_none());
    }
}
