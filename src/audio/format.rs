//! # Container Format Sniffing
//!
//! Classifies a byte buffer by its magic number only. File names, MIME types
//! and any other caller-supplied metadata are ignored, so identical leading
//! bytes always classify identically.
//!
//! ## Signatures:
//! - **WAV**: `"RIFF"` at 0 and `"WAVE"` at 8 (RIFF alone is a generic container)
//! - **OGG**: `"OggS"` at 0
//! - **WEBM**: EBML magic `1A 45 DF A3` at 0

use crate::audio::error::ParseError;
use crate::audio::reader::has_signature_at;
use serde::Serialize;
use std::fmt;

/// Longest prefix any signature needs.
pub const SNIFF_PREFIX_LEN: usize = 12;

pub(crate) const RIFF_MAGIC: &[u8; 4] = b"RIFF";
pub(crate) const WAVE_MAGIC: &[u8; 4] = b"WAVE";
const OGG_MAGIC: &[u8; 4] = b"OggS";
const EBML_MAGIC: &[u8; 4] = &[0x1A, 0x45, 0xDF, 0xA3];

/// Outer container of an audio buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Wav,
    Ogg,
    Webm,
    Unknown,
}

impl ContainerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::Wav => "wav",
            ContainerFormat::Ogg => "ogg",
            ContainerFormat::Webm => "webm",
            ContainerFormat::Unknown => "unknown",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ContainerFormat::Wav => "audio/wav",
            ContainerFormat::Ogg => "audio/ogg",
            ContainerFormat::Webm => "audio/webm",
            ContainerFormat::Unknown => "application/octet-stream",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != ContainerFormat::Unknown
    }

    /// Turn `Unknown` into [`ParseError::UnrecognizedFormat`] for callers that
    /// cannot proceed without a recognized container.
    pub fn require_known(self) -> Result<Self, ParseError> {
        if self.is_known() {
            Ok(self)
        } else {
            Err(ParseError::UnrecognizedFormat)
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `bytes` by magic number. Never fails: empty, short and
/// unmatched buffers are [`ContainerFormat::Unknown`].
pub fn detect_format(bytes: &[u8]) -> ContainerFormat {
    let prefix = &bytes[..bytes.len().min(SNIFF_PREFIX_LEN)];

    if is_wav(prefix) {
        ContainerFormat::Wav
    } else if is_ogg(prefix) {
        ContainerFormat::Ogg
    } else if is_webm(prefix) {
        ContainerFormat::Webm
    } else {
        ContainerFormat::Unknown
    }
}

pub fn is_wav(bytes: &[u8]) -> bool {
    has_signature_at(bytes, 0, RIFF_MAGIC) && has_signature_at(bytes, 8, WAVE_MAGIC)
}

pub fn is_ogg(bytes: &[u8]) -> bool {
    has_signature_at(bytes, 0, OGG_MAGIC)
}

pub fn is_webm(bytes: &[u8]) -> bool {
    has_signature_at(bytes, 0, EBML_MAGIC)
}
