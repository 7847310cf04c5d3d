//! # Audio Parse Errors
//!
//! Every way a buffer can fail container identification or WAV header
//! extraction has its own variant. Callers that only need a yes/no answer can
//! treat any error as "unsupported or corrupted audio"; logs and JSON bodies
//! keep the precise kind via [`ParseError::kind`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Header field that failed cross-validation against the recomputed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    ByteRate,
    BlockAlign,
}

impl HeaderField {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderField::ByteRate => "byte_rate",
            HeaderField::BlockAlign => "block_align",
        }
    }
}

/// A declared `fmt ` field that disagrees with the value derived from
/// sample rate, channel count and bit depth.
///
/// Attached as a warning to an otherwise successful parse, or raised as
/// [`ParseError::HeaderFieldMismatch`] under strict validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderFieldMismatch {
    pub field: HeaderField,
    pub declared: u64,
    pub computed: u64,
}

impl fmt::Display for HeaderFieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "declared {} {} does not match computed {}",
            self.field.as_str(),
            self.declared,
            self.computed
        )
    }
}

/// Errors produced while identifying a container or parsing a WAV header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No known signature matched. Only raised when a caller requires a match.
    #[error("no known audio container signature found")]
    UnrecognizedFormat,

    #[error("missing RIFF/WAVE signature")]
    MissingRiffSignature,

    #[error("no \"fmt \" chunk found")]
    MissingFmtChunk,

    #[error("no \"data\" chunk found")]
    MissingDataChunk,

    /// A chunk header or body extends past the end of the buffer.
    #[error("chunk \"{id}\" at offset {offset} declares {declared} bytes but only {available} remain")]
    TruncatedChunk {
        id: String,
        offset: usize,
        declared: u64,
        available: usize,
    },

    #[error("\"fmt \" chunk is {len} bytes, at least 16 are required")]
    FmtChunkTooShort { len: u32 },

    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,

    #[error("unsupported bits per sample: {0}")]
    InvalidBitDepth(u16),

    #[error("channel count must be at least 1")]
    InvalidChannelCount,

    #[error("{0}")]
    HeaderFieldMismatch(HeaderFieldMismatch),
}

impl ParseError {
    /// Stable, machine-readable tag for logs, metrics and JSON responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::UnrecognizedFormat => "unrecognized_format",
            ParseError::MissingRiffSignature => "missing_riff_signature",
            ParseError::MissingFmtChunk => "missing_fmt_chunk",
            ParseError::MissingDataChunk => "missing_data_chunk",
            ParseError::TruncatedChunk { .. } => "truncated_chunk",
            ParseError::FmtChunkTooShort { .. } => "fmt_chunk_too_short",
            ParseError::InvalidSampleRate => "invalid_sample_rate",
            ParseError::InvalidBitDepth(_) => "invalid_bit_depth",
            ParseError::InvalidChannelCount => "invalid_channel_count",
            ParseError::HeaderFieldMismatch(_) => "header_field_mismatch",
        }
    }
}

/// Serializable summary of a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub kind: &'static str,
    pub message: String,
}

impl From<&ParseError> for ParseFailure {
    fn from(err: &ParseError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
