//! # WAV Header Parsing
//!
//! Walks the RIFF chunk list of an in-memory WAV buffer and extracts the
//! playback parameters a transcription backend needs.
//!
//! ## Layout consumed:
//! ```text
//! "RIFF" <u32 LE size> "WAVE" { <4-byte id> <u32 LE len> <len bytes, padded to even> }*
//! ```
//! with a required `"fmt "` chunk (u16 format tag, u16 channels, u32 sample
//! rate, u32 byte rate, u16 block align, u16 bits per sample) and a required
//! `"data"` chunk whose length is the payload size.
//!
//! ## Failure policy:
//! The walk fails fast on the first structural problem. Every chunk must fit
//! inside the buffer; a length running past the end is [`ParseError::TruncatedChunk`],
//! never a best-effort read. Redundant `fmt ` fields (byte rate, block align)
//! that disagree with the derived values are warnings by default, since some
//! encoders get them wrong; [`WavParseOptions::strict`] turns them into errors.

use crate::audio::error::{HeaderField, HeaderFieldMismatch, ParseError};
use crate::audio::format::is_wav;
use crate::audio::reader::ByteReader;
use serde::Serialize;
use tracing::{debug, trace};

const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

const FMT_CHUNK_ID: &[u8; 4] = b"fmt ";
const DATA_CHUNK_ID: &[u8; 4] = b"data";

/// WAV format tag identifying the sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u16")]
pub enum FormatTag {
    Pcm,
    IeeeFloat,
    ALaw,
    MuLaw,
    Extensible,
    Other(u16),
}

impl From<u16> for FormatTag {
    fn from(val: u16) -> Self {
        match val {
            0x0001 => FormatTag::Pcm,
            0x0003 => FormatTag::IeeeFloat,
            0x0006 => FormatTag::ALaw,
            0x0007 => FormatTag::MuLaw,
            0xFFFE => FormatTag::Extensible,
            other => FormatTag::Other(other),
        }
    }
}

impl From<FormatTag> for u16 {
    fn from(tag: FormatTag) -> Self {
        match tag {
            FormatTag::Pcm => 0x0001,
            FormatTag::IeeeFloat => 0x0003,
            FormatTag::ALaw => 0x0006,
            FormatTag::MuLaw => 0x0007,
            FormatTag::Extensible => 0xFFFE,
            FormatTag::Other(val) => val,
        }
    }
}

/// Bits per sample accepted downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u16")]
pub enum BitDepth {
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BitDepth {
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
            BitDepth::ThirtyTwo => 32,
        }
    }

    pub fn bytes_per_sample(&self) -> u16 {
        self.bits() / 8
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = ParseError;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            24 => Ok(BitDepth::TwentyFour),
            32 => Ok(BitDepth::ThirtyTwo),
            other => Err(ParseError::InvalidBitDepth(other)),
        }
    }
}

impl From<BitDepth> for u16 {
    fn from(depth: BitDepth) -> Self {
        depth.bits()
    }
}

/// How strictly redundant header fields are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WavParseOptions {
    /// Reject byte rate / block align mismatches instead of warning.
    pub strict: bool,
}

impl WavParseOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Sample rate and channel count, the two values a recognizer needs up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackHint {
    pub sample_rate_hz: u32,
    pub channel_count: u16,
}

/// Format parameters extracted from a WAV header.
///
/// Only produced by a successful parse. `byte_rate` and `block_align` hold the
/// values as declared in the file; any disagreement with the derived values is
/// listed in `warnings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WavFormatInfo {
    pub format_tag: FormatTag,
    pub sample_rate_hz: u32,
    pub channel_count: u16,
    pub bits_per_sample: BitDepth,
    pub byte_rate: u32,
    pub block_align: u16,
    pub data_chunk_size: u32,
    pub warnings: Vec<HeaderFieldMismatch>,
}

impl WavFormatInfo {
    pub fn playback_hint(&self) -> PlaybackHint {
        PlaybackHint {
            sample_rate_hz: self.sample_rate_hz,
            channel_count: self.channel_count,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Payload duration derived from the data chunk length and the computed
    /// byte rate.
    pub fn duration_seconds(&self) -> f64 {
        let bytes_per_second = u64::from(self.sample_rate_hz)
            * u64::from(self.channel_count)
            * u64::from(self.bits_per_sample.bytes_per_sample());
        if bytes_per_second == 0 {
            return 0.0;
        }
        f64::from(self.data_chunk_size) / bytes_per_second as f64
    }
}

/// Decoded `fmt ` chunk, before cross-validation.
#[derive(Debug, Clone, Copy)]
struct FmtChunk {
    format_tag: FormatTag,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: BitDepth,
}

impl FmtChunk {
    fn decode(body: &[u8]) -> Result<Self, ParseError> {
        let too_short = || ParseError::FmtChunkTooShort {
            len: body.len() as u32,
        };

        let mut reader = ByteReader::new(body);
        let format_tag = reader.u16_le().ok_or_else(too_short)?.into();
        let channels = reader.u16_le().ok_or_else(too_short)?;
        let sample_rate = reader.u32_le().ok_or_else(too_short)?;
        let byte_rate = reader.u32_le().ok_or_else(too_short)?;
        let block_align = reader.u16_le().ok_or_else(too_short)?;
        let bits = reader.u16_le().ok_or_else(too_short)?;

        if channels == 0 {
            return Err(ParseError::InvalidChannelCount);
        }
        if sample_rate == 0 {
            return Err(ParseError::InvalidSampleRate);
        }
        let bits_per_sample = BitDepth::try_from(bits)?;

        Ok(Self {
            format_tag,
            channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
        })
    }

    fn computed_block_align(&self) -> u64 {
        u64::from(self.channels) * u64::from(self.bits_per_sample.bytes_per_sample())
    }

    fn computed_byte_rate(&self) -> u64 {
        u64::from(self.sample_rate) * self.computed_block_align()
    }

    fn mismatches(&self) -> Vec<HeaderFieldMismatch> {
        let checks = [
            (HeaderField::ByteRate, u64::from(self.byte_rate), self.computed_byte_rate()),
            (HeaderField::BlockAlign, u64::from(self.block_align), self.computed_block_align()),
        ];

        checks
            .into_iter()
            .filter(|(_, declared, computed)| declared != computed)
            .map(|(field, declared, computed)| HeaderFieldMismatch {
                field,
                declared,
                computed,
            })
            .collect()
    }
}

/// One RIFF sub-chunk, borrowed from the input buffer.
struct RawChunk<'a> {
    id: [u8; 4],
    body: &'a [u8],
}

/// Read the chunk at the reader's position and advance past it, including
/// the pad byte after odd-length bodies. A missing pad byte at the very end
/// of the buffer is tolerated.
fn next_chunk<'a>(reader: &mut ByteReader<'a>) -> Result<RawChunk<'a>, ParseError> {
    let offset = reader.position();

    let mut header = reader.clone();
    let (id, declared) = match (header.fourcc(), header.u32_le()) {
        (Some(id), Some(len)) => {
            *reader = header;
            (id, len)
        }
        _ => {
            let partial = reader.rest();
            return Err(ParseError::TruncatedChunk {
                id: chunk_name(&partial[..partial.len().min(4)]),
                offset,
                declared: CHUNK_HEADER_LEN as u64,
                available: partial.len(),
            });
        }
    };

    let available = reader.remaining();
    let body = usize::try_from(declared)
        .ok()
        .and_then(|len| reader.take(len))
        .ok_or_else(|| ParseError::TruncatedChunk {
            id: chunk_name(&id),
            offset,
            declared: u64::from(declared),
            available,
        })?;

    if declared % 2 == 1 && !reader.is_empty() {
        let _ = reader.skip(1);
    }

    Ok(RawChunk { id, body })
}

fn chunk_name(id: &[u8]) -> String {
    String::from_utf8_lossy(id).into_owned()
}

/// Parse a WAV header with the default, lenient cross-validation policy.
pub fn parse_wav_header(bytes: &[u8]) -> Result<WavFormatInfo, ParseError> {
    parse_wav_header_with(bytes, WavParseOptions::default())
}

/// Parse a WAV header, validating the RIFF/WAVE signature itself rather than
/// trusting an earlier sniff.
pub fn parse_wav_header_with(
    bytes: &[u8],
    options: WavParseOptions,
) -> Result<WavFormatInfo, ParseError> {
    if !is_wav(bytes) {
        return Err(ParseError::MissingRiffSignature);
    }

    let mut reader = ByteReader::at(bytes, RIFF_HEADER_LEN);
    let mut fmt: Option<FmtChunk> = None;
    let mut data_chunk_size: Option<u32> = None;

    while fmt.is_none() || data_chunk_size.is_none() {
        if reader.is_empty() {
            break;
        }

        let chunk = next_chunk(&mut reader)?;
        match &chunk.id {
            FMT_CHUNK_ID if fmt.is_none() => {
                fmt = Some(FmtChunk::decode(chunk.body)?);
            }
            DATA_CHUNK_ID if data_chunk_size.is_none() => {
                data_chunk_size = Some(chunk.body.len() as u32);
            }
            other => trace!(
                chunk = %chunk_name(other),
                len = chunk.body.len(),
                "Skipping RIFF chunk"
            ),
        }
    }

    let fmt = fmt.ok_or(ParseError::MissingFmtChunk)?;
    let data_chunk_size = data_chunk_size.ok_or(ParseError::MissingDataChunk)?;

    let warnings = fmt.mismatches();
    if let Some(first) = warnings.first() {
        if options.strict {
            return Err(ParseError::HeaderFieldMismatch(*first));
        }
        debug!(mismatches = warnings.len(), first = %first, "WAV header has inconsistent redundant fields");
    }

    Ok(WavFormatInfo {
        format_tag: fmt.format_tag,
        sample_rate_hz: fmt.sample_rate,
        channel_count: fmt.channels,
        bits_per_sample: fmt.bits_per_sample,
        byte_rate: fmt.byte_rate,
        block_align: fmt.block_align,
        data_chunk_size,
        warnings,
    })
}

/// Sample rate of a WAV buffer, or `None` if it is not a parseable WAV.
pub fn wav_sample_rate(bytes: &[u8]) -> Option<u32> {
    match parse_wav_header(bytes) {
        Ok(info) => Some(info.sample_rate_hz),
        Err(e) => {
            debug!(kind = e.kind(), "No WAV sample rate: {}", e);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Build a canonical WAV: RIFF header, 16-byte fmt chunk, data chunk
    /// holding `payload_len` zero bytes.
    pub(crate) fn canonical_wav(sample_rate: u32, channels: u16, bits: u16, payload_len: u32) -> Vec<u8> {
        let block_align = channels * (bits / 8);
        let byte_rate = sample_rate * u32::from(block_align);
        let mut wav = Vec::with_capacity(44 + payload_len as usize);

        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + payload_len).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&bits.to_le_bytes());

        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&payload_len.to_le_bytes());
        wav.resize(44 + payload_len as usize, 0);
        wav
    }

    fn set_u32(bytes: &mut [u8], offset: usize, value: u32) {
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn set_u16(bytes: &mut [u8], offset: usize, value: u16) {
        bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn test_canonical_header() {
        let wav = canonical_wav(16000, 1, 16, 320);
        let info = parse_wav_header(&wav).unwrap();

        assert_eq!(
            info,
            WavFormatInfo {
                format_tag: FormatTag::Pcm,
                sample_rate_hz: 16000,
                channel_count: 1,
                bits_per_sample: BitDepth::Sixteen,
                byte_rate: 32000,
                block_align: 2,
                data_chunk_size: 320,
                warnings: vec![],
            }
        );
        assert!(!info.has_warnings());
        assert_eq!(
            info.playback_hint(),
            PlaybackHint {
                sample_rate_hz: 16000,
                channel_count: 1
            }
        );
        assert!((info.duration_seconds() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_header_only_with_empty_payload() {
        let wav = canonical_wav(16000, 1, 16, 0);
        assert_eq!(wav.len(), 44);
        assert_eq!(parse_wav_header(&wav).unwrap().data_chunk_size, 0);
    }

    #[test]
    fn test_oversized_data_chunk_is_truncated() {
        let mut wav = canonical_wav(16000, 1, 16, 320);
        set_u32(&mut wav, 40, 32000);

        match parse_wav_header(&wav) {
            Err(ParseError::TruncatedChunk {
                id,
                offset,
                declared,
                available,
            }) => {
                assert_eq!(id, "data");
                assert_eq!(offset, 36);
                assert_eq!(declared, 32000);
                assert_eq!(available, 320);
            }
            other => panic!("expected TruncatedChunk, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_data_chunk() {
        let wav = canonical_wav(16000, 1, 16, 0);
        let without_data = &wav[..36];
        assert_eq!(parse_wav_header(without_data), Err(ParseError::MissingDataChunk));
    }

    #[test]
    fn test_missing_fmt_chunk() {
        let mut wav = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&4u32.to_le_bytes());
        wav.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(parse_wav_header(&wav), Err(ParseError::MissingFmtChunk));

        // Neither chunk present reports the fmt chunk first
        assert_eq!(
            parse_wav_header(b"RIFF\x04\x00\x00\x00WAVE"),
            Err(ParseError::MissingFmtChunk)
        );
    }

    #[test]
    fn test_empty_and_non_wav_buffers() {
        assert_eq!(parse_wav_header(&[]), Err(ParseError::MissingRiffSignature));
        assert_eq!(
            parse_wav_header(b"RIFF\x00\x00\x00\x00AVI "),
            Err(ParseError::MissingRiffSignature)
        );
        assert_eq!(
            parse_wav_header(b"OggS\x00\x02\x00\x00\x00\x00\x00\x00"),
            Err(ParseError::MissingRiffSignature)
        );
    }

    #[test]
    fn test_partial_chunk_header_is_truncated() {
        let mut wav = canonical_wav(16000, 1, 16, 0);
        wav.truncate(40);
        assert!(matches!(
            parse_wav_header(&wav),
            Err(ParseError::TruncatedChunk { declared: 8, available: 4, .. })
        ));
    }

    #[test]
    fn test_zero_sample_rate() {
        let mut wav = canonical_wav(16000, 1, 16, 0);
        set_u32(&mut wav, 24, 0);
        assert_eq!(parse_wav_header(&wav), Err(ParseError::InvalidSampleRate));
    }

    #[test]
    fn test_unsupported_bit_depth() {
        let mut wav = canonical_wav(16000, 1, 16, 0);
        set_u16(&mut wav, 34, 12);
        assert_eq!(parse_wav_header(&wav), Err(ParseError::InvalidBitDepth(12)));
    }

    #[test]
    fn test_zero_channels() {
        let mut wav = canonical_wav(16000, 1, 16, 0);
        set_u16(&mut wav, 22, 0);
        assert_eq!(parse_wav_header(&wav), Err(ParseError::InvalidChannelCount));
    }

    #[test]
    fn test_short_fmt_chunk() {
        let mut wav = b"RIFF\x00\x00\x00\x00WAVEfmt ".to_vec();
        wav.extend_from_slice(&14u32.to_le_bytes());
        wav.extend_from_slice(&[0u8; 14]);
        assert_eq!(
            parse_wav_header(&wav),
            Err(ParseError::FmtChunkTooShort { len: 14 })
        );
    }

    #[test]
    fn test_skips_unknown_chunks_with_padding() {
        let canonical = canonical_wav(48000, 2, 24, 12);

        // RIFF header, odd-length LIST chunk with pad byte, then fmt and data
        let mut wav = canonical[..12].to_vec();
        wav.extend_from_slice(b"LIST");
        wav.extend_from_slice(&3u32.to_le_bytes());
        wav.extend_from_slice(b"abc\0");
        wav.extend_from_slice(&canonical[12..]);

        let info = parse_wav_header(&wav).unwrap();
        assert_eq!(info.sample_rate_hz, 48000);
        assert_eq!(info.channel_count, 2);
        assert_eq!(info.bits_per_sample, BitDepth::TwentyFour);
        assert_eq!(info.block_align, 6);
        assert_eq!(info.data_chunk_size, 12);
    }

    #[test]
    fn test_data_before_fmt() {
        let canonical = canonical_wav(8000, 1, 8, 4);

        let mut wav = canonical[..12].to_vec();
        wav.extend_from_slice(&canonical[36..]);
        wav.extend_from_slice(&canonical[12..36]);

        let info = parse_wav_header(&wav).unwrap();
        assert_eq!(info.sample_rate_hz, 8000);
        assert_eq!(info.data_chunk_size, 4);
    }

    #[test]
    fn test_odd_data_chunk_without_trailing_pad() {
        let wav = canonical_wav(16000, 1, 8, 3);
        assert_eq!(wav.len() % 2, 1);
        assert_eq!(parse_wav_header(&wav).unwrap().data_chunk_size, 3);
    }

    #[test]
    fn test_field_mismatch_is_warning_by_default() {
        let mut wav = canonical_wav(16000, 1, 16, 0);
        set_u32(&mut wav, 28, 32001);

        let info = parse_wav_header(&wav).unwrap();
        assert_eq!(info.byte_rate, 32001);
        assert_eq!(
            info.warnings,
            vec![HeaderFieldMismatch {
                field: HeaderField::ByteRate,
                declared: 32001,
                computed: 32000,
            }]
        );
    }

    #[test]
    fn test_field_mismatch_is_error_when_strict() {
        let mut wav = canonical_wav(16000, 1, 16, 0);
        set_u16(&mut wav, 32, 4);

        assert_eq!(
            parse_wav_header_with(&wav, WavParseOptions::strict()),
            Err(ParseError::HeaderFieldMismatch(HeaderFieldMismatch {
                field: HeaderField::BlockAlign,
                declared: 4,
                computed: 2,
            }))
        );
    }

    #[test]
    fn test_wav_sample_rate() {
        assert_eq!(wav_sample_rate(&canonical_wav(22050, 2, 16, 8)), Some(22050));
        assert_eq!(wav_sample_rate(b"OggS"), None);
    }

    #[test]
    fn test_format_tag_conversion() {
        assert_eq!(u16::from(FormatTag::Pcm), 0x0001);
        assert_eq!(FormatTag::from(0xFFFE), FormatTag::Extensible);
        assert_eq!(FormatTag::from(0x0055), FormatTag::Other(0x0055));
        assert_eq!(serde_json::to_string(&FormatTag::IeeeFloat).unwrap(), "3");
    }

    fn bit_depths() -> impl Strategy<Value = u16> {
        prop_oneof![Just(8u16), Just(16u16), Just(24u16), Just(32u16)]
    }

    proptest! {
        #[test]
        fn prop_parsing_never_panics(data in prop::collection::vec(any::<u8>(), 0..128)) {
            let _ = parse_wav_header(&data);
        }

        #[test]
        fn prop_parsing_never_panics_after_signature(tail in prop::collection::vec(any::<u8>(), 0..128)) {
            let mut data = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
            data.extend_from_slice(&tail);
            let _ = parse_wav_header(&data);
        }

        #[test]
        fn prop_round_trip(
            sample_rate in 1u32..=192_000,
            channels in 1u16..=8,
            bits in bit_depths(),
            frames in 0u32..64,
        ) {
            let payload_len = frames * u32::from(channels) * u32::from(bits / 8);
            let wav = canonical_wav(sample_rate, channels, bits, payload_len);
            let info = parse_wav_header_with(&wav, WavParseOptions::strict()).unwrap();

            prop_assert_eq!(info.sample_rate_hz, sample_rate);
            prop_assert_eq!(info.channel_count, channels);
            prop_assert_eq!(info.bits_per_sample.bits(), bits);
            prop_assert_eq!(info.data_chunk_size, payload_len);
            prop_assert!(info.warnings.is_empty());
        }
    }
}
