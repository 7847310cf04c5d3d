//! Bounds-checked little-endian reads over a borrowed byte slice.
//!
//! Every read checks the remaining length first and returns `None` on
//! exhaustion, so callers turn running out of bytes into a typed error
//! instead of a panic.

use byteorder::{ByteOrder, LittleEndian};

/// True when `signature` occurs in `bytes` starting at `offset`.
///
/// A signature that would extend past the end of `bytes` never matches.
pub fn has_signature_at(bytes: &[u8], offset: usize, signature: &[u8]) -> bool {
    offset
        .checked_add(signature.len())
        .and_then(|end| bytes.get(offset..end))
        .map_or(false, |window| window == signature)
}

/// Forward-only cursor over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Start reading at `pos`, clamped to the end of the buffer.
    pub fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self {
            bytes,
            pos: pos.min(bytes.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes from the cursor to the end of the buffer, without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.remaining() {
            return None;
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Some(slice)
    }

    pub fn skip(&mut self, len: usize) -> Option<()> {
        self.take(len).map(|_| ())
    }

    pub fn fourcc(&mut self) -> Option<[u8; 4]> {
        self.take(4).map(|b| [b[0], b[1], b[2], b[3]])
    }

    pub fn u16_le(&mut self) -> Option<u16> {
        self.take(2).map(LittleEndian::read_u16)
    }

    pub fn u32_le(&mut self) -> Option<u32> {
        self.take(4).map(LittleEndian::read_u32)
    }
}
