use crate::digest::{Digest32, DIGEST32_SIZE};
use crate::error::{CodecError, Result};

/// Forward-only cursor over a byte slice
///
/// Every read names the field it is decoding so truncation errors point at
/// the exact spot in the format. The reader is `Copy`; a copy is a cheap
/// look-ahead that leaves the original cursor untouched.
#[derive(Debug, Clone, Copy)]
pub struct SigmaByteReader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> SigmaByteReader<'a> {
    /// Creates a new cursor over the provided byte slice.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Returns the current offset within the slice.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.cursor)
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the unread tail without consuming it.
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.cursor.min(self.bytes.len())..]
    }

    /// Returns the bytes consumed between `start` and the current cursor.
    pub fn bytes_since(&self, start: usize) -> &'a [u8] {
        let start = start.min(self.cursor);
        &self.bytes[start..self.cursor]
    }

    /// Fails when bytes remain after a complete value was read.
    pub fn ensure_consumed(&self, field: &'static str) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(CodecError::TrailingBytes { field, remaining }),
        }
    }

    /// Reads exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize, field: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::unexpected_end(field, len, self.remaining()));
        }
        let start = self.cursor;
        self.cursor += len;
        Ok(&self.bytes[start..self.cursor])
    }

    /// Reads a single byte.
    pub fn read_byte(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.read_bytes(1, field)?[0])
    }

    /// Reads a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads a 32 byte id.
    pub fn read_digest(&mut self, field: &'static str) -> Result<Digest32> {
        Ok(Digest32(self.read_array::<DIGEST32_SIZE>(field)?))
    }

    /// Reads an unsigned VLQ integer (7 bits per byte, least significant group first).
    pub fn read_u64(&mut self, field: &'static str) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0u32;

        loop {
            let byte = self.read_byte(field)?;
            let group = u64::from(byte & 0x7F);

            if shift == 63 && group > 1 {
                return Err(CodecError::VlqOverflow { field });
            }
            result |= group << shift;

            if (byte & 0x80) == 0 {
                return Ok(result);
            }
            shift += 7;

            if shift > 63 {
                return Err(CodecError::VlqOverflow { field });
            }
        }
    }

    /// Reads a VLQ integer that must fit in 32 bits.
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        let value = self.read_u64(field)?;
        u32::try_from(value).map_err(|_| CodecError::OutOfRange { field, value })
    }

    /// Reads a VLQ integer that must fit in 16 bits.
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        let value = self.read_u64(field)?;
        u16::try_from(value).map_err(|_| CodecError::OutOfRange { field, value })
    }

    /// Reads a VLQ length or element count.
    pub fn read_count(&mut self, field: &'static str) -> Result<usize> {
        Ok(self.read_u32(field)? as usize)
    }

    /// Reads a count-prefixed collection, decoding each element with `read_item`.
    pub fn read_collection<T, F>(&mut self, field: &'static str, mut read_item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self, usize) -> Result<T>,
    {
        let count = self.read_count(field)?;
        // Every element takes at least one byte, so a count larger than the
        // remaining input can never be satisfied.
        let mut out = Vec::with_capacity(count.min(self.remaining()));
        for index in 0..count {
            out.push(read_item(self, index)?);
        }
        Ok(out)
    }
}

impl<'a> From<&'a [u8]> for SigmaByteReader<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        SigmaByteReader::new(bytes)
    }
}
