use crate::digest::Digest32;
use crate::error::Result;

/// Growable byte buffer with VLQ integer helpers
///
/// Methods return `&mut Self` so field sequences read in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigmaByteWriter {
    buf: Vec<u8>,
}

impl SigmaByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_byte(&mut self, byte: u8) -> &mut Self {
        self.buf.push(byte);
        self
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn write_digest(&mut self, digest: &Digest32) -> &mut Self {
        self.write_bytes(digest.as_bytes())
    }

    /// Writes an unsigned VLQ integer.
    pub fn write_u64(&mut self, mut value: u64) -> &mut Self {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.buf.push(byte);
            if value == 0 {
                break;
            }
        }
        self
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.write_u64(u64::from(value))
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.write_u64(u64::from(value))
    }

    /// Writes a length or element count.
    pub fn write_count(&mut self, count: usize) -> &mut Self {
        self.write_u64(count as u64)
    }

    /// Writes a count-prefixed collection, encoding each element with `write_item`.
    pub fn write_collection<T, F>(&mut self, items: &[T], mut write_item: F) -> Result<&mut Self>
    where
        F: FnMut(&mut Self, &T) -> Result<()>,
    {
        self.write_count(items.len());
        for item in items {
            write_item(self, item)?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigma::SigmaByteReader;

    #[test]
    fn test_write_vlq() {
        let mut writer = SigmaByteWriter::new();
        writer.write_u64(0).write_u64(127).write_u64(128).write_u32(1_000_000);
        assert_eq!(writer.to_hex(), "007f8001c0843d");
    }

    #[test]
    fn test_vlq_boundaries_read_back() {
        let values = [0u64, 1, 0x7F, 0x80, 0x3FFF, 0x4000, u32::MAX as u64, u64::MAX];
        let mut writer = SigmaByteWriter::new();
        for value in values {
            writer.write_u64(value);
        }

        let bytes = writer.into_bytes();
        let mut reader = SigmaByteReader::new(&bytes);
        for value in values {
            assert_eq!(reader.read_u64("value").unwrap(), value);
        }
        assert!(reader.is_empty());
    }

    #[test]
    fn test_write_collection() {
        let mut writer = SigmaByteWriter::with_capacity(8);
        writer
            .write_collection(&[1u8, 2, 3], |w, b| {
                w.write_byte(*b);
                Ok(())
            })
            .unwrap();
        assert_eq!(writer.as_bytes(), &[3, 1, 2, 3]);
    }
}
