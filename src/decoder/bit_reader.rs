use crate::error::{DecodeError, Result};

/// MSB-first reader over the corrected data codewords
pub struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Bits not yet consumed
    pub fn available(&self) -> usize {
        self.bytes.len() * 8 - self.position
    }

    /// Read `count` (at most 32) bits as an unsigned value
    pub fn read(&mut self, count: usize) -> Result<u32> {
        debug_assert!(count <= 32);
        if count > self.available() {
            return Err(DecodeError::InvalidBitStream("segment truncated"));
        }
        let mut value = 0u32;
        for _ in 0..count {
            let byte = self.bytes[self.position / 8];
            let bit = (byte >> (7 - self.position % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.position += 1;
        }
        Ok(value)
    }
}
