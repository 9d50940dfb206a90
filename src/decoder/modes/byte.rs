/// Byte mode decoder (Mode 0100) for 8-bit data
use crate::decoder::bit_reader::BitReader;
use crate::error::Result;

/// Read `character_count` raw bytes; charset handling happens at text assembly
pub struct ByteDecoder;

impl ByteDecoder {
    pub fn decode(reader: &mut BitReader<'_>, character_count: usize) -> Result<Vec<u8>> {
        (0..character_count)
            .map(|_| reader.read(8).map(|b| b as u8))
            .collect()
    }
}
