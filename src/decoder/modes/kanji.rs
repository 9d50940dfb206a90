/// Kanji mode decoder (Mode 1000): 13-bit compacted Shift-JIS
use crate::decoder::bit_reader::BitReader;
use crate::error::{DecodeError, Result};

pub struct KanjiDecoder;

impl KanjiDecoder {
    /// Decode `character_count` double-byte characters to text
    pub fn decode(reader: &mut BitReader<'_>, character_count: usize) -> Result<String> {
        let bytes = Self::decode_bytes(reader, character_count)?;
        let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(&bytes);
        if had_errors {
            return Err(DecodeError::InvalidBitStream("invalid Shift-JIS in kanji segment"));
        }
        Ok(text.into_owned())
    }

    /// Expand each 13-bit value back to its two Shift-JIS bytes
    pub fn decode_bytes(reader: &mut BitReader<'_>, character_count: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(character_count * 2);
        for _ in 0..character_count {
            let value = reader.read(13)?;
            let mut assembled = ((value / 0xC0) << 8) | (value % 0xC0);
            if assembled < 0x1F00 {
                assembled += 0x8140;
            } else {
                assembled += 0xC140;
            }
            bytes.push((assembled >> 8) as u8);
            bytes.push(assembled as u8);
        }
        Ok(bytes)
    }
}
