/// Hanzi mode decoder (Mode 1101): 13-bit compacted GB2312
use crate::decoder::bit_reader::BitReader;
use crate::error::{DecodeError, Result};

/// Subset indicator for GB2312
pub const GB2312_SUBSET: u32 = 1;

pub struct HanziDecoder;

impl HanziDecoder {
    /// Decode `character_count` double-byte characters to text
    pub fn decode(reader: &mut BitReader<'_>, character_count: usize) -> Result<String> {
        let mut bytes = Vec::with_capacity(character_count * 2);
        for _ in 0..character_count {
            let value = reader.read(13)?;
            let mut assembled = ((value / 0x60) << 8) | (value % 0x60);
            if assembled < 0x0A00 {
                assembled += 0xA1A1;
            } else {
                assembled += 0xA6A1;
            }
            bytes.push((assembled >> 8) as u8);
            bytes.push(assembled as u8);
        }
        let (text, _, had_errors) = encoding_rs::GB18030.decode(&bytes);
        if had_errors {
            return Err(DecodeError::InvalidBitStream("invalid GB2312 in hanzi segment"));
        }
        Ok(text.into_owned())
    }
}
