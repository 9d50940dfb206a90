/// Numeric mode decoder (Mode 0001)
use crate::decoder::bit_reader::BitReader;
use crate::error::{DecodeError, Result};

/// Groups of 3 digits = 10 bits, 2 digits = 7 bits, 1 digit = 4 bits
pub struct NumericDecoder;

impl NumericDecoder {
    /// Decode `character_count` digits
    pub fn decode(reader: &mut BitReader<'_>, character_count: usize) -> Result<String> {
        let mut result = String::with_capacity(character_count);
        let mut chars_remaining = character_count;

        while chars_remaining > 0 {
            let group_size = chars_remaining.min(3);
            let (bits_needed, limit) = match group_size {
                3 => (10, 1000),
                2 => (7, 100),
                _ => (4, 10),
            };

            let value = reader.read(bits_needed)?;
            if value >= limit {
                return Err(DecodeError::InvalidBitStream("numeric group out of range"));
            }

            match group_size {
                3 => result.push_str(&format!("{value:03}")),
                2 => result.push_str(&format!("{value:02}")),
                _ => result.push_str(&format!("{value}")),
            }
            chars_remaining -= group_size;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_decode() {
        // 012 -> 0000001100, 345 -> 0101011001
        let bytes = [0b0000_0011, 0b0001_0101, 0b1001_0000];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(NumericDecoder::decode(&mut reader, 6), Ok("012345".to_string()));
        assert_eq!(reader.available(), 4);

        // 012 -> 0000001100, 34 -> 0100010, 5 -> 0101
        let bytes = [0b0000_0011, 0b0001_0001, 0b0010_1000];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(NumericDecoder::decode(&mut reader, 3), Ok("012".to_string()));
        assert_eq!(NumericDecoder::decode(&mut reader, 2), Ok("34".to_string()));
        assert_eq!(NumericDecoder::decode(&mut reader, 1), Ok("5".to_string()));
    }

    #[test]
    fn test_group_over_999_is_rejected() {
        // 1017 does not fit three digits
        let bytes = [0b1111_1110, 0b0100_0000];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(
            NumericDecoder::decode(&mut reader, 3),
            Err(DecodeError::InvalidBitStream("numeric group out of range"))
        );
    }

    #[test]
    fn test_truncated_numeric() {
        let mut reader = BitReader::new(&[0x00]);
        assert!(NumericDecoder::decode(&mut reader, 3).is_err());
    }
}
