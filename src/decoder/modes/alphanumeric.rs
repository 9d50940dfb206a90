/// Alphanumeric mode decoder (Mode 0010)
/// Alphanumeric character set: 0-9, A-Z, space, $%*+-./:
use crate::decoder::bit_reader::BitReader;
use crate::error::{DecodeError, Result};

const ALPHANUMERIC_TABLE: [char; 45] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', ' ', '$',
    '%', '*', '+', '-', '.', '/', ':',
];

const GROUP_SEPARATOR: char = '\u{1D}';

/// Pairs = 11 bits, single = 6 bits
pub struct AlphanumericDecoder;

impl AlphanumericDecoder {
    /// Decode `character_count` characters. Under FNC1, `%` stands for GS
    /// and `%%` for a literal `%`.
    pub fn decode(
        reader: &mut BitReader<'_>,
        character_count: usize,
        fnc1: bool,
    ) -> Result<String> {
        let mut result = String::with_capacity(character_count);
        let mut chars_remaining = character_count;

        while chars_remaining > 0 {
            if chars_remaining >= 2 {
                let value = reader.read(11)? as usize;
                if value >= 45 * 45 {
                    return Err(DecodeError::InvalidBitStream(
                        "alphanumeric pair out of range",
                    ));
                }
                result.push(ALPHANUMERIC_TABLE[value / 45]);
                result.push(ALPHANUMERIC_TABLE[value % 45]);
                chars_remaining -= 2;
            } else {
                let value = reader.read(6)? as usize;
                if value >= 45 {
                    return Err(DecodeError::InvalidBitStream(
                        "alphanumeric character out of range",
                    ));
                }
                result.push(ALPHANUMERIC_TABLE[value]);
                chars_remaining -= 1;
            }
        }

        if fnc1 {
            result = apply_fnc1(&result);
        }
        Ok(result)
    }
}

fn apply_fnc1(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
        } else if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
        } else {
            out.push(GROUP_SEPARATOR);
        }
    }
    out
}
