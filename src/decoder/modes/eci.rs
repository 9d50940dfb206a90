//! Extended Channel Interpretation (Mode 0111)
//!
//! An ECI designator switches the character set used for the byte segments
//! that follow it. Charsets are decoded through `encoding_rs`, except
//! ISO-8859-1 and US-ASCII which map bytes to code points directly.

use std::collections::BTreeMap;

use encoding_rs::Encoding;

use crate::decoder::bit_reader::BitReader;
use crate::error::{DecodeError, Result};

/// Character set for byte segment text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// ISO-8859-1, every byte is the code point of the same value
    Latin1,
    /// US-ASCII, bytes above 0x7F are invalid
    Ascii,
    /// Any charset `encoding_rs` implements
    Encoding(&'static Encoding),
}

impl Charset {
    /// Decode `bytes`, returning the text and whether malformed input was replaced
    pub fn decode(&self, bytes: &[u8]) -> (String, bool) {
        match self {
            Charset::Latin1 => (bytes.iter().map(|&b| b as char).collect(), false),
            Charset::Ascii => {
                let mut had_errors = false;
                let text = bytes
                    .iter()
                    .map(|&b| {
                        if b.is_ascii() {
                            b as char
                        } else {
                            had_errors = true;
                            char::REPLACEMENT_CHARACTER
                        }
                    })
                    .collect();
                (text, had_errors)
            }
            Charset::Encoding(encoding) => {
                let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
                (text.into_owned(), had_errors)
            }
        }
    }

    /// Human-readable charset name
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
            Charset::Encoding(encoding) => encoding.name(),
        }
    }
}

/// ECI designator to charset mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EciTable {
    entries: BTreeMap<u32, Charset>,
}

impl Default for EciTable {
    fn default() -> Self {
        use encoding_rs::*;

        let mut entries = BTreeMap::new();
        entries.insert(1, Charset::Latin1);
        entries.insert(3, Charset::Latin1);
        let iso_parts: [(u32, &'static Encoding); 14] = [
            (4, ISO_8859_2),
            (5, ISO_8859_3),
            (6, ISO_8859_4),
            (7, ISO_8859_5),
            (8, ISO_8859_6),
            (9, ISO_8859_7),
            (10, ISO_8859_8),
            (11, WINDOWS_1254),
            (12, ISO_8859_10),
            (13, WINDOWS_874),
            (15, ISO_8859_13),
            (16, ISO_8859_14),
            (17, ISO_8859_15),
            (18, ISO_8859_16),
        ];
        for (code, encoding) in iso_parts {
            entries.insert(code, Charset::Encoding(encoding));
        }
        entries.insert(20, Charset::Encoding(SHIFT_JIS));
        entries.insert(21, Charset::Encoding(WINDOWS_1250));
        entries.insert(22, Charset::Encoding(WINDOWS_1251));
        entries.insert(23, Charset::Encoding(WINDOWS_1252));
        entries.insert(24, Charset::Encoding(WINDOWS_1256));
        entries.insert(25, Charset::Encoding(UTF_16BE));
        entries.insert(26, Charset::Encoding(UTF_8));
        entries.insert(27, Charset::Ascii);
        entries.insert(170, Charset::Ascii);
        entries.insert(28, Charset::Encoding(BIG5));
        entries.insert(29, Charset::Encoding(GB18030));
        entries.insert(30, Charset::Encoding(EUC_KR));
        Self { entries }
    }
}

impl EciTable {
    /// Table with no designators at all
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace the charset for a designator
    pub fn with_charset(mut self, code: u32, charset: Charset) -> Self {
        self.entries.insert(code, charset);
        self
    }

    /// Charset for a designator, `UnsupportedEci` when unknown
    pub fn lookup(&self, code: u32) -> Result<Charset> {
        self.entries
            .get(&code)
            .copied()
            .ok_or(DecodeError::UnsupportedEci(code))
    }
}

/// Read a 1, 2 or 3 byte ECI designator
pub fn read_designator(reader: &mut BitReader<'_>) -> Result<u32> {
    let first = reader.read(8)?;
    if first & 0x80 == 0 {
        Ok(first & 0x7F)
    } else if first & 0xC0 == 0x80 {
        Ok(((first & 0x3F) << 8) | reader.read(8)?)
    } else if first & 0xE0 == 0xC0 {
        let value = ((first & 0x1F) << 16) | reader.read(16)?;
        if value >= 1_000_000 {
            return Err(DecodeError::InvalidBitStream("ECI designator out of range"));
        }
        Ok(value)
    } else {
        Err(DecodeError::InvalidBitStream("invalid ECI designator"))
    }
}
