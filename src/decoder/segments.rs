//! Segment grammar of the corrected data codewords and text assembly.
//!
//! The stream is a sequence of `mode indicator | [count] | payload` segments.
//! A `0000` terminator, or fewer than four bits left, ends it.

use crate::decoder::bit_reader::BitReader;
use crate::decoder::modes::alphanumeric::AlphanumericDecoder;
use crate::decoder::modes::byte::ByteDecoder;
use crate::decoder::modes::eci::{self, Charset, EciTable};
use crate::decoder::modes::hanzi::{self, HanziDecoder};
use crate::decoder::modes::kanji::KanjiDecoder;
use crate::decoder::modes::numeric::NumericDecoder;
use crate::error::{DecodeError, Result};
use crate::models::{StructuredAppend, Version};

/// One decoded segment of the data stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Numeric(String),
    Alphanumeric(String),
    /// Raw bytes with the ECI designator in force when they were read
    Byte {
        bytes: Vec<u8>,
        eci: Option<u32>,
    },
    Kanji(String),
    Hanzi(String),
    Eci(u32),
    StructuredAppend(StructuredAppend),
    Fnc1First,
    Fnc1Second {
        application_indicator: u8,
    },
}

/// 4-bit mode indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    StructuredAppend,
    Byte,
    Fnc1First,
    Eci,
    Kanji,
    Fnc1Second,
    Hanzi,
}

impl Mode {
    /// Mode for an indicator; `None` for the terminator and unassigned values
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0b0001 => Some(Mode::Numeric),
            0b0010 => Some(Mode::Alphanumeric),
            0b0011 => Some(Mode::StructuredAppend),
            0b0100 => Some(Mode::Byte),
            0b0101 => Some(Mode::Fnc1First),
            0b0111 => Some(Mode::Eci),
            0b1000 => Some(Mode::Kanji),
            0b1001 => Some(Mode::Fnc1Second),
            0b1101 => Some(Mode::Hanzi),
            _ => None,
        }
    }

    /// Width of the character count field, by version band 1-9 / 10-26 / 27-40
    pub fn char_count_bits(&self, version: Version) -> usize {
        let band = match version.number() {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        let widths = match self {
            Mode::Numeric => [10, 12, 14],
            Mode::Alphanumeric => [9, 11, 13],
            Mode::Byte => [8, 16, 16],
            Mode::Kanji | Mode::Hanzi => [8, 10, 12],
            _ => [0, 0, 0],
        };
        widths[band]
    }
}

/// Everything recovered from the data codewords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub segments: Vec<Segment>,
    pub content: String,
    pub data: Vec<u8>,
    pub structured_append: Option<StructuredAppend>,
}

/// Parse the segment stream and assemble its text
pub fn decode_payload(codewords: &[u8], version: Version, eci_table: &EciTable) -> Result<Payload> {
    let segments = parse_segments(codewords, version, eci_table)?;
    let content = assemble_text(&segments, eci_table)?;

    let mut data = Vec::new();
    let mut structured_append = None;
    for segment in &segments {
        match segment {
            Segment::Numeric(text)
            | Segment::Alphanumeric(text)
            | Segment::Kanji(text)
            | Segment::Hanzi(text) => data.extend_from_slice(text.as_bytes()),
            Segment::Byte { bytes, .. } => data.extend_from_slice(bytes),
            Segment::StructuredAppend(header) => {
                structured_append.get_or_insert(*header);
            }
            Segment::Eci(_) | Segment::Fnc1First | Segment::Fnc1Second { .. } => {}
        }
    }

    Ok(Payload {
        segments,
        content,
        data,
        structured_append,
    })
}

/// Split the stream into segments
pub fn parse_segments(
    codewords: &[u8],
    version: Version,
    eci_table: &EciTable,
) -> Result<Vec<Segment>> {
    let mut reader = BitReader::new(codewords);
    let mut segments = Vec::new();
    let mut active_eci: Option<u32> = None;
    let mut fnc1 = false;

    while reader.available() >= 4 {
        let indicator = reader.read(4)?;
        if indicator == 0 {
            break;
        }
        let mode = Mode::from_bits(indicator)
            .ok_or(DecodeError::InvalidBitStream("unknown mode indicator"))?;

        let segment = match mode {
            Mode::Numeric => {
                let count = reader.read(mode.char_count_bits(version))? as usize;
                Segment::Numeric(NumericDecoder::decode(&mut reader, count)?)
            }
            Mode::Alphanumeric => {
                let count = reader.read(mode.char_count_bits(version))? as usize;
                Segment::Alphanumeric(AlphanumericDecoder::decode(&mut reader, count, fnc1)?)
            }
            Mode::Byte => {
                let count = reader.read(mode.char_count_bits(version))? as usize;
                Segment::Byte {
                    bytes: ByteDecoder::decode(&mut reader, count)?,
                    eci: active_eci,
                }
            }
            Mode::Kanji => {
                let count = reader.read(mode.char_count_bits(version))? as usize;
                Segment::Kanji(KanjiDecoder::decode(&mut reader, count)?)
            }
            Mode::Hanzi => {
                let subset = reader.read(4)?;
                if subset != hanzi::GB2312_SUBSET {
                    return Err(DecodeError::InvalidBitStream("unsupported hanzi subset"));
                }
                let count = reader.read(mode.char_count_bits(version))? as usize;
                Segment::Hanzi(HanziDecoder::decode(&mut reader, count)?)
            }
            Mode::Eci => {
                let code = eci::read_designator(&mut reader)?;
                eci_table.lookup(code)?;
                active_eci = Some(code);
                Segment::Eci(code)
            }
            Mode::StructuredAppend => {
                let bits = reader.read(16)?;
                Segment::StructuredAppend(StructuredAppend {
                    index: ((bits >> 12) & 0x0F) as u8,
                    total: ((bits >> 8) & 0x0F) as u8 + 1,
                    parity: (bits & 0xFF) as u8,
                })
            }
            Mode::Fnc1First => {
                fnc1 = true;
                Segment::Fnc1First
            }
            Mode::Fnc1Second => {
                let indicator = reader.read(8)?;
                // Two-digit AI or a single letter (a-z, A-Z) encoded as value + 100
                if !((0..100).contains(&indicator)
                    || (165..191).contains(&indicator)
                    || (197..223).contains(&indicator))
                {
                    return Err(DecodeError::InvalidBitStream(
                        "invalid FNC1 application indicator",
                    ));
                }
                fnc1 = true;
                Segment::Fnc1Second {
                    application_indicator: indicator as u8,
                }
            }
        };
        log::trace!("segment: {segment:?}");
        segments.push(segment);
    }

    Ok(segments)
}

/// Concatenate segment text. Runs of byte segments under the same ECI are
/// decoded together so multi-byte characters may span segments.
pub fn assemble_text(segments: &[Segment], eci_table: &EciTable) -> Result<String> {
    let mut text = String::new();
    let mut pending: Vec<u8> = Vec::new();
    let mut pending_eci: Option<u32> = None;

    for (position, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Byte { bytes, eci } => {
                if *eci != pending_eci && !pending.is_empty() {
                    flush_bytes(&mut text, &mut pending, pending_eci, eci_table)?;
                }
                pending_eci = *eci;
                pending.extend_from_slice(bytes);
            }
            Segment::Numeric(s)
            | Segment::Alphanumeric(s)
            | Segment::Kanji(s)
            | Segment::Hanzi(s) => {
                flush_bytes(&mut text, &mut pending, pending_eci, eci_table)?;
                text.push_str(s);
            }
            Segment::Fnc1Second {
                application_indicator,
            } if position == 0 => {
                // AIM prefix: two digits, or the letter the value encodes
                let ai = *application_indicator;
                if ai < 100 {
                    text.push_str(&format!("{ai:02}"));
                } else {
                    text.push((ai - 100) as char);
                }
            }
            _ => {}
        }
    }
    flush_bytes(&mut text, &mut pending, pending_eci, eci_table)?;
    Ok(text)
}

fn flush_bytes(
    text: &mut String,
    pending: &mut Vec<u8>,
    eci: Option<u32>,
    eci_table: &EciTable,
) -> Result<()> {
    if pending.is_empty() {
        return Ok(());
    }
    match eci {
        Some(code) => {
            let charset = eci_table.lookup(code)?;
            let (decoded, had_errors) = charset.decode(pending);
            if had_errors {
                log::warn!(
                    "byte segment is not valid {} (ECI {code}); using replacement characters",
                    charset.name()
                );
            }
            text.push_str(&decoded);
        }
        None => match std::str::from_utf8(pending) {
            Ok(s) => text.push_str(s),
            Err(_) => text.push_str(&Charset::Latin1.decode(pending).0),
        },
    }
    pending.clear();
    Ok(())
}
