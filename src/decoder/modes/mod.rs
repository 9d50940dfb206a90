//! QR code data mode decoders
//!
//! This module contains decoders for the QR data modes:
//! - Numeric: digits 0-9, three per 10 bits
//! - Alphanumeric: 45-character set, two per 11 bits
//! - Byte: raw 8-bit data, text charset chosen by ECI
//! - Kanji / Hanzi: 13-bit compacted double-byte characters
//! - ECI: designator parsing and the designator to charset table

pub mod alphanumeric;
pub mod byte;
pub mod eci;
pub mod hanzi;
pub mod kanji;
pub mod numeric;
