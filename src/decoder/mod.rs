//! QR code decoding modules
//!
//! Everything after sampling: the module grid goes through format and version
//! recovery, unmasking, codeword extraction, Reed-Solomon correction and
//! segment parsing.

/// BCH error correction for format and version info
pub mod bch;
/// MSB-first reader over data codewords
pub mod bit_reader;
/// Codeword extraction from the module grid
pub mod bitstream;
/// Format information extraction (mask pattern, EC level)
pub mod format;
/// Function module mask builder (finder/timing/format/alignment/version)
pub mod function_mask;
/// GF(256) arithmetic
pub mod galois;
/// Block split and merge
pub mod interleave;
/// Data mode decoders (numeric, alphanumeric, byte, kanji, hanzi, ECI)
pub mod modes;
/// Main QR decoder that orchestrates the decoding pipeline
pub mod qr_decoder;
/// Reed-Solomon error correction
pub mod reed_solomon;
/// Segment grammar and text assembly
pub mod segments;
/// QR specification tables (ECC codewords/blocks)
pub mod tables;
/// QR code unmasking (removes mask patterns)
pub mod unmask;
/// Version information extraction (versions 7-40)
pub mod version;

pub use qr_decoder::QrDecoder;
