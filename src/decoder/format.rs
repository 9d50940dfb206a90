/// Format information extraction from QR code
use crate::decoder::bch;
use crate::error::{DecodeError, Result};
use crate::models::{Bitmap, ECLevel, MaskPattern};

/// Format info is 15 bits (5 data + 10 ECC), stored twice around the finders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub ec_level: ECLevel,
    pub mask_pattern: MaskPattern,
}

impl FormatInfo {
    /// Read and correct both copies; they must agree
    pub fn extract(grid: &Bitmap) -> Result<Self> {
        let dimension = grid.width();
        let (first, second) = format_positions(dimension);
        let raw_first = read_bits(grid, &first);
        let raw_second = read_bits(grid, &second);

        let decoded_first = bch::decode_format(raw_first);
        let decoded_second = bch::decode_format(raw_second);
        log::trace!(
            "format: raw 0x{raw_first:04X} -> {decoded_first:?}, 0x{raw_second:04X} -> {decoded_second:?}"
        );

        match (decoded_first, decoded_second) {
            (Some(a), Some(b)) if a == b => Ok(Self::from_data_bits(a)),
            _ => Err(DecodeError::FormatInfoUnrecoverable),
        }
    }

    /// Interpret the 5 corrected data bits: EC level in bits 4-3, mask in 2-0
    pub fn from_data_bits(data: u8) -> Self {
        Self {
            ec_level: ECLevel::from_format_bits(data >> 3),
            mask_pattern: MaskPattern::from_bits(data),
        }
    }

    /// The 5 data bits this format info is encoded from
    pub fn data_bits(&self) -> u8 {
        (self.ec_level.format_bits() << 3) | self.mask_pattern.bits()
    }
}

/// Module (x, y) positions of both format copies, most significant bit first
pub fn format_positions(dimension: usize) -> ([(usize, usize); 15], [(usize, usize); 15]) {
    let mut first = [(0usize, 0usize); 15];
    let mut idx = 0;
    for x in 0..6 {
        first[idx] = (x, 8);
        idx += 1;
    }
    for pos in [(7, 8), (8, 8), (8, 7)] {
        first[idx] = pos;
        idx += 1;
    }
    for y in (0..6).rev() {
        first[idx] = (8, y);
        idx += 1;
    }

    let mut second = [(0usize, 0usize); 15];
    let mut idx = 0;
    for y in (dimension - 7..dimension).rev() {
        second[idx] = (8, y);
        idx += 1;
    }
    for x in dimension - 8..dimension {
        second[idx] = (x, 8);
        idx += 1;
    }

    (first, second)
}

fn read_bits(grid: &Bitmap, positions: &[(usize, usize)]) -> u16 {
    positions
        .iter()
        .fold(0u16, |acc, &(x, y)| (acc << 1) | grid.get(x, y) as u16)
}
