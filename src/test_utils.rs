//! Symbol encoder and pixel renderer for unit tests.
//!
//! Builds ISO/IEC 18004 symbols from the decoder's own tables so a test can
//! pick the version, level and mask explicitly.

use crate::decoder::bch;
use crate::decoder::bitstream::BitstreamExtractor;
use crate::decoder::format::{FormatInfo, format_positions};
use crate::decoder::function_mask::{FunctionMask, alignment_centers};
use crate::decoder::interleave::{Block, BlockLayout, interleave};
use crate::decoder::reed_solomon::ReedSolomonEncoder;
use crate::decoder::segments::Mode;
use crate::decoder::unmask::unmask;
use crate::decoder::version::version_positions;
use crate::models::{Bitmap, ECLevel, MaskPattern, Point, Version};
use crate::utils::geometry::PerspectiveTransform;

/// MSB-first bit accumulator
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bits: Vec<bool>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: u32, count: usize) {
        for i in (0..count).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Pack into bytes, zero-padding the last one
    pub fn into_bytes(self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &bit)| acc | ((bit as u8) << (7 - i)))
            })
            .collect()
    }
}

/// Append a byte-mode segment
pub fn push_byte_segment(writer: &mut BitWriter, version: Version, bytes: &[u8]) {
    writer.push(0b0100, 4);
    writer.push(bytes.len() as u32, Mode::Byte.char_count_bits(version));
    for &b in bytes {
        writer.push(b as u32, 8);
    }
}

/// Terminate and pad segment bits to the data capacity of the symbol
pub fn data_codewords(mut bits: BitWriter, version: Version, ec_level: ECLevel) -> Vec<u8> {
    let capacity = BlockLayout::new(version, ec_level).total_data();
    assert!(bits.len() <= capacity * 8, "payload too large for symbol");
    let terminator = (capacity * 8 - bits.len()).min(4);
    bits.push(0, terminator);
    let mut bytes = bits.into_bytes();
    for pad in [0xEC, 0x11].into_iter().cycle() {
        if bytes.len() >= capacity {
            break;
        }
        bytes.push(pad);
    }
    bytes
}

/// Split data codewords into blocks, append ECC and interleave
pub fn encode_codewords(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<u8> {
    let layout = BlockLayout::new(version, ec_level);
    assert_eq!(data.len(), layout.total_data());
    let encoder = ReedSolomonEncoder::new(layout.ecc_per_block);
    let mut offset = 0;
    let blocks: Vec<Block> = (0..layout.num_blocks)
        .map(|i| {
            let chunk = &data[offset..offset + layout.data_len(i)];
            offset += chunk.len();
            let mut codewords = chunk.to_vec();
            codewords.extend(encoder.encode(chunk));
            Block {
                codewords,
                num_data: chunk.len(),
            }
        })
        .collect();
    interleave(&blocks)
}

/// Complete module grid for the given segment bits
pub fn build_symbol(
    bits: BitWriter,
    version: Version,
    ec_level: ECLevel,
    mask: MaskPattern,
) -> Bitmap {
    let codewords = encode_codewords(&data_codewords(bits, version, ec_level), version, ec_level);
    place_codewords(&codewords, version, ec_level, mask)
}

/// Place already interleaved codewords, mask them and draw function patterns
pub fn place_codewords(
    codewords: &[u8],
    version: Version,
    ec_level: ECLevel,
    mask: MaskPattern,
) -> Bitmap {
    let dim = version.dimension();
    let func = FunctionMask::new(version);
    let mut grid = Bitmap::new(dim, dim);

    for (i, &(x, y)) in BitstreamExtractor::data_positions(&func).iter().enumerate() {
        if let Some(&byte) = codewords.get(i / 8) {
            grid.set(x, y, (byte >> (7 - i % 8)) & 1 == 1);
        }
    }
    unmask(&mut grid, mask, &func);

    draw_function_patterns(&mut grid, version);
    write_format(
        &mut grid,
        FormatInfo {
            ec_level,
            mask_pattern: mask,
        },
    );
    grid
}

/// Byte-mode symbol holding `text`
pub fn encode_text(text: &str, version: Version, ec_level: ECLevel, mask: MaskPattern) -> Bitmap {
    let mut bits = BitWriter::new();
    push_byte_segment(&mut bits, version, text.as_bytes());
    build_symbol(bits, version, ec_level, mask)
}

/// Write both format copies
pub fn write_format(grid: &mut Bitmap, info: FormatInfo) {
    let codeword = bch::format_codeword(info.data_bits());
    let (first, second) = format_positions(grid.width());
    for (i, (&(x1, y1), &(x2, y2))) in first.iter().zip(second.iter()).enumerate() {
        let bit = (codeword >> (14 - i)) & 1 == 1;
        grid.set(x1, y1, bit);
        grid.set(x2, y2, bit);
    }
}

fn draw_function_patterns(grid: &mut Bitmap, version: Version) {
    let dim = version.dimension();

    for (ox, oy) in [(0, 0), (dim - 7, 0), (0, dim - 7)] {
        for dy in 0..7 {
            for dx in 0..7 {
                let ring = (dx as isize - 3).abs().max((dy as isize - 3).abs());
                grid.set(ox + dx, oy + dy, ring != 2);
            }
        }
    }

    for i in 8..dim - 8 {
        grid.set(6, i, i % 2 == 0);
        grid.set(i, 6, i % 2 == 0);
    }

    for (cx, cy) in alignment_centers(version) {
        for dy in -2isize..=2 {
            for dx in -2isize..=2 {
                let ring = dx.abs().max(dy.abs());
                grid.set(
                    (cx as isize + dx) as usize,
                    (cy as isize + dy) as usize,
                    ring != 1,
                );
            }
        }
    }

    grid.set(8, dim - 8, true);

    if version.number() >= 7 {
        let codeword = bch::version_codeword(version.number());
        let (top_right, bottom_left) = version_positions(dim);
        for (i, (&(x1, y1), &(x2, y2))) in top_right.iter().zip(bottom_left.iter()).enumerate() {
            let bit = (codeword >> (17 - i)) & 1 == 1;
            grid.set(x1, y1, bit);
            grid.set(x2, y2, bit);
        }
    }
}

/// Grayscale pixels for a module grid: `module_px` pixels per module and a
/// light quiet zone of `quiet` modules. Returns `(pixels, width, height)`.
pub fn render(grid: &Bitmap, module_px: usize, quiet: usize) -> (Vec<u8>, usize, usize) {
    let side = (grid.width() + 2 * quiet) * module_px;
    let mut pixels = vec![255u8; side * side];
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if !grid.get(x, y) {
                continue;
            }
            let px = (x + quiet) * module_px;
            let py = (y + quiet) * module_px;
            for row in py..py + module_px {
                pixels[row * side + px..row * side + px + module_px].fill(0);
            }
        }
    }
    (pixels, side, side)
}

/// Keystone a square `side x side` image: the top edge shrinks to `ratio`
/// of the bottom edge, inside a 20 px light margin. Nearest-neighbour, so
/// 0/255 input stays 0/255. Returns `(pixels, out_side, source_to_output)`.
pub fn keystone(pixels: &[u8], side: usize, ratio: f32) -> (Vec<u8>, usize, PerspectiveTransform) {
    let margin = 20.0;
    let s = side as f32;
    let top = s * ratio;
    let out = side + 40;
    let src = [
        Point::new(0.0, 0.0),
        Point::new(s, 0.0),
        Point::new(s, s),
        Point::new(0.0, s),
    ];
    let dst = [
        Point::new(margin + (s - top) / 2.0, margin),
        Point::new(margin + (s + top) / 2.0, margin),
        Point::new(margin + s, margin + s),
        Point::new(margin, margin + s),
    ];
    let to_image = PerspectiveTransform::from_points(&src, &dst).unwrap();
    let to_source = PerspectiveTransform::from_points(&dst, &src).unwrap();

    let mut warped = vec![255u8; out * out];
    for y in 0..out {
        for x in 0..out {
            let p = to_source
                .transform(&Point::new(x as f32 + 0.5, y as f32 + 0.5))
                .unwrap();
            if p.x >= 0.0 && p.y >= 0.0 && p.x < s && p.y < s {
                warped[y * out + x] = pixels[p.y as usize * side + p.x as usize];
            }
        }
    }
    (warped, out, to_image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_writer_packs_msb_first() {
        let mut writer = BitWriter::new();
        writer.push(0b101, 3);
        writer.push(0b1, 1);
        writer.push(0xFF, 8);
        assert_eq!(writer.len(), 12);
        assert_eq!(writer.into_bytes(), vec![0b1011_1111, 0b1111_0000]);
    }

    #[test]
    fn test_annex_i_data_codewords() {
        // "01234567" numeric, 1-M
        let version = Version::new(1).unwrap();
        let mut bits = BitWriter::new();
        bits.push(0b0001, 4);
        bits.push(8, 10);
        bits.push(12, 10);
        bits.push(345, 10);
        bits.push(67, 7);
        assert_eq!(
            data_codewords(bits, version, ECLevel::M),
            vec![
                0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC,
                0x11, 0xEC, 0x11
            ]
        );
    }
}
