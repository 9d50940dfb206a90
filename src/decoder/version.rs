/// Version information extraction (versions 7-40)
use crate::decoder::bch;
use crate::error::{DecodeError, Result};
use crate::models::{Bitmap, Version};

/// Smallest grid that carries version blocks (version 7)
pub const MIN_VERSION_INFO_DIMENSION: usize = 45;

pub struct VersionInfo;

impl VersionInfo {
    /// Version of the grid. Below version 7 it follows from the dimension;
    /// from version 7 both 18-bit blocks are read and BCH-corrected.
    pub fn extract(grid: &Bitmap) -> Result<Version> {
        let dimension = grid.width();
        let provisional =
            Version::from_dimension(dimension).ok_or(DecodeError::VersionInfoUnrecoverable)?;
        if dimension < MIN_VERSION_INFO_DIMENSION {
            return Ok(provisional);
        }

        let version = Self::read_blocks(grid)?;
        if version.dimension() != dimension {
            log::debug!(
                "version block says {} but grid is {dimension} modules",
                version.number()
            );
            return Err(DecodeError::VersionInfoUnrecoverable);
        }
        Ok(version)
    }

    /// Decode the version blocks without checking them against the grid size
    pub fn read_blocks(grid: &Bitmap) -> Result<Version> {
        let (top_right, bottom_left) = version_positions(grid.width());
        let first = bch::decode_version(read_bits(grid, &top_right));
        let second = bch::decode_version(read_bits(grid, &bottom_left));
        log::trace!("version blocks: {first:?} / {second:?}");

        let number = match (first, second) {
            (Some(a), Some(b)) if a != b => return Err(DecodeError::VersionInfoUnrecoverable),
            (Some(a), _) | (None, Some(a)) => a,
            (None, None) => return Err(DecodeError::VersionInfoUnrecoverable),
        };
        Version::new(number).ok_or(DecodeError::VersionInfoUnrecoverable)
    }
}

/// Module (x, y) positions of both version blocks, most significant bit first
pub fn version_positions(dimension: usize) -> ([(usize, usize); 18], [(usize, usize); 18]) {
    let mut top_right = [(0usize, 0usize); 18];
    let mut bottom_left = [(0usize, 0usize); 18];
    let mut idx = 0;
    for a in (0..6).rev() {
        for b in (dimension - 11..=dimension - 9).rev() {
            top_right[idx] = (b, a);
            bottom_left[idx] = (a, b);
            idx += 1;
        }
    }
    (top_right, bottom_left)
}

fn read_bits(grid: &Bitmap, positions: &[(usize, usize)]) -> u32 {
    positions
        .iter()
        .fold(0u32, |acc, &(x, y)| (acc << 1) | grid.get(x, y) as u32)
}
