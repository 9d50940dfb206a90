/// Codeword extraction from the module grid
use crate::decoder::function_mask::FunctionMask;
use crate::models::Bitmap;

/// Walks the data modules in placement order
pub struct BitstreamExtractor;

impl BitstreamExtractor {
    /// Data module positions as (x, y) in the standard zig-zag order: two-column
    /// strips from the right edge, alternating upward and downward, skipping the
    /// vertical timing column.
    pub fn data_positions(func: &FunctionMask) -> Vec<(usize, usize)> {
        let dimension = func.size();
        let mut positions = Vec::with_capacity(func.data_modules_count());
        let mut upward = true;
        let mut col = dimension as isize - 1;

        while col > 0 {
            if col == 6 {
                col -= 1;
            }
            let right = col as usize;
            let left = right - 1;

            for step in 0..dimension {
                let row = if upward { dimension - 1 - step } else { step };
                for x in [right, left] {
                    if !func.is_function(x, row) {
                        positions.push((x, row));
                    }
                }
            }

            upward = !upward;
            col -= 2;
        }

        positions
    }

    /// Pack the data modules into codewords, MSB first. Remainder bits that do
    /// not fill a whole byte are dropped.
    pub fn extract_codewords(grid: &Bitmap, func: &FunctionMask) -> Vec<u8> {
        let positions = Self::data_positions(func);
        positions
            .chunks_exact(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .fold(0u8, |acc, &(x, y)| (acc << 1) | grid.get(x, y) as u8)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::tables::total_codewords;
    use crate::models::Version;

    #[test]
    fn test_every_data_module_visited_once() {
        for n in [1u8, 2, 7, 14, 40] {
            let version = Version::new(n).unwrap();
            let func = FunctionMask::new(version);
            let mut positions = BitstreamExtractor::data_positions(&func);
            assert_eq!(positions.len(), func.data_modules_count());
            positions.sort();
            positions.dedup();
            assert_eq!(positions.len(), func.data_modules_count());
        }
    }

    #[test]
    fn test_codeword_count() {
        for version in Version::all() {
            let func = FunctionMask::new(version);
            let grid = Bitmap::new(version.dimension(), version.dimension());
            let codewords = BitstreamExtractor::extract_codewords(&grid, &func);
            assert_eq!(codewords.len(), total_codewords(version));
        }
    }

    #[test]
    fn test_first_codeword_starts_bottom_right() {
        let version = Version::new(1).unwrap();
        let func = FunctionMask::new(version);
        let positions = BitstreamExtractor::data_positions(&func);
        assert_eq!(&positions[..4], &[(20, 20), (19, 20), (20, 19), (19, 19)]);

        let mut grid = Bitmap::new(21, 21);
        grid.set(20, 20, true);
        grid.set(19, 19, true);
        let codewords = BitstreamExtractor::extract_codewords(&grid, &func);
        assert_eq!(codewords[0], 0b1001_0000);
    }
}
