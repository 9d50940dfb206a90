/// Compact 2D grid of dark/light values (`true` = dark)
///
/// Bits are packed row-major, indexed by `y * width + x`. Every accessor takes
/// `(x, y)` in that order. Reading or writing outside the grid is a caller bug
/// and panics; use [`Bitmap::try_get`] when probing near edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create an all-light bitmap with the given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Build a bitmap from row-major booleans.
    ///
    /// # Panics
    /// Panics if `cells.len() != width * height`.
    pub fn from_cells(width: usize, height: usize, cells: &[bool]) -> Self {
        assert_eq!(
            cells.len(),
            width * height,
            "cell count does not match {width}x{height}"
        );
        let mut bitmap = Self::new(width, height);
        for (index, &dark) in cells.iter().enumerate() {
            if dark {
                bitmap.data[index / 8] |= 1 << (index % 8);
            }
        }
        bitmap
    }

    /// Bitmap width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bitmap height
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        if x >= self.width || y >= self.height {
            panic!(
                "bitmap index out of bounds: ({x}, {y}) in {}x{}",
                self.width, self.height
            );
        }
        y * self.width + x
    }

    /// Value at (x, y).
    ///
    /// # Panics
    /// Panics when (x, y) lies outside the bitmap.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        let index = self.index(x, y);
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Value at signed coordinates, `None` outside the bitmap
    #[inline]
    pub fn try_get(&self, x: isize, y: isize) -> Option<bool> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.get(x as usize, y as usize))
    }

    /// Set value at (x, y).
    ///
    /// # Panics
    /// Panics when (x, y) lies outside the bitmap.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        let index = self.index(x, y);
        if value {
            self.data[index / 8] |= 1 << (index % 8);
        } else {
            self.data[index / 8] &= !(1 << (index % 8));
        }
    }

    /// Flip the value at (x, y)
    #[inline]
    pub fn toggle(&mut self, x: usize, y: usize) {
        let index = self.index(x, y);
        self.data[index / 8] ^= 1 << (index % 8);
    }

    /// Invert every cell (used for light-on-dark symbols)
    pub fn negate(&mut self) {
        for byte in &mut self.data {
            *byte = !*byte;
        }
        // Keep padding bits of the last byte clear so equality stays exact.
        let used = self.width * self.height;
        if used % 8 != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1u8 << (used % 8)) - 1;
            }
        }
    }

    /// Copy of the `w x h` region whose top-left corner is (x, y).
    ///
    /// # Panics
    /// Panics when the region does not fit inside the bitmap.
    pub fn slice(&self, x: usize, y: usize, w: usize, h: usize) -> Bitmap {
        if x + w > self.width || y + h > self.height {
            panic!(
                "bitmap slice out of bounds: {w}x{h} at ({x}, {y}) in {}x{}",
                self.width, self.height
            );
        }
        let mut out = Bitmap::new(w, h);
        for yy in 0..h {
            for xx in 0..w {
                if self.get(x + xx, y + yy) {
                    out.set(xx, yy, true);
                }
            }
        }
        out
    }

    /// Mirror across the main diagonal
    pub fn transpose(&self) -> Bitmap {
        let mut out = Bitmap::new(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    out.set(y, x, true);
                }
            }
        }
        out
    }

    /// Number of dark cells
    pub fn count_dark(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl Default for Bitmap {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
