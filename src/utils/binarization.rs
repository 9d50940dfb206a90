//! Grayscale to bitmap conversion.
//!
//! The decoder uses [`adaptive_binarize`]: every pixel is compared with the
//! mean of a square window around it, read from an integral image, so uneven
//! lighting across a photo does not swamp the symbol. Global Otsu and fixed
//! thresholds are kept for callers with clean scans.

use crate::models::Bitmap;

/// Amount a pixel must sit below its local mean to count as dark
pub const BIAS: i32 = 3;

const MIN_WINDOW: usize = 15;
const MAX_WINDOW: usize = 255;

/// Window side for an image: one eighth of the shorter side, clamped and odd
pub fn window_size(width: usize, height: usize) -> usize {
    let side = (width.min(height) / 8).clamp(MIN_WINDOW, MAX_WINDOW);
    if side % 2 == 0 { side + 1 } else { side }
}

/// Summed-area table with a zero first row and column
struct IntegralImage {
    sums: Vec<u64>,
    stride: usize,
}

impl IntegralImage {
    fn new(gray: &[u8], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += gray[y * width + x] as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { sums, stride }
    }

    /// Sum over the half-open rectangle [x0, x1) x [y0, y1)
    fn sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let s = self.stride;
        self.sums[y1 * s + x1] + self.sums[y0 * s + x0]
            - self.sums[y0 * s + x1]
            - self.sums[y1 * s + x0]
    }
}

/// Local-mean threshold: dark when `gray < mean - BIAS + offset`.
/// Windows are clipped at the image border.
pub fn adaptive_binarize(gray: &[u8], width: usize, height: usize, offset: i16) -> Bitmap {
    let integral = IntegralImage::new(gray, width, height);
    let half = window_size(width, height) / 2;
    let bias = (BIAS - offset as i32) as i64;
    let mut binary = Bitmap::new(width, height);

    for y in 0..height {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half + 1).min(height);
        for x in 0..width {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half + 1).min(width);
            let count = ((x1 - x0) * (y1 - y0)) as i64;
            let sum = integral.sum(x0, y0, x1, y1) as i64;
            // gray < sum / count - bias, kept in integers
            let pixel = gray[y * width + x] as i64;
            if (pixel + bias) * count < sum {
                binary.set(x, y, true);
            }
        }
    }

    binary
}

/// Convert grayscale image to binary using Otsu's thresholding method
/// Returns a Bitmap where true = black, false = white
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> Bitmap {
    threshold_binarize(gray, width, height, otsu_threshold(gray))
}

/// Otsu's optimal global threshold
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total = gray.len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut below_count = 0.0;
    let mut below_sum = 0.0;
    let mut max_variance = 0.0;
    let mut optimal_threshold = 128u8;

    for threshold in 1..=255usize {
        below_count += histogram[threshold - 1] as f64;
        below_sum += (threshold - 1) as f64 * histogram[threshold - 1] as f64;
        let above_count = total - below_count;
        if below_count == 0.0 || above_count == 0.0 {
            continue;
        }

        let mean_below = below_sum / below_count;
        let mean_above = (total_sum - below_sum) / above_count;
        let variance =
            (below_count / total) * (above_count / total) * (mean_below - mean_above).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold as u8;
        }
    }

    optimal_threshold
}

/// Simple global threshold binarization
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> Bitmap {
    let mut binary = Bitmap::new(width, height);
    for y in 0..height {
        for x in 0..width {
            binary.set(x, y, gray[y * width + x] < threshold);
        }
    }
    binary
}
