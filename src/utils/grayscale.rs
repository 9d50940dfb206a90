/// Convert colour pixels to 8-bit luminance
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
use std::borrow::Cow;

use crate::models::{Image, PixelFormat};

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Luminance plane of an image; grayscale input is borrowed as is
pub fn to_grayscale<'a>(image: &Image<'a>) -> Cow<'a, [u8]> {
    match image.format() {
        PixelFormat::Gray => Cow::Borrowed(image.data()),
        PixelFormat::Rgb => Cow::Owned(rgb_to_grayscale(image.data())),
        PixelFormat::Rgba => Cow::Owned(rgba_to_grayscale(image.data())),
    }
}

/// Convert packed RGB to grayscale
pub fn rgb_to_grayscale(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3).map(|p| luma(p[0], p[1], p[2])).collect()
}

/// Convert packed RGBA to grayscale (ignores alpha channel)
pub fn rgba_to_grayscale(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4).map(|p| luma(p[0], p[1], p[2])).collect()
}
