//! qr_decode - QR code decoding engine
//!
//! Takes raw pixel buffers (camera frames, decoded stills) to the payload of
//! the QR symbol they show, following ISO/IEC 18004: adaptive binarization,
//! finder and alignment detection, perspective correction, format and version
//! recovery, Reed-Solomon correction, de-interleaving and segment decoding
//! with ECI charsets.
//!
//! ```no_run
//! use qr_decode::{decode, Image};
//!
//! # fn run(pixels: &[u8]) -> Result<(), qr_decode::DecodeError> {
//! let image = Image::gray(pixels, 640, 480)?;
//! let qr = decode(&image)?;
//! println!("{}", qr.content);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Decoder settings and their environment overrides
pub mod config;
/// Module grid decoding (error correction, format extraction, data modes)
pub mod decoder;
/// Symbol detection (finder patterns, alignment, sampling)
pub mod detector;
/// Error kinds reported by every stage
pub mod error;
/// Core data structures (Image, Bitmap, Point, DecodedQr, etc.)
pub mod models;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use config::DecoderConfig;
pub use decoder::modes::eci::{Charset, EciTable};
pub use decoder::segments::Segment;
pub use error::{DecodeError, Result};
pub use models::{
    Bitmap, DecodedQr, ECLevel, Image, MaskPattern, PixelFormat, Point, StructuredAppend, Version,
};

use decoder::QrDecoder;
use rayon::prelude::*;
use utils::binarization::adaptive_binarize;
use utils::grayscale::to_grayscale;

/// Decode the QR symbol in an image with the default configuration
pub fn decode(image: &Image<'_>) -> Result<DecodedQr> {
    decode_with_config(image, &DecoderConfig::default())
}

/// Decode an 8-bit grayscale buffer of `width * height` bytes
pub fn decode_grayscale(gray: &[u8], width: usize, height: usize) -> Result<DecodedQr> {
    decode(&Image::gray(gray, width, height)?)
}

/// Decode the QR symbol in an image.
///
/// Each threshold offset is tried in order, first as binarized and then (with
/// `try_inverted`) negated. The first success wins. On failure the error of
/// the last offset is returned, preferring the non-inverted attempt's error.
pub fn decode_with_config(image: &Image<'_>, config: &DecoderConfig) -> Result<DecodedQr> {
    image.check_size()?;
    let gray = to_grayscale(image);
    let (width, height) = (image.width(), image.height());

    let offsets: &[i16] = if config.threshold_offsets.is_empty() {
        &[0]
    } else {
        &config.threshold_offsets
    };

    let mut last_error = DecodeError::PatternNotFound;
    for &offset in offsets {
        let mut bitmap = adaptive_binarize(&gray, width, height, offset);
        match decode_bitmap(&bitmap, config) {
            Ok(qr) => return Ok(qr),
            Err(err) => {
                log::debug!("offset {offset}: {err}");
                last_error = err;
            }
        }

        if config.try_inverted {
            bitmap.negate();
            match decode_bitmap(&bitmap, config) {
                Ok(mut qr) => {
                    qr.inverted = true;
                    return Ok(qr);
                }
                Err(err) => log::debug!("offset {offset} inverted: {err}"),
            }
        }
    }

    Err(last_error)
}

/// Detect and decode one binarized image
pub fn decode_bitmap(bitmap: &Bitmap, config: &DecoderConfig) -> Result<DecodedQr> {
    let symbol = detector::detect(bitmap, config)?;
    let mut qr = QrDecoder::decode_grid(&symbol.grid, &config.eci_table)?;
    qr.position = symbol.corners;
    Ok(qr)
}

/// Decode independent images in parallel; results keep the input order
pub fn decode_batch(images: &[Image<'_>], config: &DecoderConfig) -> Vec<Result<DecodedQr>> {
    images
        .par_iter()
        .map(|image| decode_with_config(image, config))
        .collect()
}

/// Decoder holding a configuration for repeated use
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a decoder with the given settings
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Create a decoder configured from `QR_*` environment variables
    pub fn from_env() -> Self {
        Self::new(DecoderConfig::from_env())
    }

    /// Settings in use
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one image
    pub fn decode(&self, image: &Image<'_>) -> Result<DecodedQr> {
        decode_with_config(image, &self.config)
    }

    /// Decode many images in parallel
    pub fn decode_batch(&self, images: &[Image<'_>]) -> Vec<Result<DecodedQr>> {
        decode_batch(images, &self.config)
    }
}
