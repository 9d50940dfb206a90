//! Utility functions for image processing
//!
//! Helpers shared by the detection stages:
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Binarization (adaptive mean, Otsu and fixed threshold)
//! - Geometry (perspective transforms, angles)

/// Local-mean, Otsu and fixed-threshold binarization
pub mod binarization;
/// Homography solving and angle helpers
pub mod geometry;
/// Luminance conversion
pub mod grayscale;
