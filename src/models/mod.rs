//! Core data structures for QR code decoding

/// Packed dark/light grid
pub mod bitmap;
/// Borrowed input pixel buffers
pub mod image;
/// 2D points in pixel or module space
pub mod point;
/// Version, EC level, mask and decode result types
pub mod qr_code;

pub use self::image::{Image, PixelFormat};
pub use bitmap::Bitmap;
pub use point::Point;
pub use qr_code::{DecodedQr, ECLevel, MaskPattern, StructuredAppend, Version};
