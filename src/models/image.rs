use crate::error::{DecodeError, Result};

/// Smallest image side that can hold a version 1 symbol
pub const MIN_IMAGE_SIDE: usize = 21;

/// Pixel layout of an [`Image`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit luminance
    Gray,
    /// 8-bit R, G, B
    Rgb,
    /// 8-bit R, G, B, A (alpha ignored)
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Borrowed, immutable pixel buffer
#[derive(Debug, Clone, Copy)]
pub struct Image<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl<'a> Image<'a> {
    /// Wrap a raw buffer, checking its length against the geometry
    pub fn new(data: &'a [u8], width: usize, height: usize, format: PixelFormat) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or_else(|| DecodeError::InvalidInput(format!("{width}x{height} overflows")))?;
        if data.len() != expected {
            return Err(DecodeError::InvalidInput(format!(
                "expected {expected} bytes for {width}x{height} {format:?}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// 8-bit grayscale buffer
    pub fn gray(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, PixelFormat::Gray)
    }

    /// Packed RGB buffer
    pub fn rgb(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, PixelFormat::Rgb)
    }

    /// Packed RGBA buffer
    pub fn rgba(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, PixelFormat::Rgba)
    }

    /// Raw pixel bytes
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// `ImageTooSmall` unless both sides reach [`MIN_IMAGE_SIDE`]
    pub(crate) fn check_size(&self) -> Result<()> {
        if self.width < MIN_IMAGE_SIDE || self.height < MIN_IMAGE_SIDE {
            return Err(DecodeError::ImageTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

// The `image` buffers are always length-consistent, so these borrow directly.
impl<'a> From<&'a ::image::GrayImage> for Image<'a> {
    fn from(img: &'a ::image::GrayImage) -> Self {
        Self {
            data: img.as_raw(),
            width: img.width() as usize,
            height: img.height() as usize,
            format: PixelFormat::Gray,
        }
    }
}

impl<'a> From<&'a ::image::RgbImage> for Image<'a> {
    fn from(img: &'a ::image::RgbImage) -> Self {
        Self {
            data: img.as_raw(),
            width: img.width() as usize,
            height: img.height() as usize,
            format: PixelFormat::Rgb,
        }
    }
}

impl<'a> From<&'a ::image::RgbaImage> for Image<'a> {
    fn from(img: &'a ::image::RgbaImage) -> Self {
        Self {
            data: img.as_raw(),
            width: img.width() as usize,
            height: img.height() as usize,
            format: PixelFormat::Rgba,
        }
    }
}
