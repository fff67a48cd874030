//! Image data structures

use crate::consts::RGBA_CHANNELS;
use crate::{Dimensions, QdctError, QdctResult};

/// An 8-bit RGBA image with row-major interleaved samples
///
/// This is the pixel representation consumed by compression and produced by
/// decompression and reconstruction. Decoded images always carry alpha 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub dimensions: Dimensions,
    pub buffer: Vec<u8>,
}

impl Image {
    /// Create an opaque black image
    pub fn new(dimensions: Dimensions) -> QdctResult<Self> {
        dimensions.validate()?;

        let mut buffer = vec![0u8; dimensions.pixel_count() * RGBA_CHANNELS];
        for pixel in buffer.chunks_exact_mut(RGBA_CHANNELS) {
            pixel[3] = 255;
        }

        Ok(Self { dimensions, buffer })
    }

    /// Wrap an existing RGBA buffer
    pub fn from_rgba(dimensions: Dimensions, buffer: Vec<u8>) -> QdctResult<Self> {
        dimensions.validate()?;

        let expected = dimensions.pixel_count() * RGBA_CHANNELS;
        if buffer.len() != expected {
            return Err(QdctError::BufferSizeMismatch {
                expected,
                actual: buffer.len(),
            });
        }

        Ok(Self { dimensions, buffer })
    }

    /// Create an image filled with one colour
    pub fn filled(dimensions: Dimensions, rgba: [u8; 4]) -> QdctResult<Self> {
        dimensions.validate()?;

        let buffer = rgba
            .iter()
            .copied()
            .cycle()
            .take(dimensions.pixel_count() * RGBA_CHANNELS)
            .collect();

        Ok(Self { dimensions, buffer })
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn pixel_count(&self) -> usize {
        self.dimensions.pixel_count()
    }

    /// RGBA value at `(x, y)`, or `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let idx = self.offset(x, y);
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.buffer[idx..idx + RGBA_CHANNELS]);
        Some(rgba)
    }

    /// Overwrite the pixel at `(x, y)`; coordinates outside the image are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let idx = self.offset(x, y);
        self.buffer[idx..idx + RGBA_CHANNELS].copy_from_slice(&rgba);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width() as usize) + x as usize) * RGBA_CHANNELS
    }
}

#[cfg(feature = "image")]
impl TryFrom<::image::RgbaImage> for Image {
    type Error = QdctError;

    fn try_from(source: ::image::RgbaImage) -> QdctResult<Self> {
        let dimensions = Dimensions::new(source.width(), source.height());
        Image::from_rgba(dimensions, source.into_raw())
    }
}

#[cfg(feature = "image")]
impl TryFrom<Image> for ::image::RgbaImage {
    type Error = QdctError;

    fn try_from(source: Image) -> QdctResult<Self> {
        let expected = source.pixel_count() * RGBA_CHANNELS;
        let actual = source.buffer.len();
        ::image::RgbaImage::from_raw(source.width(), source.height(), source.buffer)
            .ok_or(QdctError::BufferSizeMismatch { expected, actual })
    }
}
