//! NSL file header

use qdct_core::consts::{NSL_HEADER_LEN, NSL_MAGIC, NSL_VERSION};
use qdct_core::{CompressedImage, Dimensions};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Every header field of an NSL file
///
/// `timestamp` and `original_size` are informational and never affect
/// decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NslHeader {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub compression_level: u32,
    /// UNIX seconds at encode time
    pub timestamp: u32,
    /// `width * height * 3`, saturated to `u32::MAX`
    pub original_size: u32,
    pub device_id: String,
}

impl NslHeader {
    pub const MAGIC: u32 = NSL_MAGIC;

    /// Header describing `image`, stamped with `timestamp`
    pub fn for_image(image: &CompressedImage, timestamp: u32) -> Self {
        Self {
            version: NSL_VERSION,
            width: image.width(),
            height: image.height(),
            compression_level: image.compression_level,
            timestamp,
            original_size: original_size(image.dimensions),
            device_id: image.device_id.clone(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Serialized length of the header including the device identifier
    pub fn encoded_len(&self) -> usize {
        NSL_HEADER_LEN + self.device_id.len()
    }
}

/// Size in bytes of the uncompressed RGB image
pub fn original_size(dimensions: Dimensions) -> u32 {
    let bytes = dimensions.pixel_count() as u64 * 3;
    u32::try_from(bytes).unwrap_or(u32::MAX)
}
