//! Dense in-memory representation of a compressed image
//!
//! Coefficients are kept as full 64-entry arrays in zigzag order. Sparsity is
//! only exploited at serialization time by the NSL format.

use crate::consts::BLOCK_AREA;
use crate::{BlockPosition, Channel, Dimensions};

/// Quantized coefficients of one channel of one block, in zigzag order
pub type Coefficients = [i16; BLOCK_AREA];

/// One 8x8 block of quantized YCbCr coefficients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBlock {
    pub position: BlockPosition,
    /// Y, Cb and Cr coefficients, indexed by [`Channel::index`]
    pub channels: [Coefficients; 3],
}

impl CompressedBlock {
    pub fn new(position: BlockPosition) -> Self {
        Self {
            position,
            channels: [[0; BLOCK_AREA]; 3],
        }
    }

    pub fn channel(&self, channel: Channel) -> &Coefficients {
        &self.channels[channel.index()]
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut Coefficients {
        &mut self.channels[channel.index()]
    }

    /// Number of non-zero coefficients in `channel`
    pub fn non_zero_count(&self, channel: Channel) -> usize {
        self.channel(channel).iter().filter(|&&c| c != 0).count()
    }
}

/// One device's compressed rendition of an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub device_id: String,
    pub dimensions: Dimensions,
    pub compression_level: u32,
    /// One block per grid cell, row-major
    pub blocks: Vec<CompressedBlock>,
}

impl CompressedImage {
    pub fn new(device_id: impl Into<String>, dimensions: Dimensions, compression_level: u32) -> Self {
        Self {
            device_id: device_id.into(),
            dimensions,
            compression_level,
            blocks: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Total number of non-zero coefficients across all blocks and channels
    pub fn non_zero_coefficients(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| {
                Channel::ALL
                    .iter()
                    .map(|&channel| block.non_zero_count(channel))
                    .sum::<usize>()
            })
            .sum()
    }
}
