//! Core types for QDCT

use crate::consts::{BLOCK_SIZE, MAX_IMAGE_PIXELS};
use crate::{QdctError, QdctResult};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Reject empty images and images too large to allocate a pixel buffer for
    ///
    /// Every pixel and block count is small enough to multiply without
    /// overflow once this succeeds.
    pub fn validate(&self) -> QdctResult<()> {
        let pixels = (self.width as usize).checked_mul(self.height as usize);
        match pixels {
            Some(count) if count > 0 && count <= MAX_IMAGE_PIXELS => Ok(()),
            _ => Err(QdctError::InvalidDimensions {
                width: self.width,
                height: self.height,
            }),
        }
    }

    /// Number of block columns, counting a partial block at the right edge
    pub fn blocks_x(&self) -> usize {
        (self.width as usize).div_ceil(BLOCK_SIZE)
    }

    /// Number of block rows, counting a partial block at the bottom edge
    pub fn blocks_y(&self) -> usize {
        (self.height as usize).div_ceil(BLOCK_SIZE)
    }

    pub fn block_count(&self) -> usize {
        self.blocks_x() * self.blocks_y()
    }

    /// Block-aligned positions of the grid in row-major order
    pub fn block_positions(&self) -> impl Iterator<Item = BlockPosition> {
        let blocks_x = self.blocks_x();
        let blocks_y = self.blocks_y();
        (0..blocks_y).flat_map(move |row| {
            (0..blocks_x).map(move |col| BlockPosition::from_grid(col, row))
        })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Top-left pixel coordinate of an 8x8 block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockPosition {
    pub x: u32,
    pub y: u32,
}

impl BlockPosition {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Position of the block at grid column `col`, grid row `row`
    pub fn from_grid(col: usize, row: usize) -> Self {
        Self {
            x: (col * BLOCK_SIZE) as u32,
            y: (row * BLOCK_SIZE) as u32,
        }
    }

    pub fn is_aligned(&self) -> bool {
        self.x as usize % BLOCK_SIZE == 0 && self.y as usize % BLOCK_SIZE == 0
    }
}

/// Colour channel of a YCbCr block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    /// Luma
    Y = 0,
    /// Blue-difference chroma
    Cb = 1,
    /// Red-difference chroma
    Cr = 2,
}

impl Channel {
    /// Channels in storage and wire order
    pub const ALL: [Channel; 3] = [Channel::Y, Channel::Cb, Channel::Cr];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Y => "Y",
            Channel::Cb => "Cb",
            Channel::Cr => "Cr",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
