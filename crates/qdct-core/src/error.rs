//! Error types for QDCT operations

use crate::{Channel, Dimensions};
use std::fmt;
use thiserror::Error;

/// Result type for QDCT operations
pub type QdctResult<T> = Result<T, QdctError>;

/// Where in an NSL buffer a read ran past the end of the data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationSite {
    /// The device identifier bytes following the fixed header
    DeviceId,
    /// The u32 block count opening the body
    BlockCount,
    /// The x/y position of a block
    Position { block: usize },
    /// The coefficient count of one channel of a block
    Count { block: usize, channel: Channel },
    /// The sparse coefficient triples of one channel of a block
    Coefficients { block: usize, channel: Channel },
}

impl fmt::Display for TruncationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TruncationSite::DeviceId => f.write_str("cannot read device ID"),
            TruncationSite::BlockCount => f.write_str("cannot read block count"),
            TruncationSite::Position { block } => {
                write!(f, "block {}: cannot read position", block)
            }
            TruncationSite::Count { block, channel } => {
                write!(f, "block {}: cannot read {} count", block, channel)
            }
            TruncationSite::Coefficients { block, channel } => {
                write!(f, "block {}: cannot read {} data", block, channel)
            }
        }
    }
}

/// Errors that can occur during QDCT compression, reconstruction and NSL I/O
#[derive(Error, Debug)]
pub enum QdctError {
    #[error("Invalid compression level: new level {requested} must be higher than current level {current}")]
    InvalidLevel { current: u32, requested: u32 },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: Dimensions,
        actual: Dimensions,
    },

    #[error("No compressed versions provided")]
    EmptyInput,

    #[error("File too small to be a valid NSL file: {len} bytes (minimum {min})")]
    TooSmall { len: usize, min: usize },

    #[error("Invalid NSL file: wrong magic number. Got 0x{found:08x}, expected 0x{expected:08x}")]
    InvalidMagic { found: u32, expected: u32 },

    #[error("Unsupported NSL version: {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid device ID length: {length}")]
    InvalidDeviceIdLength { length: usize },

    #[error("Device ID at offset {offset} is not valid UTF-8")]
    InvalidDeviceId { offset: usize },

    #[error("File truncated: {site} (offset {offset}, need {needed} bytes, {remaining} remaining)")]
    TruncatedFile {
        site: TruncationSite,
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid zigzag index {index} in block {block} {channel} data at offset {offset}")]
    InvalidCoefficientIndex {
        block: usize,
        channel: Channel,
        index: u8,
        offset: usize,
    },

    #[error("Value out of range for {field}: {value} (maximum {max})")]
    ValueOutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("No cached compression for device {device_id}")]
    CacheMiss { device_id: String },

    #[error("Compute backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },

    #[error("Codec '{name}' not found. Available: {available}")]
    UnknownCodec { name: String, available: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
