//! Constants used throughout the QDCT implementation

/// Side length of a transform block in pixels
pub const BLOCK_SIZE: usize = 8;

/// Number of coefficients in one block
pub const BLOCK_AREA: usize = BLOCK_SIZE * BLOCK_SIZE;

/// Upper bound of any quantization matrix cell
pub const MAX_QUANT_VALUE: u16 = 255;

/// Number of progressive increments in one full round over the matrix
pub const LEVELS_PER_ROUND: u32 = BLOCK_AREA as u32;

/// Highest level reachable through the 0.0..=1.0 quality knob
pub const MAX_QUALITY_LEVEL: u32 = 63;

/// Offset subtracted from every colour channel before the forward DCT
pub const CHANNEL_CENTER: f32 = 128.0;

/// Largest pixel count an image buffer may be allocated for (2^28)
pub const MAX_IMAGE_PIXELS: usize = 268_435_456;

/// Bytes per pixel in the interleaved RGBA buffers
pub const RGBA_CHANNELS: usize = 4;

/// Default number of device slots kept by the recompression cache
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

/// NSL magic number (`'N' 'S' 'L' 0x00`)
pub const NSL_MAGIC: u32 = 0x4E53_4C00;

/// NSL format version understood by this implementation
pub const NSL_VERSION: u32 = 1;

/// Length of the fixed NSL header (eight big-endian u32 fields)
pub const NSL_HEADER_LEN: usize = 32;

/// Longest device identifier, in UTF-8 bytes, an NSL file may carry
pub const NSL_MAX_DEVICE_ID_LEN: usize = 100;
