//! # QDCT - distributed quantized-DCT compression
//!
//! Several devices compress the same image, each with a quantization schedule
//! derived from its own identifier. Any single version may be coarse, but
//! merging versions coefficient by coefficient recovers an image of higher
//! quality than any one of them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use qdct::{CompressionEngine, Dimensions, Image};
//!
//! let image = Image::filled(Dimensions::new(64, 64), [200, 120, 40, 255]).unwrap();
//! let engine = CompressionEngine::default();
//!
//! let versions: Vec<_> = ["DEVICE-001", "DEVICE-002", "DEVICE-003"]
//!     .iter()
//!     .map(|id| engine.compress(&image, id, 100).unwrap().compressed)
//!     .collect();
//!
//! let merged = engine.reconstruct(&versions).unwrap();
//! println!("PSNR {:.2} dB", qdct::psnr(&image, &merged).unwrap());
//! ```
//!
//! ### NSL files
//!
//! ```no_run
//! use qdct::{read_nsl_file, write_nsl_file, QdctDecoder};
//! # let compressed: qdct::CompressedImage = unimplemented!();
//!
//! write_nsl_file("DEVICE-001_L100.nsl", &compressed).unwrap();
//! let image = QdctDecoder::new().decode_file("DEVICE-001_L100.nsl").unwrap();
//! ```

pub mod codec;

pub use codec::{quality_to_level, Codec, CodecOptions, CodecRegistry, QdctCodec};

// Re-export core types
pub use qdct_core::{
    consts, psnr, BlockPosition, Channel, Coefficients, CompressedBlock, CompressedImage,
    Dimensions, Image, QdctError, QdctResult, TruncationSite,
};

// Re-export strategy and transform seams
pub use qdct_strategy::{device_matrix, generate_strategy, progressive_matrix, DeviceStrategy};
pub use qdct_transform::{
    BackendStatus, ComputeBackend, CpuBackend, FallbackBackend, InverseJob, QuantMatrix,
    SampleBlock,
};

// Re-export NSL format
pub use qdct_format::{
    decode, decode_with_header, encode, encode_with_timestamp, encoded_len, nsl_filename,
    read_nsl, read_nsl_file, write_nsl, write_nsl_file, NslHeader,
};

// Re-export decoder and encoder
pub use qdct_decoder::{QdctDecoder, ReconstructionEngine};
pub use qdct_encoder::{CompressionEngine, CompressionResult, DeviceCache, EngineOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load an image file as RGBA
#[cfg(feature = "image")]
pub fn load_image<P: AsRef<std::path::Path>>(path: P) -> QdctResult<Image> {
    let decoded = ::image::open(path.as_ref()).map_err(std::io::Error::other)?;
    Image::try_from(decoded.to_rgba8())
}

/// Save an image as PNG (or whatever format the extension names)
#[cfg(feature = "image")]
pub fn save_image<P: AsRef<std::path::Path>>(image: &Image, path: P) -> QdctResult<()> {
    let rgba = ::image::RgbaImage::try_from(image.clone())?;
    rgba.save(path.as_ref()).map_err(std::io::Error::other)?;
    Ok(())
}
