//! Transform operations for QDCT
//!
//! This crate implements the 8x8 DCT (direct reference and separable forms),
//! zigzag scanning, quantization, and the compute backends that run the
//! transform stage over batches of blocks.

pub mod backend;
pub mod dct;
pub mod dct_optimized;
pub mod quantization;
pub mod zigzag;

pub use backend::*;
pub use dct::*;
pub use dct_optimized::*;
pub use quantization::*;
pub use zigzag::*;
