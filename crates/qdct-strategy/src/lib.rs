//! Per-device quantization strategies
//!
//! Every device derives a private permutation of the 64 coefficient slots
//! from its identifier. The scheduler walks that permutation to grow a
//! quantization matrix one cell at a time as the compression level rises, so
//! different devices lose different frequencies first.

pub mod generator;
pub mod schedule;

pub use generator::{generate_strategy, DeviceStrategy, Lcg};
pub use schedule::{
    device_matrix, progressive_matrix, BASE_QUANT_MATRIX, INCREMENT_MATRIX,
};
