//! Color space transformations for QDCT
//!
//! This crate implements the full-range BT.601 conversion between 8-bit RGB
//! and YCbCr used by the block pipeline, together with the channel centering
//! applied around the DCT.

pub mod ycbcr;

pub use ycbcr::*;
