//! Core types and utilities for the QDCT distributed codec
//!
//! This crate provides the fundamental data structures shared by every other
//! crate in the workspace: pixel images, the dense in-memory representation of
//! a compressed image, the error taxonomy and the PSNR fidelity metric.

pub mod compressed;
pub mod consts;
pub mod error;
pub mod image;
pub mod metrics;
pub mod types;

pub use compressed::*;
pub use error::{QdctError, QdctResult, TruncationSite};
pub use crate::image::*;
pub use metrics::psnr;
pub use types::*;
