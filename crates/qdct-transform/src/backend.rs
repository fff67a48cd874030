//! Compute backends for the block transform stage
//!
//! A backend runs the numeric core of the pipeline on batches of blocks:
//! forward DCT + quantization + zigzag on the way in, and un-zigzag +
//! dequantization + inverse DCT on the way out. Orchestration (block
//! extraction, colour conversion, matrix selection) stays in the encoder and
//! decoder crates and is identical whichever backend executes the math.

use crate::{
    dct8x8_forward_optimized, dct8x8_inverse_optimized, dequantize, quantize, unzigzag, zigzag,
    QuantMatrix,
};
use qdct_core::{Coefficients, QdctError, QdctResult};
use rayon::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Centred spatial samples of one channel of one block, row-major
pub type SampleBlock = [f32; 64];

/// One block to bring back to the spatial domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InverseJob {
    /// Quantized coefficients in zigzag order
    pub coefficients: Coefficients,
    /// Row-major divisor for each coefficient
    pub divisors: QuantMatrix,
}

/// Which backend is executing and whether it had to give up on an accelerator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub active: String,
    pub fell_back: bool,
}

/// Executes the batched transform stage
pub trait ComputeBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Forward DCT, quantize with `matrix`, zigzag; one output per input block
    fn forward(&self, samples: &[SampleBlock], matrix: &QuantMatrix) -> QdctResult<Vec<Coefficients>>;

    /// Un-zigzag, dequantize with each job's divisors, inverse DCT
    fn inverse(&self, jobs: &[InverseJob]) -> QdctResult<Vec<SampleBlock>>;

    fn status(&self) -> BackendStatus {
        BackendStatus {
            active: self.name().to_string(),
            fell_back: false,
        }
    }
}

/// Reference CPU backend using the separable DCT
#[derive(Debug, Clone, Copy)]
pub struct CpuBackend {
    parallel: bool,
}

impl CpuBackend {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    pub fn forward_block(samples: &SampleBlock, matrix: &QuantMatrix) -> Coefficients {
        let mut coeffs = [0.0f32; 64];
        let mut quantized = [0i16; 64];
        dct8x8_forward_optimized(samples, &mut coeffs);
        quantize(&coeffs, matrix, &mut quantized);
        zigzag(&quantized)
    }

    pub fn inverse_block(job: &InverseJob) -> SampleBlock {
        let mut coeffs = [0.0f32; 64];
        let mut samples = [0.0f32; 64];
        dequantize(&unzigzag(&job.coefficients), &job.divisors, &mut coeffs);
        dct8x8_inverse_optimized(&coeffs, &mut samples);
        samples
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn forward(&self, samples: &[SampleBlock], matrix: &QuantMatrix) -> QdctResult<Vec<Coefficients>> {
        let blocks = if self.parallel {
            samples
                .par_iter()
                .map(|block| Self::forward_block(block, matrix))
                .collect()
        } else {
            samples
                .iter()
                .map(|block| Self::forward_block(block, matrix))
                .collect()
        };
        Ok(blocks)
    }

    fn inverse(&self, jobs: &[InverseJob]) -> QdctResult<Vec<SampleBlock>> {
        let blocks = if self.parallel {
            jobs.par_iter().map(Self::inverse_block).collect()
        } else {
            jobs.iter().map(Self::inverse_block).collect()
        };
        Ok(blocks)
    }
}

/// Runs an accelerator backend and degrades to the CPU backend on failure
///
/// The first error (or a result of the wrong shape) is logged, latched, and
/// every call from then on is served by the CPU backend, so a single engine
/// never mixes outputs from both paths after a failure.
pub struct FallbackBackend {
    accelerator: Arc<dyn ComputeBackend>,
    cpu: CpuBackend,
    fell_back: AtomicBool,
}

impl FallbackBackend {
    pub fn new(accelerator: Arc<dyn ComputeBackend>, parallel: bool) -> Self {
        Self {
            accelerator,
            cpu: CpuBackend::new(parallel),
            fell_back: AtomicBool::new(false),
        }
    }

    pub fn has_fallen_back(&self) -> bool {
        self.fell_back.load(Ordering::Acquire)
    }

    fn degrade(&self, error: QdctError) {
        if !self.fell_back.swap(true, Ordering::AcqRel) {
            log::warn!(
                "backend '{}' failed, falling back to CPU: {}",
                self.accelerator.name(),
                error
            );
        }
    }

    fn shape_error(&self, produced: usize, expected: usize) -> QdctError {
        QdctError::Backend {
            backend: self.accelerator.name().to_string(),
            message: format!("returned {} blocks for {} inputs", produced, expected),
        }
    }
}

impl fmt::Debug for FallbackBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackBackend")
            .field("accelerator", &self.accelerator.name())
            .field("fell_back", &self.has_fallen_back())
            .finish()
    }
}

impl ComputeBackend for FallbackBackend {
    fn name(&self) -> &str {
        if self.has_fallen_back() {
            self.cpu.name()
        } else {
            self.accelerator.name()
        }
    }

    fn forward(&self, samples: &[SampleBlock], matrix: &QuantMatrix) -> QdctResult<Vec<Coefficients>> {
        if !self.has_fallen_back() {
            match self.accelerator.forward(samples, matrix) {
                Ok(blocks) if blocks.len() == samples.len() => return Ok(blocks),
                Ok(blocks) => self.degrade(self.shape_error(blocks.len(), samples.len())),
                Err(e) => self.degrade(e),
            }
        }
        self.cpu.forward(samples, matrix)
    }

    fn inverse(&self, jobs: &[InverseJob]) -> QdctResult<Vec<SampleBlock>> {
        if !self.has_fallen_back() {
            match self.accelerator.inverse(jobs) {
                Ok(blocks) if blocks.len() == jobs.len() => return Ok(blocks),
                Ok(blocks) => self.degrade(self.shape_error(blocks.len(), jobs.len())),
                Err(e) => self.degrade(e),
            }
        }
        self.cpu.inverse(jobs)
    }

    fn status(&self) -> BackendStatus {
        BackendStatus {
            active: self.name().to_string(),
            fell_back: self.has_fallen_back(),
        }
    }
}
