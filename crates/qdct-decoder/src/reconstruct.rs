//! Multi-device reconstruction
//!
//! Each device quantizes a different subset of frequencies harder. For every
//! coefficient slot of every block, the reconstruction keeps the value from
//! the device whose divisor at that slot is smallest, then runs one inverse
//! transform per channel over the merged coefficients.

use crate::write_blocks;
use qdct_core::consts::BLOCK_SIZE;
use qdct_core::*;
use qdct_strategy::device_matrix;
use qdct_transform::{ComputeBackend, CpuBackend, InverseJob, QuantMatrix, INV_ZIGZAG_8X8};
use rayon::prelude::*;
use std::sync::Arc;

/// Index of the winning version for every row-major coefficient slot
type Winners = [usize; 64];

/// Pick, per slot, the contributor with the smallest divisor
///
/// `contributors` lists version indices in input order; ties keep the earliest.
fn select_winners(contributors: &[usize], matrices: &[QuantMatrix]) -> Winners {
    let mut winners = [contributors[0]; 64];
    for (slot, winner) in winners.iter_mut().enumerate() {
        for &candidate in &contributors[1..] {
            if matrices[candidate][slot] < matrices[*winner][slot] {
                *winner = candidate;
            }
        }
    }
    winners
}

/// Build the three inverse jobs for one grid cell
fn merge_block(
    blocks: &[Option<&CompressedBlock>],
    contributors: &[usize],
    matrices: &[QuantMatrix],
) -> [InverseJob; 3] {
    let winners = select_winners(contributors, matrices);
    let divisors: QuantMatrix = core::array::from_fn(|slot| matrices[winners[slot]][slot]);

    Channel::ALL.map(|channel| {
        let mut coefficients = [0i16; 64];
        for (slot, &winner) in winners.iter().enumerate() {
            let zz = INV_ZIGZAG_8X8[slot];
            if let Some(block) = blocks[winner] {
                coefficients[zz] = block.channel(channel)[zz];
            }
        }
        InverseJob {
            coefficients,
            divisors,
        }
    })
}

/// Index each version's blocks by grid cell
///
/// Blocks off the 8-pixel grid or outside it are not matched. If a version
/// lists the same cell twice the first occurrence is used.
fn grid_index(version: &CompressedImage, dims: Dimensions) -> Vec<Option<&CompressedBlock>> {
    let blocks_x = dims.blocks_x();
    let blocks_y = dims.blocks_y();
    let mut grid = vec![None; dims.block_count()];

    for block in &version.blocks {
        let position = block.position;
        if !position.is_aligned() {
            continue;
        }
        let col = position.x as usize / BLOCK_SIZE;
        let row = position.y as usize / BLOCK_SIZE;
        if col < blocks_x && row < blocks_y {
            grid[row * blocks_x + col].get_or_insert(block);
        }
    }
    grid
}

/// Combines several devices' compressions of the same image
pub struct ReconstructionEngine {
    backend: Arc<dyn ComputeBackend>,
    parallel: bool,
}

impl ReconstructionEngine {
    pub fn new(backend: Arc<dyn ComputeBackend>) -> Self {
        Self {
            backend,
            parallel: true,
        }
    }

    /// Toggle rayon across grid cells during winner selection
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Merge `versions` into one image
    ///
    /// All versions must share the same dimensions. Every version's matrix is
    /// derived from its own device id and compression level, so versions at
    /// different levels combine correctly.
    pub fn reconstruct(&self, versions: &[CompressedImage]) -> QdctResult<Image> {
        let first = versions.first().ok_or(QdctError::EmptyInput)?;
        let dims = first.dimensions;
        if let Some(other) = versions.iter().find(|v| v.dimensions != dims) {
            return Err(QdctError::DimensionMismatch {
                expected: dims,
                actual: other.dimensions,
            });
        }
        dims.validate()?;

        let matrices: Vec<QuantMatrix> = versions
            .iter()
            .map(|v| device_matrix(&v.device_id, v.compression_level))
            .collect();
        let grids: Vec<_> = versions.iter().map(|v| grid_index(v, dims)).collect();

        let cell = |index: usize| -> Option<(BlockPosition, [InverseJob; 3])> {
            let blocks: Vec<Option<&CompressedBlock>> = grids.iter().map(|g| g[index]).collect();
            let contributors: Vec<usize> = blocks
                .iter()
                .enumerate()
                .filter_map(|(v, b)| b.map(|_| v))
                .collect();
            if contributors.is_empty() {
                return None;
            }
            let position = BlockPosition::from_grid(index % dims.blocks_x(), index / dims.blocks_x());
            Some((position, merge_block(&blocks, &contributors, &matrices)))
        };

        let merged: Vec<(BlockPosition, [InverseJob; 3])> = if self.parallel {
            (0..dims.block_count()).into_par_iter().filter_map(cell).collect()
        } else {
            (0..dims.block_count()).filter_map(cell).collect()
        };

        let jobs: Vec<InverseJob> = merged.iter().flat_map(|(_, jobs)| jobs.iter().copied()).collect();
        let samples = self.backend.inverse(&jobs)?;

        let mut image = Image::new(dims)?;
        write_blocks(&mut image, merged.iter().map(|(p, _)| p), &samples);

        log::debug!(
            "reconstructed {} from {} versions ({} of {} cells covered) on {}",
            dims,
            versions.len(),
            merged.len(),
            dims.block_count(),
            self.backend.name()
        );
        Ok(image)
    }
}

impl Default for ReconstructionEngine {
    fn default() -> Self {
        Self::new(Arc::new(CpuBackend::default()))
    }
}
