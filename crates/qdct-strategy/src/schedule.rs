//! Progressive quantization schedule
//!
//! A compression level is split into `level / 64` full rounds, which add the
//! increment to every cell, and `level % 64` extra steps that touch the first
//! cells of the device's visit order. Cells saturate at 255.

use crate::generator::{generate_strategy, DeviceStrategy};
use qdct_core::consts::{LEVELS_PER_ROUND, MAX_QUANT_VALUE};
use qdct_transform::QuantMatrix;

/// Starting divisors: no quantization beyond rounding
pub const BASE_QUANT_MATRIX: QuantMatrix = [1; 64];

/// Per-cell step added each time the schedule visits a cell, row-major
#[rustfmt::skip]
pub const INCREMENT_MATRIX: QuantMatrix = [
     4,  3,  3,  4,  5,  8, 10, 12,
     3,  3,  4,  5,  6, 11, 12, 11,
     4,  4,  5,  6,  8, 11, 14, 11,
     4,  5,  6,  7, 10, 17, 16, 12,
     5,  6,  9, 11, 14, 22, 21, 15,
     6,  9, 11, 13, 16, 21, 23, 18,
    10, 13, 16, 17, 21, 24, 24, 20,
    14, 18, 19, 20, 22, 20, 21, 20,
];

fn step(cell: u16, increment: u16, times: u32) -> u16 {
    let times = u16::try_from(times).unwrap_or(u16::MAX);
    cell.saturating_add(increment.saturating_mul(times))
        .min(MAX_QUANT_VALUE)
}

/// Quantization matrix for `strategy` at `level`, starting from `base`
///
/// Equivalent to applying `level` single-cell increments in visit order,
/// clamping after each, but computed in closed form so arbitrarily large
/// levels cost the same as small ones.
pub fn progressive_matrix(base: &QuantMatrix, strategy: &DeviceStrategy, level: u32) -> QuantMatrix {
    let rounds = level / LEVELS_PER_ROUND;
    let remainder = (level % LEVELS_PER_ROUND) as usize;

    let mut matrix = *base;
    if rounds > 0 {
        for (cell, &inc) in matrix.iter_mut().zip(INCREMENT_MATRIX.iter()) {
            *cell = step(*cell, inc, rounds);
        }
    }
    for &slot in &strategy.quantization_order[..remainder] {
        let slot = slot as usize;
        matrix[slot] = step(matrix[slot], INCREMENT_MATRIX[slot], 1);
    }
    matrix
}

/// Matrix a device with `device_id` uses at `level`
pub fn device_matrix(device_id: &str, level: u32) -> QuantMatrix {
    progressive_matrix(&BASE_QUANT_MATRIX, &generate_strategy(device_id), level)
}
