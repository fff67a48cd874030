//! Optimized DCT implementation using separable 1D transforms
//!
//! The 2D DCT is computed as a 1D DCT over rows followed by a 1D DCT over
//! columns, with the cosine basis precomputed once. Each 1D pass carries a
//! factor of 1/2 so the product matches the 2/N scaling of the direct form.

use std::f32::consts::PI;

lazy_static::lazy_static! {
    static ref COS_TABLE: [[f32; 8]; 8] = {
        let mut table = [[0.0f32; 8]; 8];
        for (u, row) in table.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = (((2 * x + 1) * u) as f32 * PI / 16.0).cos();
            }
        }
        table
    };

    static ref SCALE_FACTORS: [f32; 8] = {
        let mut factors = [1.0f32; 8];
        factors[0] = std::f32::consts::FRAC_1_SQRT_2;
        factors
    };
}

#[inline]
fn dct_1d_forward(input: &[f32; 8], output: &mut [f32; 8]) {
    for (u, out) in output.iter_mut().enumerate() {
        let sum: f32 = input
            .iter()
            .zip(COS_TABLE[u].iter())
            .map(|(sample, basis)| sample * basis)
            .sum();
        *out = sum * SCALE_FACTORS[u] * 0.5;
    }
}

#[inline]
fn dct_1d_inverse(input: &[f32; 8], output: &mut [f32; 8]) {
    for (x, out) in output.iter_mut().enumerate() {
        let mut sum = 0.0;
        for u in 0..8 {
            sum += input[u] * SCALE_FACTORS[u] * COS_TABLE[u][x];
        }
        *out = sum * 0.5;
    }
}

fn separable(input: &[f32; 64], output: &mut [f32; 64], pass: fn(&[f32; 8], &mut [f32; 8])) {
    let mut temp = [0.0f32; 64];
    let mut line = [0.0f32; 8];
    let mut transformed = [0.0f32; 8];

    for y in 0..8 {
        line.copy_from_slice(&input[y * 8..y * 8 + 8]);
        pass(&line, &mut transformed);
        temp[y * 8..y * 8 + 8].copy_from_slice(&transformed);
    }

    for x in 0..8 {
        for y in 0..8 {
            line[y] = temp[y * 8 + x];
        }
        pass(&line, &mut transformed);
        for y in 0..8 {
            output[y * 8 + x] = transformed[y];
        }
    }
}

/// Separable 8x8 DCT-II (forward transform)
pub fn dct8x8_forward_optimized(input: &[f32; 64], output: &mut [f32; 64]) {
    separable(input, output, dct_1d_forward);
}

/// Separable 8x8 DCT-III (inverse transform)
pub fn dct8x8_inverse_optimized(input: &[f32; 64], output: &mut [f32; 64]) {
    separable(input, output, dct_1d_inverse);
}
