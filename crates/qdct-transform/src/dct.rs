//! Direct 8x8 DCT (reference implementation)
//!
//! Straight evaluation of the orthonormal 2D DCT-II / DCT-III sums. Used as
//! the numerical reference that the separable transform is checked against.

use std::f32::consts::PI;

const N: usize = 8;

#[inline]
fn scale(k: usize) -> f32 {
    if k == 0 {
        std::f32::consts::FRAC_1_SQRT_2
    } else {
        1.0
    }
}

#[inline]
fn basis(sample: usize, freq: usize) -> f32 {
    (((2 * sample + 1) * freq) as f32 * PI / (2 * N) as f32).cos()
}

/// 8x8 DCT-II (forward transform), row-major in and out
pub fn dct8x8_forward(input: &[f32; 64], output: &mut [f32; 64]) {
    for v in 0..N {
        for u in 0..N {
            let mut sum = 0.0;
            for y in 0..N {
                for x in 0..N {
                    sum += input[y * N + x] * basis(x, u) * basis(y, v);
                }
            }
            output[v * N + u] = sum * scale(u) * scale(v) * 2.0 / N as f32;
        }
    }
}

/// 8x8 DCT-III (inverse transform), row-major in and out
pub fn dct8x8_inverse(input: &[f32; 64], output: &mut [f32; 64]) {
    for y in 0..N {
        for x in 0..N {
            let mut sum = 0.0;
            for v in 0..N {
                for u in 0..N {
                    sum += input[v * N + u] * scale(u) * scale(v) * basis(x, u) * basis(y, v);
                }
            }
            output[y * N + x] = sum * 2.0 / N as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_block_has_only_dc() {
        let input = [10.0f32; 64];
        let mut output = [0.0f32; 64];
        dct8x8_forward(&input, &mut output);

        // DC = 2/N * 1/2 * 64 * 10 = 80
        assert!((output[0] - 80.0).abs() < 1e-3, "dc = {}", output[0]);
        for &ac in &output[1..] {
            assert!(ac.abs() < 1e-3);
        }
    }

    #[test]
    fn test_roundtrip() {
        let input: [f32; 64] = core::array::from_fn(|i| ((i * 37) % 256) as f32 - 128.0);
        let mut coeffs = [0.0f32; 64];
        let mut output = [0.0f32; 64];

        dct8x8_forward(&input, &mut coeffs);
        dct8x8_inverse(&coeffs, &mut output);

        for (a, b) in input.iter().zip(output.iter()) {
            assert!((a - b).abs() < 1e-2, "{} vs {}", a, b);
        }
    }
}
