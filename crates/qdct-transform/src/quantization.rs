//! Quantization for lossy compression

/// Quantization matrix for 8x8 blocks, row-major
pub type QuantMatrix = [u16; 64];

/// Quantize DCT coefficients: `round(coeff / q)` per cell
pub fn quantize(coeffs: &[f32; 64], matrix: &QuantMatrix, output: &mut [i16; 64]) {
    for i in 0..64 {
        let q = matrix[i] as f32;
        output[i] = (coeffs[i] / q).round() as i16;
    }
}

/// Dequantize DCT coefficients: `value * q` per cell
pub fn dequantize(coeffs: &[i16; 64], matrix: &QuantMatrix, output: &mut [f32; 64]) {
    for i in 0..64 {
        let q = matrix[i] as f32;
        output[i] = coeffs[i] as f32 * q;
    }
}
