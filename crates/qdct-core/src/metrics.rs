//! Fidelity metrics

use crate::{Image, QdctError, QdctResult};

/// Peak signal-to-noise ratio between two RGBA images, in dB
///
/// The mean squared error covers the R, G and B samples of every pixel; alpha
/// is ignored. Identical images yield `f64::INFINITY`.
pub fn psnr(a: &Image, b: &Image) -> QdctResult<f64> {
    if a.dimensions != b.dimensions {
        return Err(QdctError::DimensionMismatch {
            expected: a.dimensions,
            actual: b.dimensions,
        });
    }

    let mut sum = 0.0f64;
    for (pa, pb) in a.buffer.chunks_exact(4).zip(b.buffer.chunks_exact(4)) {
        for c in 0..3 {
            let diff = pa[c] as f64 - pb[c] as f64;
            sum += diff * diff;
        }
    }

    let mse = sum / (a.pixel_count() * 3) as f64;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }

    Ok(10.0 * (255.0 * 255.0 / mse).log10())
}
