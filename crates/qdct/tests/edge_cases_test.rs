//! Edge cases: odd sizes, extreme levels, degenerate inputs

use qdct::*;
use std::sync::Arc;

fn create_test_image(width: u32, height: u32) -> Image {
    let mut image = Image::new(Dimensions::new(width, height)).unwrap();
    for y in 0..height {
        for x in 0..width {
            image.set_pixel(
                x,
                y,
                [
                    ((x * 255) / width.max(1)) as u8,
                    ((y * 255) / height.max(1)) as u8,
                    (((x + y) * 255) / (width + height).max(1)) as u8,
                    255,
                ],
            );
        }
    }
    image
}

fn engine() -> CompressionEngine {
    CompressionEngine::new(EngineOptions::new().parallel(false))
}

#[test]
fn test_single_pixel() {
    let image = Image::filled(Dimensions::new(1, 1), [255, 255, 255, 255]).unwrap();
    let result = engine().compress(&image, "DEVICE-001", 0).unwrap();

    assert_eq!(result.compressed.blocks.len(), 1);
    assert_eq!(result.preview.dimensions, Dimensions::new(1, 1));
    assert_eq!(result.preview.pixel(0, 0).unwrap()[3], 255);
}

#[test]
fn test_non_aligned_sizes() {
    let engine = engine();
    for (w, h) in [(7, 7), (9, 9), (15, 1), (1, 15), (17, 31), (33, 8)] {
        let image = create_test_image(w, h);
        let result = engine.compress(&image, "DEVICE-002", 0).unwrap();
        let expected_blocks = w.div_ceil(8) * h.div_ceil(8);
        assert_eq!(result.compressed.blocks.len() as u32, expected_blocks, "{}x{}", w, h);
        assert_eq!(result.preview.dimensions, image.dimensions);

        let quality = psnr(&image, &result.preview).unwrap();
        assert!(quality > 30.0, "{}x{}: {:.2} dB", w, h, quality);
    }
}

#[test]
fn test_extreme_levels() {
    let image = create_test_image(16, 16);
    let engine = engine();
    for level in [u32::MAX, u32::MAX - 1, 64 * 4096] {
        let result = engine.compress(&image, "DEVICE-003", level).unwrap();
        assert_eq!(result.compressed.compression_level, level);
        assert!(engine.quantization_matrix("DEVICE-003", level).iter().all(|&q| q == 255));
        let bytes = encode(&result.compressed).unwrap();
        assert_eq!(decode(&bytes).unwrap().compression_level, level);
    }
}

#[test]
fn test_solid_black_and_white() {
    let engine = engine();
    for value in [0u8, 255] {
        let image = Image::filled(Dimensions::new(24, 16), [value, value, value, 255]).unwrap();
        let result = engine.compress(&image, "DEVICE-004", 0).unwrap();
        for pixel in result.preview.buffer.chunks_exact(4) {
            for &c in &pixel[..3] {
                assert!((c as i16 - value as i16).abs() <= 2, "{} vs {}", c, value);
            }
        }
    }
}

#[test]
fn test_empty_device_id_compresses_but_cannot_be_stored() {
    let image = create_test_image(8, 8);
    let result = engine().compress(&image, "", 4).unwrap();
    assert_eq!(result.compressed.device_id, "");
    assert!(matches!(
        encode(&result.compressed),
        Err(QdctError::InvalidDeviceIdLength { length: 0 })
    ));
}

#[test]
fn test_psnr_edge_cases() {
    let a = create_test_image(8, 8);
    assert_eq!(psnr(&a, &a).unwrap(), f64::INFINITY);
    assert!(matches!(
        psnr(&a, &create_test_image(8, 9)),
        Err(QdctError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_zero_sized_image_rejected() {
    assert!(matches!(
        Image::new(Dimensions::new(0, 0)),
        Err(QdctError::InvalidDimensions { .. })
    ));
}

struct FailingBackend;

impl ComputeBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing-accelerator"
    }

    fn forward(&self, _: &[SampleBlock], _: &QuantMatrix) -> QdctResult<Vec<Coefficients>> {
        Err(QdctError::Backend {
            backend: "failing-accelerator".to_string(),
            message: "adapter unavailable".to_string(),
        })
    }

    fn inverse(&self, _: &[InverseJob]) -> QdctResult<Vec<SampleBlock>> {
        Err(QdctError::Backend {
            backend: "failing-accelerator".to_string(),
            message: "adapter unavailable".to_string(),
        })
    }
}

#[test]
fn test_accelerator_failure_falls_back_observably() {
    let image = create_test_image(24, 24);
    let accelerated = CompressionEngine::new(
        EngineOptions::new()
            .parallel(false)
            .accelerator(Arc::new(FailingBackend)),
    );
    assert!(!accelerated.backend_status().fell_back);

    let result = accelerated.compress(&image, "DEVICE-005", 50).unwrap();
    let status = accelerated.backend_status();
    assert!(status.fell_back);
    assert_eq!(status.active, "cpu");

    let reference = engine().compress(&image, "DEVICE-005", 50).unwrap();
    assert_eq!(result.compressed, reference.compressed);
    assert_eq!(result.preview, reference.preview);
}
