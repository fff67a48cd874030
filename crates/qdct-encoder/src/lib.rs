//! QDCT encoder
//!
//! Block-wise compression with per-device quantization, plus the engine that
//! keeps a recompression cache keyed by device.

pub mod cache;
pub mod options;

pub use cache::DeviceCache;
pub use options::EngineOptions;

use cache::lock_slot;
use qdct_color::extract_ycbcr_block;
use qdct_core::*;
use qdct_decoder::{decompress_with, ReconstructionEngine};
use qdct_strategy::{device_matrix, generate_strategy, DeviceStrategy};
use qdct_transform::{BackendStatus, ComputeBackend, QuantMatrix, SampleBlock};
use rayon::prelude::*;
use std::sync::Arc;

/// Output of one compression
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub compressed: CompressedImage,
    /// Exact length of the NSL encoding of `compressed`
    ///
    /// Computed without encoding. Device ids that are empty or longer than
    /// `NSL_MAX_DEVICE_ID_LEN` bytes still get a length, but `encode` rejects
    /// them, so no such file can be written.
    pub size_bytes: usize,
    /// `compressed` decoded back to pixels
    pub preview: Image,
}

/// Compress `image` for `device_id` at `level` on `backend`
pub fn compress_with(
    backend: &dyn ComputeBackend,
    image: &Image,
    device_id: &str,
    level: u32,
    parallel: bool,
) -> QdctResult<CompressionResult> {
    let matrix = device_matrix(device_id, level);
    let positions: Vec<BlockPosition> = image.dimensions.block_positions().collect();
    log::trace!(
        "compressing {} for {} at level {}: {} blocks",
        image.dimensions,
        device_id,
        level,
        positions.len()
    );

    let samples: Vec<SampleBlock> = if parallel {
        positions
            .par_iter()
            .flat_map_iter(|&p| extract_ycbcr_block(image, p))
            .collect()
    } else {
        positions
            .iter()
            .flat_map(|&p| extract_ycbcr_block(image, p))
            .collect()
    };
    let coefficients = backend.forward(&samples, &matrix)?;

    let mut compressed = CompressedImage::new(device_id, image.dimensions, level);
    compressed.blocks = positions
        .iter()
        .zip(coefficients.chunks_exact(3))
        .map(|(&position, channels)| CompressedBlock {
            position,
            channels: [channels[0], channels[1], channels[2]],
        })
        .collect();

    let size_bytes = qdct_format::encoded_len(&compressed);
    let preview = decompress_with(backend, &compressed)?;

    log::debug!(
        "compressed {} for {} at level {} into {} bytes ({} non-zero coefficients) on {}",
        image.dimensions,
        device_id,
        level,
        size_bytes,
        compressed.non_zero_coefficients(),
        backend.name()
    );
    Ok(CompressionResult {
        compressed,
        size_bytes,
        preview,
    })
}

fn check_level_increase(cached: &CompressedImage, new_level: u32) -> QdctResult<()> {
    if new_level <= cached.compression_level {
        return Err(QdctError::InvalidLevel {
            current: cached.compression_level,
            requested: new_level,
        });
    }
    Ok(())
}

/// Compression engine with a per-device recompression cache
pub struct CompressionEngine {
    options: EngineOptions,
    backend: Arc<dyn ComputeBackend>,
    cache: DeviceCache,
}

impl CompressionEngine {
    pub fn new(options: EngineOptions) -> Self {
        let backend = options.build_backend();
        let cache = DeviceCache::new(options.cache_capacity);
        Self {
            options,
            backend,
            cache,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn backend(&self) -> Arc<dyn ComputeBackend> {
        self.backend.clone()
    }

    /// Active backend and whether an accelerator failure forced the CPU path
    pub fn backend_status(&self) -> BackendStatus {
        self.backend.status()
    }

    pub fn cache(&self) -> &DeviceCache {
        &self.cache
    }

    fn compress_uncached(&self, image: &Image, device_id: &str, level: u32) -> QdctResult<CompressionResult> {
        compress_with(self.backend.as_ref(), image, device_id, level, self.options.parallel)
    }

    fn recompress_uncached(&self, cached: &CompressedImage, new_level: u32) -> QdctResult<CompressionResult> {
        check_level_increase(cached, new_level)?;
        log::debug!(
            "recompressing {} from level {} to {}",
            cached.device_id,
            cached.compression_level,
            new_level
        );
        let pixels = self.decompress(cached)?;
        self.compress_uncached(&pixels, &cached.device_id, new_level)
    }

    /// Compress `image` and remember the result as the device's latest version
    pub fn compress(&self, image: &Image, device_id: &str, level: u32) -> QdctResult<CompressionResult> {
        let result = self.compress_uncached(image, device_id, level)?;
        let slot = self.cache.slot(device_id);
        *lock_slot(&slot) = Some(Arc::new(result.compressed.clone()));
        Ok(result)
    }

    pub fn decompress(&self, compressed: &CompressedImage) -> QdctResult<Image> {
        decompress_with(self.backend.as_ref(), compressed)
    }

    /// Recompress an existing version at a strictly higher level
    ///
    /// Works from the decoded pixels of `cached`, so quality loss compounds.
    /// The result becomes the device's cached version. Fails with
    /// `InvalidLevel` when `new_level` does not exceed the level of `cached`
    /// or of the version already cached for the device.
    pub fn recompress_to_level(&self, cached: &CompressedImage, new_level: u32) -> QdctResult<CompressionResult> {
        let slot = self.cache.slot(&cached.device_id);
        let mut entry = lock_slot(&slot);
        if let Some(current) = entry.as_deref() {
            check_level_increase(current, new_level)?;
        }
        let result = self.recompress_uncached(cached, new_level)?;
        *entry = Some(Arc::new(result.compressed.clone()));
        Ok(result)
    }

    /// Tighten the device's cached version to `new_level`
    pub fn recompress_device(&self, device_id: &str, new_level: u32) -> QdctResult<CompressionResult> {
        let miss = || QdctError::CacheMiss {
            device_id: device_id.to_string(),
        };
        let slot = self.cache.existing_slot(device_id).ok_or_else(miss)?;
        let mut entry = lock_slot(&slot);
        let cached = entry.clone().ok_or_else(miss)?;

        let result = self.recompress_uncached(&cached, new_level)?;
        *entry = Some(Arc::new(result.compressed.clone()));
        Ok(result)
    }

    /// Compress through the cache
    ///
    /// If the device already has a version at a lower level it is recompressed
    /// from the cache; otherwise `image` is compressed directly.
    pub fn compress_cached(&self, image: &Image, device_id: &str, level: u32) -> QdctResult<CompressionResult> {
        let slot = self.cache.slot(device_id);
        let mut entry = lock_slot(&slot);

        let result = match entry.as_ref() {
            Some(cached) if cached.compression_level < level && cached.dimensions == image.dimensions => {
                self.recompress_uncached(cached, level)?
            }
            _ => self.compress_uncached(image, device_id, level)?,
        };
        *entry = Some(Arc::new(result.compressed.clone()));
        Ok(result)
    }

    /// Level of the device's cached version
    pub fn compression_level(&self, device_id: &str) -> Option<u32> {
        self.cache.get(device_id).map(|c| c.compression_level)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn quantization_matrix(&self, device_id: &str, level: u32) -> QuantMatrix {
        device_matrix(device_id, level)
    }

    pub fn strategy_for(&self, device_id: &str) -> DeviceStrategy {
        generate_strategy(device_id)
    }

    /// Merge several devices' versions on this engine's backend
    pub fn reconstruct(&self, versions: &[CompressedImage]) -> QdctResult<Image> {
        ReconstructionEngine::new(self.backend.clone())
            .with_parallel(self.options.parallel)
            .reconstruct(versions)
    }
}

impl Default for CompressionEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn white(width: u32, height: u32) -> Image {
        Image::filled(Dimensions::new(width, height), [255, 255, 255, 255]).unwrap()
    }

    fn pattern(width: u32, height: u32) -> Image {
        let mut image = Image::new(Dimensions::new(width, height)).unwrap();
        for y in 0..height {
            for x in 0..width {
                let v = ((x ^ y) * 9 % 256) as u8;
                image.set_pixel(x, y, [v, 255 - v, (x * 4 % 256) as u8, 255]);
            }
        }
        image
    }

    fn engine() -> CompressionEngine {
        CompressionEngine::new(EngineOptions::new().parallel(false))
    }

    #[test]
    fn test_white_image_level_zero() {
        let result = engine().compress(&white(64, 64), "DEVICE-001", 0).unwrap();
        let center = result.preview.pixel(32, 32).unwrap();
        assert!(center[..3].iter().all(|&c| c >= 250), "{:?}", center);
        assert_eq!(center[3], 255);
    }

    #[test]
    fn test_preview_matches_decompress() {
        let engine = engine();
        let result = engine.compress(&pattern(20, 12), "DEVICE-002", 30).unwrap();
        assert_eq!(result.preview, engine.decompress(&result.compressed).unwrap());
        assert_eq!(result.preview.dimensions, Dimensions::new(20, 12));
        assert_eq!(result.compressed.blocks.len(), 3 * 2);
    }

    #[test]
    fn test_size_is_exact_encoding_length() {
        let engine = engine();
        for level in [0, 10, 64, 300] {
            let result = engine.compress(&pattern(24, 24), "DEVICE-003", level).unwrap();
            let encoded = qdct_format::encode(&result.compressed).unwrap();
            assert_eq!(result.size_bytes, encoded.len(), "level {}", level);
        }
    }

    #[test]
    fn test_size_of_unencodable_device_id() {
        let engine = engine();
        let long_id = "D".repeat(qdct_core::consts::NSL_MAX_DEVICE_ID_LEN + 1);
        for id in ["", long_id.as_str()] {
            let result = engine.compress(&pattern(8, 8), id, 0).unwrap();
            assert_eq!(result.size_bytes, qdct_format::encoded_len(&result.compressed));
            assert!(matches!(
                qdct_format::encode(&result.compressed),
                Err(QdctError::InvalidDeviceIdLength { .. })
            ));
        }
    }

    #[test]
    fn test_higher_level_is_smaller() {
        let engine = engine();
        let fine = engine.compress(&pattern(64, 64), "DEVICE-001", 0).unwrap();
        let coarse = engine.compress(&pattern(64, 64), "DEVICE-001", 320).unwrap();
        assert!(coarse.size_bytes < fine.size_bytes);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let image = pattern(40, 33);
        let serial = engine().compress(&image, "DEVICE-001", 50).unwrap();
        let parallel = CompressionEngine::default()
            .compress(&image, "DEVICE-001", 50)
            .unwrap();
        assert_eq!(serial.compressed, parallel.compressed);
    }

    #[test]
    fn test_recompress_requires_higher_level() {
        let engine = engine();
        let result = engine.compress(&pattern(16, 16), "DEVICE-001", 20).unwrap();

        for level in [0, 20] {
            let err = engine.recompress_to_level(&result.compressed, level).unwrap_err();
            assert!(matches!(
                err,
                QdctError::InvalidLevel { current: 20, requested } if requested == level
            ));
        }

        let tighter = engine.recompress_to_level(&result.compressed, 40).unwrap();
        assert_eq!(tighter.compressed.compression_level, 40);
        assert_eq!(engine.compression_level("DEVICE-001"), Some(40));
    }

    #[test]
    fn test_stale_version_cannot_lower_cached_level() {
        let engine = engine();
        let original = engine.compress(&pattern(16, 16), "DEVICE-001", 5).unwrap().compressed;
        engine.recompress_to_level(&original, 20).unwrap();

        let err = engine.recompress_to_level(&original, 10).unwrap_err();
        assert!(matches!(err, QdctError::InvalidLevel { current: 20, requested: 10 }));
        assert_eq!(engine.compression_level("DEVICE-001"), Some(20));

        let tighter = engine.recompress_to_level(&original, 30).unwrap();
        assert_eq!(tighter.compressed.compression_level, 30);
        assert_eq!(engine.compression_level("DEVICE-001"), Some(30));
    }

    #[test]
    fn test_recompress_device() {
        let engine = engine();
        assert!(matches!(
            engine.recompress_device("DEVICE-009", 5),
            Err(QdctError::CacheMiss { .. })
        ));

        engine.compress(&pattern(16, 16), "DEVICE-009", 5).unwrap();
        let result = engine.recompress_device("DEVICE-009", 70).unwrap();
        assert_eq!(result.compressed.device_id, "DEVICE-009");
        assert_eq!(engine.compression_level("DEVICE-009"), Some(70));
    }

    #[test]
    fn test_compress_cached_uses_cache_when_tightening() {
        let engine = engine();
        let first = engine.compress_cached(&pattern(16, 16), "DEVICE-004", 10).unwrap();

        // Different pixels: the cached version is used because the level rises
        let second = engine.compress_cached(&white(16, 16), "DEVICE-004", 30).unwrap();
        let expected = engine.recompress_uncached(&first.compressed, 30).unwrap();
        assert_eq!(second.compressed, expected.compressed);

        // Same or lower level compresses the supplied pixels
        let third = engine.compress_cached(&white(16, 16), "DEVICE-004", 30).unwrap();
        let fresh = engine.compress_uncached(&white(16, 16), "DEVICE-004", 30).unwrap();
        assert_eq!(third.compressed, fresh.compressed);
    }

    #[test]
    fn test_matrix_and_strategy_inspection() {
        let engine = engine();
        assert_eq!(engine.quantization_matrix("DEVICE-001", 0), [1u16; 64]);
        let strategy = engine.strategy_for("DEVICE-001");
        assert_eq!(strategy, engine.strategy_for("DEVICE-001"));
        engine.clear_cache();
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_concurrent_recompression_of_one_device() {
        let engine = Arc::new(engine());
        engine.compress(&pattern(16, 16), "DEVICE-001", 1).unwrap();

        let handles: Vec<_> = (2..=12)
            .rev()
            .map(|level| {
                let engine = engine.clone();
                thread::spawn(move || engine.recompress_device("DEVICE-001", level))
            })
            .collect();

        for handle in handles {
            match handle.join().unwrap() {
                Ok(result) => assert!(result.compressed.compression_level >= 2),
                Err(QdctError::InvalidLevel { current, requested }) => assert!(requested <= current),
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
        assert_eq!(engine.compression_level("DEVICE-001"), Some(12));
    }

    #[test]
    fn test_distinct_devices_evict_lru() {
        let engine = CompressionEngine::new(EngineOptions::new().parallel(false).cache_capacity(2));
        let image = pattern(8, 8);
        engine.compress(&image, "a", 1).unwrap();
        engine.compress(&image, "b", 1).unwrap();
        engine.compress(&image, "c", 1).unwrap();

        assert_eq!(engine.compression_level("a"), None);
        assert_eq!(engine.compression_level("c"), Some(1));
        assert!(matches!(
            engine.recompress_device("a", 3),
            Err(QdctError::CacheMiss { .. })
        ));
    }
}
