//! Codec capability interface and registry

use qdct_core::consts::MAX_QUALITY_LEVEL;
use qdct_core::{CompressedImage, Image, QdctError, QdctResult};
use qdct_encoder::{CompressionEngine, CompressionResult, EngineOptions};
use qdct_strategy::DeviceStrategy;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Map a quality in `[0, 1]` to a compression level in `[0, 63]`
///
/// Quality 1.0 is level 0 (no extra quantization); quality 0.0 is level 63.
pub fn quality_to_level(quality: f32) -> u32 {
    let quality = if quality.is_nan() { 1.0 } else { quality.clamp(0.0, 1.0) };
    ((1.0 - quality) * MAX_QUALITY_LEVEL as f32).round() as u32
}

/// Per-call codec options
#[derive(Debug, Clone, PartialEq)]
pub struct CodecOptions {
    /// 0.0 (smallest) to 1.0 (best)
    pub quality: f32,
    pub device_id: String,
}

impl CodecOptions {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            quality: 1.0,
            device_id: device_id.into(),
        }
    }

    pub fn quality(mut self, quality: f32) -> Self {
        self.quality = quality.clamp(0.0, 1.0);
        self
    }

    pub fn level(&self) -> u32 {
        quality_to_level(self.quality)
    }
}

/// A distributed image codec
pub trait Codec: Send + Sync {
    fn name(&self) -> &str;

    fn compress(&self, image: &Image, options: &CodecOptions) -> QdctResult<CompressionResult>;

    fn decompress(&self, compressed: &CompressedImage) -> QdctResult<Image>;

    /// Combine several devices' versions into one image
    fn reconstruct(&self, versions: &[CompressedImage]) -> QdctResult<Image>;

    fn psnr(&self, original: &Image, decoded: &Image) -> QdctResult<f64> {
        qdct_core::psnr(original, decoded)
    }

    /// Device strategy, for codecs that have one
    fn strategy_for(&self, _device_id: &str) -> Option<DeviceStrategy> {
        None
    }
}

/// The QDCT codec
///
/// Compression goes through the engine's device cache: asking for a higher
/// level than the device's cached version tightens that version instead of
/// compressing the supplied pixels.
pub struct QdctCodec {
    engine: CompressionEngine,
}

impl QdctCodec {
    pub const NAME: &'static str = "qdct";

    pub fn new(options: EngineOptions) -> Self {
        Self {
            engine: CompressionEngine::new(options),
        }
    }

    pub fn engine(&self) -> &CompressionEngine {
        &self.engine
    }

    pub fn compression_level(&self, device_id: &str) -> Option<u32> {
        self.engine.compression_level(device_id)
    }

    /// Forget one device's cached version, or every device's with `None`
    pub fn clear_cache(&self, device_id: Option<&str>) {
        match device_id {
            Some(id) => {
                self.engine.cache().evict(id);
            }
            None => self.engine.clear_cache(),
        }
    }

    pub fn quantization_matrix(&self, device_id: &str, level: u32) -> [[u16; 8]; 8] {
        let flat = self.engine.quantization_matrix(device_id, level);
        core::array::from_fn(|row| core::array::from_fn(|col| flat[row * 8 + col]))
    }
}

impl Default for QdctCodec {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Codec for QdctCodec {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compress(&self, image: &Image, options: &CodecOptions) -> QdctResult<CompressionResult> {
        let level = options.level();
        log::debug!(
            "qdct: quality {} -> level {} for {}",
            options.quality,
            level,
            options.device_id
        );
        self.engine.compress_cached(image, &options.device_id, level)
    }

    fn decompress(&self, compressed: &CompressedImage) -> QdctResult<Image> {
        self.engine.decompress(compressed)
    }

    fn reconstruct(&self, versions: &[CompressedImage]) -> QdctResult<Image> {
        self.engine.reconstruct(versions)
    }

    fn strategy_for(&self, device_id: &str) -> Option<DeviceStrategy> {
        Some(self.engine.strategy_for(device_id))
    }
}

/// Named collection of codecs
#[derive(Default)]
pub struct CodecRegistry {
    codecs: BTreeMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the QDCT codec with default engine options
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(QdctCodec::default()));
        registry
    }

    /// Add `codec`, replacing any codec registered under the same name
    pub fn register(&mut self, codec: Arc<dyn Codec>) -> Option<Arc<dyn Codec>> {
        self.codecs.insert(codec.name().to_string(), codec)
    }

    pub fn get(&self, name: &str) -> QdctResult<Arc<dyn Codec>> {
        self.codecs
            .get(name)
            .cloned()
            .ok_or_else(|| QdctError::UnknownCodec {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.codecs.keys().cloned().collect()
    }
}
