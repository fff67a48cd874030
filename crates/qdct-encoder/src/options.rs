//! Compression engine configuration

use qdct_core::consts;
use qdct_transform::{ComputeBackend, CpuBackend, FallbackBackend};
use std::fmt;
use std::sync::Arc;

/// Engine options
#[derive(Clone)]
pub struct EngineOptions {
    /// Spread per-block work across the rayon pool
    pub parallel: bool,
    /// Maximum number of device slots kept in the recompression cache
    pub cache_capacity: usize,
    /// Alternate backend for the transform stage, wrapped in a CPU fallback
    pub accelerator: Option<Arc<dyn ComputeBackend>>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            cache_capacity: consts::DEFAULT_CACHE_CAPACITY,
            accelerator: None,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self
    }

    pub fn accelerator(mut self, backend: Arc<dyn ComputeBackend>) -> Self {
        self.accelerator = Some(backend);
        self
    }

    /// Backend the engine should run on
    pub fn build_backend(&self) -> Arc<dyn ComputeBackend> {
        match &self.accelerator {
            Some(accelerator) => Arc::new(FallbackBackend::new(accelerator.clone(), self.parallel)),
            None => Arc::new(CpuBackend::new(self.parallel)),
        }
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("parallel", &self.parallel)
            .field("cache_capacity", &self.cache_capacity)
            .field("accelerator", &self.accelerator.as_ref().map(|b| b.name().to_string()))
            .finish()
    }
}
