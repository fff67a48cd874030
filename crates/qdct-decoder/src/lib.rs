//! QDCT decoder
//!
//! Turns one device's [`CompressedImage`] back into pixels, or merges several
//! devices' versions of the same image in the frequency domain.

pub mod reconstruct;

pub use reconstruct::ReconstructionEngine;

use qdct_color::{write_ycbcr_block, YCbCrBlock};
use qdct_core::*;
use qdct_strategy::device_matrix;
use qdct_transform::{ComputeBackend, CpuBackend, InverseJob, SampleBlock};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// Write the three channel outputs of each block into `image`
pub(crate) fn write_blocks<'a, I>(image: &mut Image, positions: I, samples: &[SampleBlock])
where
    I: IntoIterator<Item = &'a BlockPosition>,
{
    for (position, channels) in positions.into_iter().zip(samples.chunks_exact(3)) {
        let block: YCbCrBlock = [channels[0], channels[1], channels[2]];
        write_ycbcr_block(image, *position, &block);
    }
}

/// Reconstruct the pixels of a single compressed image on `backend`
///
/// The quantization matrix is rebuilt from the image's device id and level.
/// Blocks are clipped at the image bounds; grid cells without a block stay
/// opaque black.
pub fn decompress_with(backend: &dyn ComputeBackend, compressed: &CompressedImage) -> QdctResult<Image> {
    let mut image = Image::new(compressed.dimensions)?;
    let divisors = device_matrix(&compressed.device_id, compressed.compression_level);

    let jobs: Vec<InverseJob> = compressed
        .blocks
        .iter()
        .flat_map(|block| {
            block.channels.iter().map(move |&coefficients| InverseJob {
                coefficients,
                divisors,
            })
        })
        .collect();
    let samples = backend.inverse(&jobs)?;

    write_blocks(
        &mut image,
        compressed.blocks.iter().map(|b| &b.position),
        &samples,
    );

    log::debug!(
        "decompressed {} ({}, level {}, {} blocks) on {}",
        compressed.device_id,
        compressed.dimensions,
        compressed.compression_level,
        compressed.blocks.len(),
        backend.name()
    );
    Ok(image)
}

/// QDCT decoder
pub struct QdctDecoder {
    backend: Arc<dyn ComputeBackend>,
}

impl QdctDecoder {
    pub fn new() -> Self {
        Self::with_backend(Arc::new(CpuBackend::default()))
    }

    pub fn with_backend(backend: Arc<dyn ComputeBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn ComputeBackend {
        self.backend.as_ref()
    }

    pub fn decompress(&self, compressed: &CompressedImage) -> QdctResult<Image> {
        decompress_with(self.backend.as_ref(), compressed)
    }

    /// Decode NSL bytes into pixels
    pub fn decode(&self, data: &[u8]) -> QdctResult<Image> {
        self.decompress(&qdct_format::decode(data)?)
    }

    /// Decode an NSL stream into pixels
    pub fn decode_reader<R: Read>(&self, reader: R) -> QdctResult<Image> {
        self.decompress(&qdct_format::read_nsl(reader)?)
    }

    /// Decode an NSL file into pixels
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> QdctResult<Image> {
        let file = File::open(path)?;
        self.decode_reader(BufReader::new(file))
    }

    /// Merge several devices' versions of one image
    pub fn reconstruct(&self, versions: &[CompressedImage]) -> QdctResult<Image> {
        ReconstructionEngine::new(self.backend.clone()).reconstruct(versions)
    }
}

impl Default for QdctDecoder {
    fn default() -> Self {
        Self::new()
    }
}
