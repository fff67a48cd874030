//! Multi-device reconstruction benchmarks
//!
//! Run with: cargo bench --bench reconstruction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qdct::{CompressedImage, CompressionEngine, Dimensions, Image};

fn versions(count: usize, size: u32) -> Vec<CompressedImage> {
    let image = Image::filled(Dimensions::new(size, size), [90, 160, 220, 255]).unwrap();
    let engine = CompressionEngine::default();
    (0..count)
        .map(|i| {
            engine
                .compress(&image, &format!("DEVICE-{:03}", i + 1), 100)
                .unwrap()
                .compressed
        })
        .collect()
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reconstruct 256x256");
    let engine = CompressionEngine::default();

    for &count in &[1usize, 3, 8] {
        let versions = versions(count, 256);
        group.bench_with_input(BenchmarkId::from_parameter(count), &versions, |b, versions| {
            b.iter(|| engine.reconstruct(black_box(versions)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconstruct);
criterion_main!(benches);
