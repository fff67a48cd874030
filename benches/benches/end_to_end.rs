//! End-to-end compression benchmarks
//!
//! Run with: cargo bench --bench end_to_end

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qdct::{decode, encode, CompressionEngine, Dimensions, EngineOptions, Image};

fn create_test_image(width: u32, height: u32) -> Image {
    let mut image = Image::new(Dimensions::new(width, height)).unwrap();
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            image.set_pixel(x, y, [r, g, 128, 255]);
        }
    }
    image
}

fn bench_compress_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compress by Image Size");
    let engine = CompressionEngine::default();

    for &size in &[64u32, 128, 256, 512] {
        let image = create_test_image(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &image, |b, image| {
            b.iter(|| engine.compress(black_box(image), "DEVICE-001", 100).unwrap())
        });
    }

    group.finish();
}

fn bench_compress_by_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compress by Level");
    let engine = CompressionEngine::new(EngineOptions::new().parallel(false));
    let image = create_test_image(128, 128);

    for &level in &[0u32, 63, 256, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            b.iter(|| engine.compress(black_box(&image), "DEVICE-001", level).unwrap())
        });
    }

    group.finish();
}

fn bench_nsl(c: &mut Criterion) {
    let mut group = c.benchmark_group("NSL");
    let engine = CompressionEngine::default();
    let compressed = engine
        .compress(&create_test_image(256, 256), "DEVICE-001", 64)
        .unwrap()
        .compressed;
    let bytes = encode(&compressed).unwrap();

    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("encode", |b| b.iter(|| encode(black_box(&compressed)).unwrap()));
    group.bench_function("decode", |b| b.iter(|| decode(black_box(&bytes)).unwrap()));

    group.finish();
}

criterion_group!(
    benches,
    bench_compress_by_size,
    bench_compress_by_level,
    bench_nsl
);
criterion_main!(benches);
