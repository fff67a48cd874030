//! Benchmarks for the per-block numeric stages
//!
//! Run with: cargo bench --bench transforms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qdct_strategy::{device_matrix, generate_strategy, progressive_matrix, BASE_QUANT_MATRIX};
use qdct_transform::{
    dct8x8_forward, dct8x8_forward_optimized, dct8x8_inverse_optimized, dequantize, quantize,
    unzigzag, zigzag, ComputeBackend, CpuBackend, SampleBlock,
};

fn test_block() -> [f32; 64] {
    core::array::from_fn(|i| ((i * 37) % 255) as f32 - 128.0)
}

fn bench_dct(c: &mut Criterion) {
    let mut group = c.benchmark_group("DCT Transform");
    let input = test_block();

    group.bench_function("dct8x8_forward_reference", |b| {
        let mut output = [0.0f32; 64];
        b.iter(|| dct8x8_forward(black_box(&input), &mut output));
    });

    group.bench_function("dct8x8_forward_separable", |b| {
        let mut output = [0.0f32; 64];
        b.iter(|| dct8x8_forward_optimized(black_box(&input), &mut output));
    });

    group.bench_function("dct8x8_roundtrip", |b| {
        let mut coeffs = [0.0f32; 64];
        let mut output = [0.0f32; 64];
        b.iter(|| {
            dct8x8_forward_optimized(black_box(&input), &mut coeffs);
            dct8x8_inverse_optimized(&coeffs, black_box(&mut output));
        });
    });

    group.finish();
}

fn bench_quantization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quantization");
    let mut coeffs = [0.0f32; 64];
    dct8x8_forward_optimized(&test_block(), &mut coeffs);
    let matrix = device_matrix("DEVICE-001", 150);

    group.bench_function("quantize_zigzag", |b| {
        let mut quantized = [0i16; 64];
        b.iter(|| {
            quantize(black_box(&coeffs), &matrix, &mut quantized);
            black_box(zigzag(&quantized))
        });
    });

    group.bench_function("unzigzag_dequantize", |b| {
        let mut quantized = [0i16; 64];
        quantize(&coeffs, &matrix, &mut quantized);
        let scanned = zigzag(&quantized);
        let mut output = [0.0f32; 64];
        b.iter(|| dequantize(&unzigzag(black_box(&scanned)), &matrix, &mut output));
    });

    group.finish();
}

fn bench_strategy(c: &mut Criterion) {
    let mut group = c.benchmark_group("Device Strategy");

    group.bench_function("generate_strategy", |b| {
        b.iter(|| generate_strategy(black_box("AA:BB:CC:DD:EE:FF")))
    });

    let strategy = generate_strategy("DEVICE-001");
    for level in [0u32, 63, 640, 1_000_000] {
        group.bench_with_input(BenchmarkId::new("progressive_matrix", level), &level, |b, &level| {
            b.iter(|| progressive_matrix(&BASE_QUANT_MATRIX, &strategy, black_box(level)))
        });
    }

    group.finish();
}

fn bench_backend(c: &mut Criterion) {
    let mut group = c.benchmark_group("CPU Backend");
    let blocks: Vec<SampleBlock> = (0..3 * 32 * 32).map(|_| test_block()).collect();
    let matrix = device_matrix("DEVICE-001", 100);

    for parallel in [false, true] {
        let backend = CpuBackend::new(parallel);
        let label = if parallel { "parallel" } else { "serial" };
        group.bench_function(BenchmarkId::new("forward_3072_blocks", label), |b| {
            b.iter(|| backend.forward(black_box(&blocks), &matrix))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_dct,
    bench_quantization,
    bench_strategy,
    bench_backend
);
criterion_main!(benches);
