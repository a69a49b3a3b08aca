//! Performance benchmarks for PDF Ops Server
//!
//! Run with: `cargo bench`

#[path = "../tests/common/mod.rs"]
mod common;

use common::SamplePdf;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pdf_ops_server::pdf::PdfOperations;

/// Benchmark splitting documents of increasing length
fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");

    for pages in [1, 10, 50] {
        let data = SamplePdf::new(pages).build();
        group.throughput(Throughput::Elements(pages as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pages), &data, |b, data| {
            b.iter(|| {
                let artifact = PdfOperations::split(black_box(data), "bench").unwrap();
                let _ = artifact.finish().unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark merging N small documents
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for count in [2, 10, 40] {
        let pdfs: Vec<Vec<u8>> = (0..count).map(|_| SamplePdf::new(3).build()).collect();
        let inputs: Vec<&[u8]> = pdfs.iter().map(|p| p.as_slice()).collect();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("files", count), &inputs, |b, inputs| {
            b.iter(|| {
                let _ = PdfOperations::merge(black_box(inputs)).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark recompression of a document with an embedded image
fn bench_compress(c: &mut Criterion) {
    let data = SamplePdf::new(20).with_raw_rgb(64, 64).build();

    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("20pages", |b| {
        b.iter(|| {
            let _ = PdfOperations::compress(black_box(&data), "bench").unwrap();
        });
    });
    group.finish();
}

/// Benchmark rotation, which copies and rewrites every page
fn bench_rotate(c: &mut Criterion) {
    let data = SamplePdf::new(20).build();

    c.bench_function("rotate_20pages", |b| {
        b.iter(|| {
            let _ = PdfOperations::rotate(black_box(&data), "bench", 90).unwrap();
        });
    });
}

/// Benchmark image extraction with PNG encoding
fn bench_image_extraction(c: &mut Criterion) {
    let data = SamplePdf::new(1)
        .with_jpeg()
        .with_raw_rgb(256, 256)
        .build();

    c.bench_function("image_extraction", |b| {
        b.iter(|| {
            let artifact = PdfOperations::extract_images(black_box(&data), "bench").unwrap();
            let _ = artifact.finish().unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_split,
    bench_merge,
    bench_compress,
    bench_rotate,
    bench_image_extraction,
);

criterion_main!(benches);
