//! Benchmark rendering and storing a full derivative set.

use std::io::Cursor;

use catalog_core::config::DEFAULT_WIDTHS;
use catalog_core::resize::ImageFormat;
use catalog_core::ImageResizer;
use catalog_images::{DerivativeStore, LanczosResizer};
use criterion::{criterion_group, criterion_main, Criterion};
use image::imageops::FilterType;

fn source_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("encode");
    buf.into_inner()
}

fn bench_render(c: &mut Criterion) {
    let data = source_png(800, 600);
    let mut group = c.benchmark_group("render");
    group.sample_size(10);

    group.bench_function("lanczos3_png", |b| {
        let resizer = LanczosResizer::new();
        b.iter(|| resizer.render(&data, ImageFormat::Png, &DEFAULT_WIDTHS).unwrap());
    });

    group.bench_function("triangle_jpeg", |b| {
        let resizer = LanczosResizer::new().with_filter(FilterType::Triangle);
        b.iter(|| resizer.render(&data, ImageFormat::Jpeg, &DEFAULT_WIDTHS).unwrap());
    });

    group.finish();
}

fn bench_store_and_remove(c: &mut Criterion) {
    let data = source_png(640, 480);
    let dir = tempfile::tempdir().expect("tempdir");
    let store = DerivativeStore::new(dir.path(), DEFAULT_WIDTHS.to_vec());
    let resizer = LanczosResizer::new().with_filter(FilterType::Triangle);

    let mut group = c.benchmark_group("store");
    group.sample_size(10);
    group.bench_function("store_then_remove", |b| {
        b.iter(|| {
            let base = store.store(&resizer, &data, Some("bench.jpg")).unwrap();
            store.remove(&base)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_render, bench_store_and_remove);
criterion_main!(benches);
