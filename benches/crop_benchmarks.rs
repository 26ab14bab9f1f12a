//! Benchmarks for the cover-crop and encode path.
//!
//! Run with: cargo bench
//!
//! Decoding is benchmarked only when `tests/fixtures/sample_video.mp4` exists.

use std::{hint::black_box, path::Path};

use covershot::{
    DecoderLogLevel, FrameDecoder, ImageFormat, ThumbnailOptions, ThumbnailSpec, Thumbnailer,
    VideoHandle, cover_crop_resize, encode_image,
};
use criterion::Criterion;
use image::{Rgb, RgbImage};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn gradient_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn benchmark_cover_crop(criterion: &mut Criterion) {
    let frame = gradient_frame(1920, 1080);
    let small = ThumbnailSpec::size(300, 140);
    let wide = ThumbnailSpec::ratio(2, 1);

    criterion.bench_function("cover crop 1920x1080 -> 300x140", |bencher| {
        bencher.iter(|| cover_crop_resize(black_box(&frame), black_box(&small)).unwrap());
    });

    criterion.bench_function("cover crop 1920x1080 -> 2:1 (no resize)", |bencher| {
        bencher.iter(|| cover_crop_resize(black_box(&frame), black_box(&wide)).unwrap());
    });
}

fn benchmark_encoding(criterion: &mut Criterion) {
    let thumbnail = cover_crop_resize(&gradient_frame(1920, 1080), &ThumbnailSpec::size(300, 140))
        .unwrap();

    let mut group = criterion.benchmark_group("encode 300x140");
    group.bench_function("png", |bencher| {
        bencher.iter(|| encode_image(black_box(&thumbnail), ImageFormat::Png).unwrap());
    });
    group.bench_function("jpeg", |bencher| {
        bencher.iter(|| encode_image(black_box(&thumbnail), ImageFormat::jpeg()).unwrap());
    });
    group.finish();
}

fn benchmark_decoding(criterion: &mut Criterion) {
    covershot::set_decoder_log_level(DecoderLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    criterion.bench_function("decode midpoint frame", |bencher| {
        bencher.iter(|| {
            let mut handle = VideoHandle::open(SAMPLE_VIDEO).unwrap();
            let midpoint = handle.duration() / 2.0;
            handle.frame_at(midpoint).unwrap()
        });
    });

    criterion.bench_function("full extraction (size + ratio)", |bencher| {
        let options = ThumbnailOptions::size(300, 140).with_ratio(2, 1);
        bencher.iter(|| Thumbnailer::extract_file(SAMPLE_VIDEO, &options).unwrap());
    });
}

criterion::criterion_group!(
    benches,
    benchmark_cover_crop,
    benchmark_encoding,
    benchmark_decoding,
);
criterion::criterion_main!(benches);
