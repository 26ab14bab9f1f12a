//! Cover-crop tests.
//!
//! The crop must keep the target ratio, stay inside the source, be centered,
//! and resize only for fixed-size targets.

use covershot::{
    CropRect, ImageFormat, ThumbnailError, ThumbnailSpec, cover_crop_rect, cover_crop_resize,
    encode_image,
};
use image::{Rgb, RgbImage};

fn gradient_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * 7 + y * 3) % 256) as u8])
    })
}

#[test]
fn full_hd_to_default_thumbnail_crops_rows() {
    let rect = cover_crop_rect(1920, 1080, 300.0 / 140.0);
    assert_eq!(
        rect,
        CropRect {
            left: 0,
            top: 92,
            width: 1920,
            height: 896,
        }
    );
    assert_eq!(rect.bottom(), 988);
}

#[test]
fn size_and_ratio_specs_against_four_by_three() {
    let frame = gradient_frame(800, 600);

    let small = cover_crop_resize(&frame, &ThumbnailSpec::size(300, 140)).unwrap();
    assert_eq!(small.dimensions(), (300, 140));

    let wide = cover_crop_resize(&frame, &ThumbnailSpec::ratio(2, 1)).unwrap();
    assert_eq!(wide.dimensions(), (800, 400));
    assert_eq!(cover_crop_rect(800, 600, 2.0).top, 100);
}

#[test]
fn ratio_crop_is_not_resized() {
    let frame = gradient_frame(800, 600);
    let wide = cover_crop_resize(&frame, &ThumbnailSpec::ratio(2, 1)).unwrap();
    // Row 0 of the crop is row 100 of the source.
    assert_eq!(wide.get_pixel(0, 0), frame.get_pixel(0, 100));
    assert_eq!(wide.get_pixel(799, 399), frame.get_pixel(799, 499));
}

#[test]
fn wider_source_keeps_full_height() {
    let rect = cover_crop_rect(1000, 100, 1.0);
    assert_eq!(
        rect,
        CropRect {
            left: 450,
            top: 0,
            width: 100,
            height: 100,
        }
    );
}

#[test]
fn taller_source_keeps_full_width() {
    let rect = cover_crop_rect(600, 800, 2.0);
    assert_eq!(
        rect,
        CropRect {
            left: 0,
            top: 250,
            width: 600,
            height: 300,
        }
    );
}

#[test]
fn crop_takes_the_center() {
    let frame = RgbImage::from_fn(400, 100, |x, _| match x {
        0..150 => Rgb([255, 0, 0]),
        150..250 => Rgb([0, 255, 0]),
        _ => Rgb([0, 0, 255]),
    });
    let square = cover_crop_resize(&frame, &ThumbnailSpec::ratio(1, 1)).unwrap();
    assert_eq!(square.dimensions(), (100, 100));
    assert!(square.pixels().all(|pixel| *pixel == Rgb([0, 255, 0])));
}

#[test]
fn odd_leftover_goes_to_the_far_margin() {
    let rect = cover_crop_rect(101, 50, 2.0);
    assert_eq!(rect.width, 100);
    assert_eq!(rect.left, 0);
    assert_eq!(101 - rect.right(), 1);
}

#[test]
fn crop_never_leaves_the_source() {
    let dimensions = [1, 2, 3, 7, 64, 333, 1080, 1920, 4096];
    let ratios = [0.1, 0.5, 1.0, 300.0 / 140.0, 16.0 / 9.0, 10.0];

    for width in dimensions {
        for height in dimensions {
            for ratio in ratios {
                let rect = cover_crop_rect(width, height, ratio);
                assert!(
                    rect.fits_within(width, height),
                    "{rect:?} escapes {width}x{height} for ratio {ratio}",
                );
                assert!(rect.width >= 1 && rect.height >= 1);
                assert!(rect.width == width || rect.height == height);
                assert_eq!(rect.left, (width - rect.width) / 2);
                assert_eq!(rect.top, (height - rect.height) / 2);
            }
        }
    }
}

#[test]
fn crop_matches_target_ratio_within_a_pixel() {
    let dimensions = [100, 240, 480, 720, 1080, 1920];
    let ratios = [0.5, 1.0, 4.0 / 3.0, 300.0 / 140.0, 16.0 / 9.0, 3.0];

    for width in dimensions {
        for height in dimensions {
            for ratio in ratios {
                let rect = cover_crop_rect(width, height, ratio);
                let error = (rect.width as f64 - rect.height as f64 * ratio).abs();
                assert!(
                    error <= ratio.max(1.0),
                    "{rect:?} from {width}x{height} misses ratio {ratio} by {error}",
                );
            }
        }
    }
}

#[test]
fn small_source_is_upscaled_to_fixed_size() {
    let frame = gradient_frame(100, 50);
    let thumbnail = cover_crop_resize(&frame, &ThumbnailSpec::size(300, 140)).unwrap();
    assert_eq!(thumbnail.dimensions(), (300, 140));
}

#[test]
fn resizing_is_deterministic() {
    let frame = gradient_frame(1280, 720);
    let spec = ThumbnailSpec::size(300, 140);

    let first = cover_crop_resize(&frame, &spec).unwrap();
    let second = cover_crop_resize(&frame, &spec).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        encode_image(&first, ImageFormat::Png).unwrap(),
        encode_image(&second, ImageFormat::Png).unwrap(),
    );
}

#[test]
fn zero_sized_spec_is_rejected() {
    let frame = gradient_frame(64, 64);
    for spec in [
        ThumbnailSpec::size(0, 140),
        ThumbnailSpec::size(300, 0),
        ThumbnailSpec::ratio(0, 1),
    ] {
        let result = cover_crop_resize(&frame, &spec);
        assert!(matches!(result, Err(ThumbnailError::InvalidSpec(_))), "{spec:?}");
    }
}

#[test]
fn empty_frame_is_rejected() {
    let result = cover_crop_resize(&RgbImage::new(0, 0), &ThumbnailSpec::size(300, 140));
    assert!(matches!(result, Err(ThumbnailError::EmptyFrame { .. })));
    assert_eq!(
        cover_crop_rect(0, 10, 2.0),
        CropRect {
            left: 0,
            top: 0,
            width: 0,
            height: 0,
        }
    );
}
