//! Thumbnail file naming tests.

use covershot::{DEFAULT_STEM, ImageFormat, parse_filename_timestamp, thumbnail_filename};

#[test]
fn filename_has_two_decimals() {
    assert_eq!(thumbnail_filename(DEFAULT_STEM, 12.0, ImageFormat::Png), "thumbnail_12.00.png");
    assert_eq!(thumbnail_filename("cover", 0.0, ImageFormat::Png), "cover_0.00.png");
    assert_eq!(thumbnail_filename("cover", 59.5, ImageFormat::jpeg()), "cover_59.50.jpg");
}

#[test]
fn timestamp_is_recovered_from_name() {
    let name = thumbnail_filename(DEFAULT_STEM, 12.0, ImageFormat::Png);
    assert_eq!(parse_filename_timestamp(&name), Some(12.0));
    assert_eq!(parse_filename_timestamp("thumbnail_wide_3.00.png"), Some(3.0));
    assert_eq!(parse_filename_timestamp("out/thumbnail-2_7.00.jpg"), Some(7.0));
}

#[test]
fn unparseable_names_yield_none() {
    assert_eq!(parse_filename_timestamp("cover.png"), None);
    assert_eq!(parse_filename_timestamp("thumbnail_latest.png"), None);
    assert_eq!(parse_filename_timestamp("thumbnail_inf.png"), None);
    assert_eq!(parse_filename_timestamp(""), None);
}
