//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

use std::path::Path;

use covershot::{
    SourceError, ThumbnailError, ThumbnailOptions, Thumbnailer, VideoHandle,
};

#[test]
fn open_nonexistent_file() {
    let result = VideoHandle::open("this_file_does_not_exist.mp4");
    let error = result.expect_err("opening a missing file should fail");

    let error_message = error.to_string();
    assert!(
        error_message.contains("Failed to open video"),
        "Error message should mention the open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a video file")
        .expect("Failed to write invalid file");

    let result = VideoHandle::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid video file");
}

#[test]
fn empty_buffer_is_rejected() {
    let result = VideoHandle::from_bytes(&[]);
    assert!(matches!(result, Err(ThumbnailError::FileOpen { .. })));
}

#[test]
fn garbage_buffer_fails_to_extract() {
    let result = Thumbnailer::extract(b"definitely not an mp4", &ThumbnailOptions::new());
    assert!(result.is_err());
}

#[test]
fn configuration_errors_win_over_bad_input() {
    let options = ThumbnailOptions::size(300, 140).with_format(covershot::ImageFormat::Jpeg {
        quality: 0,
    });
    let result = Thumbnailer::extract(b"definitely not an mp4", &options);
    assert!(matches!(result, Err(ThumbnailError::InvalidConfiguration(_))));
}

#[test]
fn error_messages_are_descriptive() {
    assert!(
        ThumbnailError::InvalidDuration(0.0)
            .to_string()
            .contains("Invalid video duration")
    );
    assert_eq!(
        ThumbnailError::from(SourceError::NotFound("clip.mp4".to_string())).to_string(),
        "Video source unavailable: not found: clip.mp4"
    );
    assert_eq!(
        ThumbnailError::DecodeFailure {
            at: 5.0,
            reason: "corrupt packet".to_string(),
        }
        .to_string(),
        "Failed to decode frame at 5.00s: corrupt packet"
    );
}

#[test]
fn timestamp_beyond_end_is_not_an_error() {
    let path = "tests/fixtures/sample_video.mp4";
    if !Path::new(path).exists() {
        return;
    }

    // 1 hour is way beyond a 5-second video.
    let options = ThumbnailOptions::size(64, 36).with_timestamp(3600.0);
    let extraction = Thumbnailer::extract_file(path, &options).expect("extraction should succeed");
    assert!(extraction.chosen_time < extraction.duration);
}
