//! Error types for the `covershot` crate.
//!
//! [`ThumbnailError`] is returned by every fallible operation in the crate.
//! Source failures get their own small enum, [`SourceError`], so callers can
//! tell a missing video apart from a broken transport without string
//! matching.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// Why the video source provider could not supply any bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The path or URL does not point at anything (missing file, HTTP 404,
    /// empty body).
    #[error("not found: {0}")]
    NotFound(String),

    /// The source exists but could not be read or downloaded.
    #[error("transport error: {0}")]
    Transport(String),
}

/// The unified error type for all `covershot` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ThumbnailError {
    /// The decoder reported a zero, negative, or unreadable duration.
    #[error("Invalid video duration: {0}s (expected a positive, finite length)")]
    InvalidDuration(f64),

    /// No frame could be produced at the resolved time.
    #[error("Failed to decode frame at {at:.2}s: {reason}")]
    DecodeFailure {
        /// Resolved frame time in seconds.
        at: f64,
        /// Underlying reason.
        reason: String,
    },

    /// The input collaborator could not supply the video bytes.
    #[error("Video source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// The video container could not be opened.
    #[error("Failed to open video at {path}: {reason}")]
    FileOpen {
        /// Path handed to FFmpeg (a scratch file for in-memory sources).
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container holds no video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The decoded frame has no pixels.
    #[error("Source frame is empty ({width}x{height})")]
    EmptyFrame {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },

    /// A thumbnail size or ratio cannot be rendered.
    #[error("Invalid thumbnail spec: {0}")]
    InvalidSpec(String),

    /// The options passed to an extraction are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during cropping or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The thumbnail manifest could not be read or written.
    #[error("Manifest error: {0}")]
    ManifestError(String),
}

impl From<FfmpegError> for ThumbnailError {
    fn from(error: FfmpegError) -> Self {
        ThumbnailError::FfmpegError(error.to_string())
    }
}

impl From<serde_json::Error> for ThumbnailError {
    fn from(error: serde_json::Error) -> Self {
        ThumbnailError::ManifestError(error.to_string())
    }
}
