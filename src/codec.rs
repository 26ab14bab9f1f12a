//! Thumbnail encoding.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use image::{
    ExtendedColorType, ImageEncoder, RgbImage,
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
};

use crate::error::ThumbnailError;

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Encoded output format for thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Lossless PNG. This is the default.
    #[default]
    Png,
    /// Baseline JPEG.
    Jpeg {
        /// Encoder quality, `1..=100`.
        quality: u8,
    },
}

impl ImageFormat {
    /// JPEG at [`DEFAULT_JPEG_QUALITY`].
    pub fn jpeg() -> Self {
        ImageFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg { .. } => "jpg",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ImageFormat::Png => write!(f, "PNG"),
            ImageFormat::Jpeg { quality } => write!(f, "JPEG (quality {quality})"),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ThumbnailError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::jpeg()),
            other => Err(ThumbnailError::InvalidConfiguration(format!(
                "unsupported image format: {other}"
            ))),
        }
    }
}

/// Encode an RGB image to PNG or JPEG bytes.
///
/// Encoding is deterministic: the same image and format always produce the
/// same bytes.
///
/// # Errors
///
/// Returns [`ThumbnailError::InvalidConfiguration`] for a JPEG quality
/// outside `1..=100` and [`ThumbnailError::ImageError`] if the encoder
/// rejects the image.
pub fn encode_image(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>, ThumbnailError> {
    let (width, height) = image.dimensions();
    let mut bytes = Vec::new();
    match format {
        ImageFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        ImageFormat::Jpeg { quality } => {
            check_jpeg_quality(quality)?;
            JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    log::debug!("Encoded {width}x{height} thumbnail as {format} ({} bytes)", bytes.len());
    Ok(bytes)
}

/// Reject JPEG qualities the encoder would otherwise silently clamp.
pub(crate) fn check_jpeg_quality(quality: u8) -> Result<(), ThumbnailError> {
    if (1..=100).contains(&quality) {
        Ok(())
    } else {
        Err(ThumbnailError::InvalidConfiguration(format!(
            "JPEG quality must be within 1..=100, got {quality}"
        )))
    }
}
