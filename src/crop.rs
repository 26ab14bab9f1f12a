//! Cover-crop geometry and resizing.
//!
//! Works like CSS `background-size: cover`: the largest centred rectangle
//! with the target aspect ratio is cut out of the source frame, so every
//! output pixel is backed by source content and nothing is letterboxed or
//! stretched. A fixed-size target is then resampled with Lanczos3.
//!
//! # Example
//!
//! ```
//! use covershot::{CropRect, cover_crop_rect};
//!
//! // A 1920×1080 frame cut down to a 300×140 shape keeps the full width.
//! let rect = cover_crop_rect(1920, 1080, 300.0 / 140.0);
//! assert_eq!(rect, CropRect { left: 0, top: 92, width: 1920, height: 896 });
//! ```

use image::{
    RgbImage,
    imageops::{self, FilterType},
};

use crate::{configuration::ThumbnailSpec, error::ThumbnailError};

/// Resampling filter used for fixed-size targets.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// A crop rectangle in source pixel coordinates, `[left, right)` ×
/// `[top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    /// First column included in the crop.
    pub left: u32,
    /// First row included in the crop.
    pub top: u32,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl CropRect {
    /// One past the last column.
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    /// One past the last row.
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    /// Returns `true` if the rectangle fits inside a `width`×`height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// Compute the centred cover crop of a `source_width`×`source_height` frame
/// for `target_ratio` (`width / height`).
///
/// A relatively wider source keeps its full height; anything else keeps its
/// full width. Rounding can never push the crop outside the source: both
/// dimensions are clamped to the source, and to at least one pixel. When the
/// leftover is odd, the extra pixel goes to the right/bottom margin.
///
/// A zero-sized source yields an empty rectangle at the origin.
pub fn cover_crop_rect(source_width: u32, source_height: u32, target_ratio: f64) -> CropRect {
    if source_width == 0 || source_height == 0 {
        return CropRect {
            left: 0,
            top: 0,
            width: 0,
            height: 0,
        };
    }

    let source_ratio = source_width as f64 / source_height as f64;
    let (crop_width, crop_height) = if source_ratio > target_ratio {
        let width = (source_height as f64 * target_ratio).round() as u32;
        (width, source_height)
    } else {
        let height = (source_width as f64 / target_ratio).round() as u32;
        (source_width, height)
    };

    let crop_width = crop_width.max(1).min(source_width);
    let crop_height = crop_height.max(1).min(source_height);

    CropRect {
        left: (source_width - crop_width) / 2,
        top: (source_height - crop_height) / 2,
        width: crop_width,
        height: crop_height,
    }
}

/// Cover-crop `frame` to `spec`.
///
/// [`ThumbnailSpec::Size`] returns exactly the requested size.
/// [`ThumbnailSpec::Ratio`] returns the crop itself, unresized. The source
/// frame is only borrowed, so several specs can be rendered from one frame.
///
/// # Errors
///
/// Returns [`ThumbnailError::InvalidSpec`] for zero-sized specs and
/// [`ThumbnailError::EmptyFrame`] if `frame` has no pixels.
pub fn cover_crop_resize(frame: &RgbImage, spec: &ThumbnailSpec) -> Result<RgbImage, ThumbnailError> {
    spec.validate()?;

    let (source_width, source_height) = frame.dimensions();
    if source_width == 0 || source_height == 0 {
        return Err(ThumbnailError::EmptyFrame {
            width: source_width,
            height: source_height,
        });
    }

    let rect = cover_crop_rect(source_width, source_height, spec.target_ratio());
    debug_assert!(rect.fits_within(source_width, source_height));
    log::debug!(
        "Cover crop {source_width}x{source_height} -> {}x{} at ({}, {}) for {spec:?}",
        rect.width,
        rect.height,
        rect.left,
        rect.top,
    );

    let cropped = imageops::crop_imm(frame, rect.left, rect.top, rect.width, rect.height).to_image();

    match *spec {
        ThumbnailSpec::Size { width, height } => {
            Ok(imageops::resize(&cropped, width, height, RESIZE_FILTER))
        }
        ThumbnailSpec::Ratio { .. } => Ok(cropped),
    }
}
