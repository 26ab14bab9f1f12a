//! Extraction configuration.
//!
//! [`ThumbnailOptions`] is the configuration surface of an extraction: which
//! thumbnails to produce, which instant to cut them from, and how to encode
//! them. [`ThumbnailSpec`] describes a single output shape.
//!
//! # Example
//!
//! ```
//! use covershot::{ImageFormat, SelectionPolicy, ThumbnailOptions};
//!
//! let options = ThumbnailOptions::size(300, 140)
//!     .with_ratio(2, 1)
//!     .with_timestamp(12.0)
//!     .with_format(ImageFormat::jpeg())
//!     .with_policy(SelectionPolicy::Midpoint);
//! assert!(options.validate().is_ok());
//! ```

use crate::{
    codec::{ImageFormat, check_jpeg_quality},
    error::ThumbnailError,
    selection::SelectionPolicy,
};

/// Default fixed thumbnail size, in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: (u32, u32) = (300, 140);

/// The shape of one output thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSpec {
    /// Crop to the target aspect ratio, then resize to exactly this size.
    Size {
        /// Output width in pixels.
        width: u32,
        /// Output height in pixels.
        height: u32,
    },
    /// Crop to this aspect ratio and keep the cropped pixels as they are.
    Ratio {
        /// Ratio numerator (horizontal).
        width: u32,
        /// Ratio denominator (vertical).
        height: u32,
    },
}

impl ThumbnailSpec {
    /// A fixed pixel size.
    pub fn size(width: u32, height: u32) -> Self {
        ThumbnailSpec::Size { width, height }
    }

    /// An aspect ratio such as `2:1`.
    pub fn ratio(width: u32, height: u32) -> Self {
        ThumbnailSpec::Ratio { width, height }
    }

    /// The `width / height` ratio the crop has to match.
    pub fn target_ratio(&self) -> f64 {
        let (width, height) = self.components();
        width as f64 / height as f64
    }

    /// Check that both components are non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::InvalidSpec`] for zero components.
    pub fn validate(&self) -> Result<(), ThumbnailError> {
        let (width, height) = self.components();
        if width == 0 || height == 0 {
            return Err(ThumbnailError::InvalidSpec(format!(
                "{self:?} has a zero component"
            )));
        }
        Ok(())
    }

    fn components(&self) -> (u32, u32) {
        match *self {
            ThumbnailSpec::Size { width, height } | ThumbnailSpec::Ratio { width, height } => {
                (width, height)
            }
        }
    }
}

/// Options for a single extraction.
///
/// At least one of `target_size` or `target_ratio` must be set. With both
/// set the extraction yields a pair: the fixed-size image first, the ratio
/// crop second.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ThumbnailOptions {
    /// Fixed output size `(width, height)`.
    pub target_size: Option<(u32, u32)>,
    /// Output aspect ratio `(width, height)`.
    pub target_ratio: Option<(u32, u32)>,
    /// Requested frame time in seconds.
    pub requested_timestamp: Option<f64>,
    /// Encoding of the output images.
    pub format: ImageFormat,
    /// Fallback policy when no usable timestamp was requested.
    pub policy: SelectionPolicy,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self::size(DEFAULT_THUMBNAIL_SIZE.0, DEFAULT_THUMBNAIL_SIZE.1)
    }
}

impl ThumbnailOptions {
    /// Options producing a 300×140 PNG from the midpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options producing a single fixed-size thumbnail.
    pub fn size(width: u32, height: u32) -> Self {
        Self {
            target_size: Some((width, height)),
            target_ratio: None,
            requested_timestamp: None,
            format: ImageFormat::default(),
            policy: SelectionPolicy::default(),
        }
    }

    /// Options producing a single ratio crop.
    pub fn ratio(width: u32, height: u32) -> Self {
        Self {
            target_size: None,
            target_ratio: Some((width, height)),
            ..Self::default()
        }
    }

    /// Add (or replace) the fixed-size output.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.target_size = Some((width, height));
        self
    }

    /// Add (or replace) the ratio output.
    pub fn with_ratio(mut self, width: u32, height: u32) -> Self {
        self.target_ratio = Some((width, height));
        self
    }

    /// Request a frame time in seconds.
    pub fn with_timestamp(mut self, seconds: f64) -> Self {
        self.requested_timestamp = Some(seconds);
        self
    }

    /// Set the output encoding.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the fallback selection policy.
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The output shapes, fixed size first.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](ThumbnailOptions::validate).
    pub fn thumbnail_specs(&self) -> Result<(ThumbnailSpec, Option<ThumbnailSpec>), ThumbnailError> {
        let size = self
            .target_size
            .map(|(width, height)| ThumbnailSpec::size(width, height));
        let ratio = self
            .target_ratio
            .map(|(width, height)| ThumbnailSpec::ratio(width, height));

        let specs = match (size, ratio) {
            (Some(size), ratio) => (size, ratio),
            (None, Some(ratio)) => (ratio, None),
            (None, None) => {
                return Err(ThumbnailError::InvalidConfiguration(
                    "at least one of target_size or target_ratio must be set".to_string(),
                ));
            }
        };

        specs.0.validate()?;
        if let Some(second) = &specs.1 {
            second.validate()?;
        }
        Ok(specs)
    }

    /// Check the options before any decoding work is done.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::InvalidConfiguration`] if no output shape
    /// is set or the JPEG quality is outside `1..=100`, and
    /// [`ThumbnailError::InvalidSpec`] for zero-sized shapes.
    pub fn validate(&self) -> Result<(), ThumbnailError> {
        self.thumbnail_specs()?;
        if let ImageFormat::Jpeg { quality } = self.format {
            check_jpeg_quality(quality)?;
        }
        Ok(())
    }
}
