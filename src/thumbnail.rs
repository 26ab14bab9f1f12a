//! The extraction pipeline.
//!
//! [`Thumbnailer`] runs the whole flow for one video: open, pick a frame
//! time, decode that frame, release the video, cover-crop every requested
//! shape from the frame, and encode. Each call is independent and keeps no
//! state between requests.

use std::path::Path;

use image::RgbImage;

use crate::{
    codec::{ImageFormat, encode_image},
    configuration::{ThumbnailOptions, ThumbnailSpec},
    crop::cover_crop_resize,
    decoder::{FrameDecoder, VideoHandle},
    error::ThumbnailError,
    source::{SourceProvider, VideoSource},
};

/// One encoded thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Width the image was produced at.
    pub width: u32,
    /// Height the image was produced at.
    pub height: u32,
    /// Encoding of `bytes`.
    pub format: ImageFormat,
}

/// The thumbnails produced by one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailSet {
    /// A single fixed-size or ratio thumbnail.
    Single(ThumbnailImage),
    /// A fixed-size thumbnail followed by a ratio crop.
    Pair(ThumbnailImage, ThumbnailImage),
}

impl ThumbnailSet {
    /// The first (or only) thumbnail.
    pub fn primary(&self) -> &ThumbnailImage {
        match self {
            ThumbnailSet::Single(image) | ThumbnailSet::Pair(image, _) => image,
        }
    }

    /// The second thumbnail of a pair.
    pub fn secondary(&self) -> Option<&ThumbnailImage> {
        match self {
            ThumbnailSet::Single(_) => None,
            ThumbnailSet::Pair(_, image) => Some(image),
        }
    }

    /// Iterate over the thumbnails in order.
    pub fn iter(&self) -> impl Iterator<Item = &ThumbnailImage> {
        std::iter::once(self.primary()).chain(self.secondary())
    }

    /// Number of thumbnails, 1 or 2.
    pub fn len(&self) -> usize {
        match self {
            ThumbnailSet::Single(_) => 1,
            ThumbnailSet::Pair(..) => 2,
        }
    }

    /// Always `false`; a set holds at least one thumbnail.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Result of one extraction, ready to be handed to a
/// [`ThumbnailSink`](crate::ThumbnailSink).
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Video length in seconds, as reported by the decoder.
    pub duration: f64,
    /// The frame time the thumbnails were cut from.
    pub chosen_time: f64,
    /// The encoded thumbnails.
    pub thumbnails: ThumbnailSet,
}

/// Thumbnail extraction entry points.
///
/// All methods are stateless.
///
/// # Example
///
/// ```no_run
/// use covershot::{ThumbnailOptions, Thumbnailer};
///
/// let bytes = std::fs::read("input.mp4")?;
/// let options = ThumbnailOptions::size(300, 140).with_ratio(2, 1).with_timestamp(12.0);
/// let extraction = Thumbnailer::extract(&bytes, &options)?;
/// println!("cut at {:.2}s of {:.2}s", extraction.chosen_time, extraction.duration);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Thumbnailer;

impl Thumbnailer {
    /// Extract thumbnails from a video held in memory.
    ///
    /// # Errors
    ///
    /// Configuration errors are reported before any decoding. Otherwise
    /// returns open, [`InvalidDuration`](ThumbnailError::InvalidDuration),
    /// [`DecodeFailure`](ThumbnailError::DecodeFailure), or encoding errors.
    pub fn extract(bytes: &[u8], options: &ThumbnailOptions) -> Result<Extraction, ThumbnailError> {
        options.validate()?;
        let handle = VideoHandle::from_bytes(bytes)?;
        Self::extract_with(handle, options)
    }

    /// Extract thumbnails from a video file on disk.
    ///
    /// # Errors
    ///
    /// Same as [`extract`](Thumbnailer::extract).
    pub fn extract_file<P: AsRef<Path>>(
        path: P,
        options: &ThumbnailOptions,
    ) -> Result<Extraction, ThumbnailError> {
        options.validate()?;
        let handle = VideoHandle::open(path)?;
        Self::extract_with(handle, options)
    }

    /// Fetch a video through `provider`, then extract thumbnails from it.
    ///
    /// The fetched bytes are released once the video is open, before any
    /// decoding.
    ///
    /// # Errors
    ///
    /// [`ThumbnailError::SourceUnavailable`] if the provider fails, then the
    /// same errors as [`extract`](Thumbnailer::extract).
    pub fn extract_from_source<S: SourceProvider + ?Sized>(
        source: &VideoSource,
        provider: &S,
        options: &ThumbnailOptions,
    ) -> Result<Extraction, ThumbnailError> {
        options.validate()?;
        let bytes = provider.fetch(source)?;
        let handle = VideoHandle::from_bytes(&bytes)?;
        drop(bytes);
        Self::extract_with(handle, options)
    }

    /// Run the pipeline on any [`FrameDecoder`].
    ///
    /// The decoder is consumed and dropped right after the frame has been
    /// decoded, before cropping starts.
    ///
    /// # Errors
    ///
    /// Same as [`extract`](Thumbnailer::extract), minus open errors.
    pub fn extract_with<D: FrameDecoder>(
        mut decoder: D,
        options: &ThumbnailOptions,
    ) -> Result<Extraction, ThumbnailError> {
        options.validate()?;
        let (first_spec, second_spec) = options.thumbnail_specs()?;

        let duration = decoder.duration();
        let chosen_time = options
            .policy
            .resolve(duration, options.requested_timestamp)?;
        let frame = decoder.frame_at(chosen_time)?;
        drop(decoder);

        log::debug!(
            "Decoded {}x{} frame at {chosen_time:.2}s",
            frame.width(),
            frame.height()
        );

        let first = render(&frame, &first_spec, options.format)?;
        let thumbnails = match second_spec {
            Some(spec) => ThumbnailSet::Pair(first, render(&frame, &spec, options.format)?),
            None => ThumbnailSet::Single(first),
        };

        log::info!(
            "Extracted {} thumbnail(s) at {chosen_time:.2}s of {duration:.2}s",
            thumbnails.len()
        );

        Ok(Extraction {
            duration,
            chosen_time,
            thumbnails,
        })
    }
}

fn render(
    frame: &RgbImage,
    spec: &ThumbnailSpec,
    format: ImageFormat,
) -> Result<ThumbnailImage, ThumbnailError> {
    let image = cover_crop_resize(frame, spec)?;
    let bytes = encode_image(&image, format)?;
    Ok(ThumbnailImage {
        bytes,
        width: image.width(),
        height: image.height(),
        format,
    })
}
