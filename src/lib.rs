//! # covershot
//!
//! Cut a cover thumbnail out of a video: pick one frame, crop it to the
//! requested shape the way CSS `object-fit: cover` does, and encode it.
//!
//! Decoding is done by FFmpeg through
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next); cropping, resizing
//! and encoding by the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ### One fixed-size thumbnail
//!
//! ```no_run
//! use covershot::{ThumbnailOptions, Thumbnailer};
//!
//! let extraction = Thumbnailer::extract_file("input.mp4", &ThumbnailOptions::size(300, 140))?;
//! std::fs::write("thumbnail.png", &extraction.thumbnails.primary().bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### A fixed size plus a ratio crop, at a chosen second
//!
//! ```no_run
//! use covershot::{ThumbnailOptions, ThumbnailSet, Thumbnailer};
//!
//! let bytes = std::fs::read("input.mp4")?;
//! let options = ThumbnailOptions::size(300, 140).with_ratio(2, 1).with_timestamp(12.0);
//!
//! if let ThumbnailSet::Pair(small, wide) = Thumbnailer::extract(&bytes, &options)?.thumbnails {
//!     println!("{}x{} and {}x{}", small.width, small.height, wide.width, wide.height);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Fetch, extract, and store
//!
//! ```no_run
//! use covershot::{
//!     DefaultSourceProvider, DirectorySink, ThumbnailOptions, ThumbnailSink, Thumbnailer,
//!     VideoSource,
//! };
//!
//! let source = VideoSource::parse("https://example.com/clip.mp4");
//! let extraction = Thumbnailer::extract_from_source(
//!     &source,
//!     &DefaultSourceProvider::new(),
//!     &ThumbnailOptions::new(),
//! )?;
//! DirectorySink::new("thumbnails").store(&source, &extraction)?;
//! # Ok::<(), covershot::ThumbnailError>(())
//! ```
//!
//! ## Frame selection
//!
//! Without a requested time the midpoint of the video is used. A requested
//! time is rounded to the whole second; one outside `[0, duration]` is
//! ignored. The result is kept at least one second before the end of the
//! stream. See [`select_frame_time`] and [`SelectionPolicy`].
//!
//! ## Features
//!
//! - `http` (default): download `http(s)://` sources with `reqwest`.

pub mod codec;
pub mod configuration;
pub mod crop;
pub mod decoder;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod naming;
pub mod selection;
pub mod sink;
pub mod source;
pub mod thumbnail;

pub use codec::{DEFAULT_JPEG_QUALITY, ImageFormat, encode_image};
pub use configuration::{DEFAULT_THUMBNAIL_SIZE, ThumbnailOptions, ThumbnailSpec};
pub use crop::{CropRect, RESIZE_FILTER, cover_crop_rect, cover_crop_resize};
pub use decoder::{FrameDecoder, VideoHandle};
pub use error::{SourceError, ThumbnailError};
pub use ffmpeg::{DecoderLogLevel, decoder_log_level, set_decoder_log_level};
pub use metadata::VideoMetadata;
pub use naming::{DEFAULT_STEM, SECONDARY_SUFFIX, parse_filename_timestamp, thumbnail_filename};
pub use selection::{END_OF_STREAM_MARGIN, SelectionPolicy, clamp_to_playable, select_frame_time};
pub use sink::{DirectorySink, MANIFEST_FILE_NAME, ThumbnailRecord, ThumbnailSink};
pub use source::{DEFAULT_FETCH_TIMEOUT, DefaultSourceProvider, SourceProvider, VideoSource};
pub use thumbnail::{Extraction, ThumbnailImage, ThumbnailSet, Thumbnailer};
