//! Video decoding.
//!
//! [`FrameDecoder`] is the capability the extraction pipeline needs from a
//! decoder: a duration and one RGB frame at a given time. [`VideoHandle`] is
//! the FFmpeg-backed implementation.
//!
//! A handle opened from memory copies the bytes into a scratch file that
//! lives exactly as long as the handle. Dropping the handle closes the
//! demuxer first and then deletes the file, whether extraction succeeded or
//! not.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    io::Write,
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::error::EAGAIN,
};
use image::RgbImage;
use tempfile::NamedTempFile;

use crate::{error::ThumbnailError, metadata::VideoMetadata};

/// Frames whose timestamp is within this many seconds before the target
/// count as hits; absorbs PTS rounding in the stream time base.
const FRAME_TIME_TOLERANCE: f64 = 1e-3;

/// Something that can report a video's length and produce a frame from it.
///
/// The pipeline takes decoders by value and drops them as soon as the frame
/// has been obtained. `&mut D` also implements the trait, for callers that
/// want to keep the decoder.
pub trait FrameDecoder {
    /// Length of the video in seconds. Zero or non-finite when unknown.
    fn duration(&self) -> f64;

    /// Decode the frame shown at `seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::DecodeFailure`] if no frame can be produced.
    fn frame_at(&mut self, seconds: f64) -> Result<RgbImage, ThumbnailError>;
}

impl<D: FrameDecoder + ?Sized> FrameDecoder for &mut D {
    fn duration(&self) -> f64 {
        (**self).duration()
    }

    fn frame_at(&mut self, seconds: f64) -> Result<RgbImage, ThumbnailError> {
        (**self).frame_at(seconds)
    }
}

/// An opened video, ready to hand out frames.
///
/// # Example
///
/// ```no_run
/// use covershot::{FrameDecoder, VideoHandle};
///
/// let bytes = std::fs::read("input.mp4")?;
/// let mut handle = VideoHandle::from_bytes(&bytes)?;
/// let frame = handle.frame_at(handle.duration() / 2.0)?;
/// frame.save("middle.png")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct VideoHandle {
    // Field order matters: the demuxer must close before the scratch file is
    // removed.
    input_context: Input,
    metadata: VideoMetadata,
    path: PathBuf,
    _scratch_file: Option<NamedTempFile>,
}

impl Debug for VideoHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoHandle")
            .field("metadata", &self.metadata)
            .field("path", &self.path)
            .field("in_memory", &self._scratch_file.is_some())
            .finish_non_exhaustive()
    }
}

impl VideoHandle {
    /// Open a video file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::FileOpen`] if FFmpeg cannot open the file
    /// and [`ThumbnailError::NoVideoStream`] if it has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ThumbnailError> {
        Self::open_path(path.as_ref().to_path_buf(), None)
    }

    /// Open a video held entirely in memory.
    ///
    /// The bytes are written to a scratch file that is deleted when the
    /// handle is dropped.
    ///
    /// # Errors
    ///
    /// Same as [`open`](VideoHandle::open), plus [`ThumbnailError::IoError`]
    /// if the scratch file cannot be written.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ThumbnailError> {
        if bytes.is_empty() {
            return Err(ThumbnailError::FileOpen {
                path: PathBuf::from("<memory>"),
                reason: "video buffer is empty".to_string(),
            });
        }

        let mut scratch_file = tempfile::Builder::new()
            .prefix("covershot-")
            .suffix(".video")
            .tempfile()?;
        scratch_file.write_all(bytes)?;
        scratch_file.flush()?;

        let path = scratch_file.path().to_path_buf();
        log::debug!("Spooled {} bytes to {}", bytes.len(), path.display());
        Self::open_path(path, Some(scratch_file))
    }

    fn open_path(path: PathBuf, scratch_file: Option<NamedTempFile>) -> Result<Self, ThumbnailError> {
        log::debug!("Opening video: {}", path.display());

        ffmpeg_next::init().map_err(|error| ThumbnailError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| ThumbnailError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let metadata = read_metadata(&input_context, &path)?;

        log::info!(
            "Opened video: {} (format={}, duration={:.2}s, {}x{} @ {:.2} fps, codec={})",
            path.display(),
            metadata.format,
            metadata.duration,
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            metadata,
            path,
            _scratch_file: scratch_file,
        })
    }

    /// Metadata read when the handle was opened.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path FFmpeg is reading from (a scratch file for in-memory sources).
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameDecoder for VideoHandle {
    fn duration(&self) -> f64 {
        self.metadata.duration
    }

    /// Seeks to the keyframe at or before `seconds` and decodes forward to
    /// the first frame shown at or after it. If the stream ends first, the
    /// last decoded frame is returned instead.
    ///
    /// `seconds` is measured from the start of the stream, so containers
    /// whose timestamps begin above zero (MPEG-TS, edited MP4) are offset by
    /// the stream start time.
    fn frame_at(&mut self, seconds: f64) -> Result<RgbImage, ThumbnailError> {
        let decode_failure = |reason: String| ThumbnailError::DecodeFailure { at: seconds, reason };

        let stream_index = self.metadata.stream_index;
        let stream = self
            .input_context
            .stream(stream_index)
            .ok_or(ThumbnailError::NoVideoStream)?;
        let time_base = stream.time_base();
        let start_pts = match stream.start_time() {
            ffmpeg_sys_next::AV_NOPTS_VALUE => 0,
            pts => pts,
        };
        let mut decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| decode_failure(format!("cannot create decoder: {error}")))?;

        let start_offset = pts_to_seconds(start_pts, time_base);
        let seek_target = ((seconds.max(0.0) + start_offset) * 1_000_000.0) as i64;
        if let Err(error) = self.input_context.seek(seek_target, ..seek_target) {
            log::warn!("Seek to {seconds:.2}s failed ({error}); decoding from the current position");
        }

        let mut seeker = FrameSeeker::new(seconds, time_base, start_pts);

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != stream_index {
                continue;
            }
            if let Err(error) = decoder.send_packet(&packet) {
                log::debug!("Skipping undecodable packet: {error}");
                continue;
            }
            if let Some(image) = seeker.drain(&mut decoder)? {
                return Ok(image);
            }
        }

        decoder
            .send_eof()
            .map_err(|error| decode_failure(format!("cannot flush decoder: {error}")))?;
        if let Some(image) = seeker.drain(&mut decoder)? {
            return Ok(image);
        }

        seeker.finish()
    }
}

/// Decode-forward state for one `frame_at` call.
struct FrameSeeker {
    target: f64,
    time_base: Rational,
    start_pts: i64,
    decoded: VideoFrame,
    previous: VideoFrame,
    has_previous: bool,
    scaler: Option<ScalingContext>,
}

impl FrameSeeker {
    fn new(target: f64, time_base: Rational, start_pts: i64) -> Self {
        Self {
            target,
            time_base,
            start_pts,
            decoded: VideoFrame::empty(),
            previous: VideoFrame::empty(),
            has_previous: false,
            scaler: None,
        }
    }

    /// Pull every frame the decoder has ready; return the first one at or
    /// after the target.
    fn drain(&mut self, decoder: &mut VideoDecoder) -> Result<Option<RgbImage>, ThumbnailError> {
        loop {
            match decoder.receive_frame(&mut self.decoded) {
                Ok(()) => {}
                Err(FfmpegError::Other { errno: EAGAIN }) | Err(FfmpegError::Eof) => {
                    return Ok(None);
                }
                Err(error) => {
                    log::warn!(
                        "Decoder error while seeking to {:.2}s: {error}",
                        self.target
                    );
                    return Ok(None);
                }
            }

            let frame_time = self
                .decoded
                .pts()
                .map(|pts| pts_to_seconds(pts - self.start_pts, self.time_base));

            if frame_time.is_none_or(|time| time + FRAME_TIME_TOLERANCE >= self.target) {
                log::debug!("Decoded frame at {frame_time:?} for target {:.2}s", self.target);
                let image = convert_to_rgb(&mut self.scaler, &self.decoded, self.target)?;
                return Ok(Some(image));
            }

            std::mem::swap(&mut self.decoded, &mut self.previous);
            self.has_previous = true;
        }
    }

    /// Fall back to the last frame before end-of-stream.
    fn finish(mut self) -> Result<RgbImage, ThumbnailError> {
        if !self.has_previous {
            return Err(ThumbnailError::DecodeFailure {
                at: self.target,
                reason: "the video stream produced no frames".to_string(),
            });
        }
        log::debug!(
            "Stream ended before {:.2}s; using the last decoded frame",
            self.target
        );
        convert_to_rgb(&mut self.scaler, &self.previous, self.target)
    }
}

fn read_metadata(input_context: &Input, path: &Path) -> Result<VideoMetadata, ThumbnailError> {
    let stream = input_context
        .streams()
        .best(Type::Video)
        .ok_or(ThumbnailError::NoVideoStream)?;
    let stream_index = stream.index();

    let decoder_context =
        CodecContext::from_parameters(stream.parameters()).map_err(|error| {
            ThumbnailError::FileOpen {
                path: path.to_path_buf(),
                reason: format!("Failed to read codec parameters for stream {stream_index}: {error}"),
            }
        })?;
    let decoder = decoder_context
        .decoder()
        .video()
        .map_err(|error| ThumbnailError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("Failed to create video decoder for stream {stream_index}: {error}"),
        })?;

    let frame_rate = stream.avg_frame_rate();
    let frames_per_second = if frame_rate.denominator() != 0 {
        frame_rate.numerator() as f64 / frame_rate.denominator() as f64
    } else {
        0.0
    };

    let container_duration = input_context.duration();
    let duration = if container_duration > 0 {
        container_duration as f64 / ffmpeg_sys_next::AV_TIME_BASE as f64
    } else if stream.duration() > 0 {
        pts_to_seconds(stream.duration(), stream.time_base())
    } else {
        0.0
    };

    let codec = decoder
        .codec()
        .map(|codec| codec.name().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(VideoMetadata {
        duration,
        width: decoder.width(),
        height: decoder.height(),
        frames_per_second,
        codec,
        format: input_context.format().name().to_string(),
        stream_index,
    })
}

/// Convert a decoded frame to a tightly packed RGB image.
///
/// The scaler is created from the first frame and rebuilt if the frame
/// geometry or pixel format changes mid-stream.
fn convert_to_rgb(
    scaler: &mut Option<ScalingContext>,
    frame: &VideoFrame,
    at: f64,
) -> Result<RgbImage, ThumbnailError> {
    let (width, height, format) = (frame.width(), frame.height(), frame.format());

    let stale = scaler.as_ref().is_none_or(|context| {
        let input = context.input();
        input.width != width || input.height != height || input.format != format
    });
    if stale {
        let context = ScalingContext::get(
            format,
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| ThumbnailError::DecodeFailure {
            at,
            reason: format!("cannot convert {format:?} {width}x{height} to RGB: {error}"),
        })?;
        *scaler = Some(context);
    }

    let mut rgb_frame = VideoFrame::empty();
    if let Some(context) = scaler.as_mut() {
        context
            .run(frame, &mut rgb_frame)
            .map_err(|error| ThumbnailError::DecodeFailure {
                at,
                reason: format!("pixel conversion failed: {error}"),
            })?;
    }

    let buffer = packed_rgb_rows(&rgb_frame, width, height);
    RgbImage::from_raw(width, height, buffer).ok_or_else(|| ThumbnailError::DecodeFailure {
        at,
        reason: "decoded frame data does not match its dimensions".to_string(),
    })
}

/// Strip per-row padding from an RGB24 frame.
fn packed_rgb_rows(rgb_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let row_bytes = width as usize * 3;
    let data = rgb_frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * height as usize].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        buffer.extend_from_slice(&data[start..start + row_bytes]);
    }
    buffer
}

fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}
