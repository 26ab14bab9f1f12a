//! Video metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoHandle`](crate::VideoHandle)
//! is opened and describes the stream the thumbnail is cut from.

/// Metadata for the best video stream of an opened file.
///
/// # Example
///
/// ```no_run
/// use covershot::VideoHandle;
///
/// let handle = VideoHandle::open("input.mp4")?;
/// let metadata = handle.metadata();
/// println!("{}x{} for {:.2}s", metadata.width, metadata.height, metadata.duration);
/// # Ok::<(), covershot::ThumbnailError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Length in seconds as reported by the container, or by the stream when
    /// the container does not know. Zero when neither does.
    pub duration: f64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frames per second (approximate for variable-frame-rate
    /// content, zero if unknown).
    pub frames_per_second: f64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
    /// Index of the stream inside the container.
    pub stream_index: usize,
}
