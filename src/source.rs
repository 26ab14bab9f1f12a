//! Video source providers.
//!
//! A [`SourceProvider`] turns a [`VideoSource`] into the complete video byte
//! buffer. Nothing is streamed: the provider either returns every byte or a
//! [`SourceError`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use covershot::{DefaultSourceProvider, SourceProvider, VideoSource};
//!
//! let provider = DefaultSourceProvider::new().with_timeout(Duration::from_secs(10));
//! let bytes = provider.fetch(&VideoSource::parse("https://example.com/clip.mp4"))?;
//! # Ok::<(), covershot::ThumbnailError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::{SourceError, ThumbnailError};

/// Default timeout for remote fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Where a video comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VideoSource {
    /// A remote resource, fetched over HTTP(S).
    Url(String),
    /// A file on the local filesystem.
    Path(PathBuf),
}

impl VideoSource {
    /// Classify a user-supplied string: anything with a `://` scheme
    /// separator is a URL, everything else a path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.contains("://") {
            VideoSource::Url(trimmed.to_string())
        } else {
            VideoSource::Path(PathBuf::from(trimmed))
        }
    }
}

impl Display for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VideoSource::Url(url) => write!(f, "{url}"),
            VideoSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Supplies the raw bytes of a video.
pub trait SourceProvider {
    /// Fetch every byte of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::SourceUnavailable`] with
    /// [`SourceError::NotFound`] when there is nothing at the source and
    /// [`SourceError::Transport`] when it could not be read.
    fn fetch(&self, source: &VideoSource) -> Result<Vec<u8>, ThumbnailError>;
}

/// Reads local files and, with the `http` feature, downloads URLs.
#[derive(Debug, Clone)]
pub struct DefaultSourceProvider {
    timeout: Duration,
}

impl Default for DefaultSourceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultSourceProvider {
    /// A provider with [`DEFAULT_FETCH_TIMEOUT`].
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Bound the total time of a remote fetch.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured remote fetch timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn read_path(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        let bytes = std::fs::read(path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
            _ => SourceError::Transport(format!("{}: {error}", path.display())),
        })?;
        if bytes.is_empty() {
            return Err(SourceError::NotFound(format!("{} is empty", path.display())));
        }
        Ok(bytes)
    }

    #[cfg(feature = "http")]
    fn download(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        use reqwest::StatusCode;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|error| SourceError::Transport(error.to_string()))?;

        let response = client
            .get(url)
            .send()
            .map_err(|error| SourceError::Transport(format!("{url}: {error}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(SourceError::NotFound(format!("{url} (HTTP {status})")));
        }
        if !status.is_success() {
            return Err(SourceError::Transport(format!("{url} returned HTTP {status}")));
        }

        let body = response
            .bytes()
            .map_err(|error| SourceError::Transport(format!("{url}: {error}")))?;
        if body.is_empty() {
            return Err(SourceError::NotFound(format!("{url} returned an empty body")));
        }
        Ok(body.to_vec())
    }

    #[cfg(not(feature = "http"))]
    fn download(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::Transport(format!(
            "cannot fetch {url}: built without the `http` feature"
        )))
    }
}

impl SourceProvider for DefaultSourceProvider {
    fn fetch(&self, source: &VideoSource) -> Result<Vec<u8>, ThumbnailError> {
        log::debug!("Fetching video from {source}");
        let bytes = match source {
            VideoSource::Url(url) => self.download(url)?,
            VideoSource::Path(path) => self.read_path(path)?,
        };
        log::info!("Fetched {} bytes from {source}", bytes.len());
        Ok(bytes)
    }
}
