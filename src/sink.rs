//! Persistence of extracted thumbnails.
//!
//! A [`ThumbnailSink`] stores the images of an [`Extraction`] together with
//! its duration and chosen time, and lists what it stored.
//! [`DirectorySink`] keeps the images as plain files and records each
//! extraction in a JSON manifest next to them.
//!
//! # Example
//!
//! ```no_run
//! use covershot::{
//!     DirectorySink, ThumbnailOptions, ThumbnailSink, Thumbnailer, VideoSource,
//! };
//!
//! let source = VideoSource::parse("input.mp4");
//! let extraction = Thumbnailer::extract_file("input.mp4", &ThumbnailOptions::new())?;
//!
//! let mut sink = DirectorySink::new("thumbnails");
//! let record = sink.store(&source, &extraction)?;
//! println!("stored {:?}", record.files);
//!
//! for record in sink.list()? {
//!     println!("{:?} @ {:?}", record.source, record.chosen_time);
//! }
//! # Ok::<(), covershot::ThumbnailError>(())
//! ```

use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde_json::{Value, json};
use tempfile::NamedTempFile;

use crate::{
    error::ThumbnailError,
    naming::{DEFAULT_STEM, SECONDARY_SUFFIX, parse_filename_timestamp, thumbnail_filename},
    source::VideoSource,
    thumbnail::{Extraction, ThumbnailImage},
};

/// Name of the manifest file inside a [`DirectorySink`] root.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One stored extraction, as listed back by a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailRecord {
    /// Sequence number assigned at store time. `None` for images found on
    /// disk without a manifest entry.
    pub id: Option<u64>,
    /// Where the video came from.
    pub source: Option<String>,
    /// Video length in seconds.
    pub duration: Option<f64>,
    /// Frame time the thumbnails were cut from.
    pub chosen_time: Option<f64>,
    /// Stored image files, primary first.
    pub files: Vec<PathBuf>,
}

/// Output collaborator for finished extractions.
pub trait ThumbnailSink {
    /// Persist the thumbnails and timing of `extraction`.
    ///
    /// Either everything is stored or nothing is.
    ///
    /// # Errors
    ///
    /// Returns I/O or manifest errors.
    fn store(
        &mut self,
        source: &VideoSource,
        extraction: &Extraction,
    ) -> Result<ThumbnailRecord, ThumbnailError>;

    /// List stored extractions, newest first.
    ///
    /// # Errors
    ///
    /// Returns I/O or manifest errors.
    fn list(&self) -> Result<Vec<ThumbnailRecord>, ThumbnailError>;
}

/// Stores thumbnails as files in a directory, indexed by a JSON manifest.
///
/// Files are named `{stem}_{seconds:.2}.{ext}`; the second image of a pair
/// uses `{stem}_wide`. The chosen time is stored in the manifest, so listing
/// never depends on the file name. Images without a manifest entry are still
/// listed, with their time parsed from the name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    stem: String,
}

impl DirectorySink {
    /// A sink writing into `root`, created on first store.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            stem: DEFAULT_STEM.to_string(),
        }
    }

    /// Use `stem` instead of `thumbnail` for file names.
    #[must_use]
    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        self.stem = stem.into();
        self
    }

    /// The directory this sink writes to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE_NAME)
    }

    fn read_manifest(&self) -> Result<Vec<Value>, ThumbnailError> {
        let path = self.manifest_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };
        match serde_json::from_str(&text)? {
            Value::Array(entries) => Ok(entries),
            _ => Err(ThumbnailError::ManifestError(format!(
                "{} does not hold a JSON array",
                path.display()
            ))),
        }
    }

    /// Replace the manifest atomically.
    fn write_manifest(&self, entries: &[Value]) -> Result<(), ThumbnailError> {
        let mut file = NamedTempFile::new_in(&self.root)?;
        serde_json::to_writer_pretty(&mut file, entries)?;
        file.flush()?;
        file.persist(self.manifest_path())
            .map_err(|error| ThumbnailError::IoError(error.error))?;
        Ok(())
    }

    fn record_from_entry(&self, entry: &Value) -> ThumbnailRecord {
        let files: Vec<PathBuf> = entry
            .get("files")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|name| self.root.join(name))
                    .collect()
            })
            .unwrap_or_default();

        let chosen_time = entry
            .get("chosen_time")
            .and_then(Value::as_f64)
            .or_else(|| files.first().and_then(|file| file_timestamp(file)));

        ThumbnailRecord {
            id: entry.get("id").and_then(Value::as_u64),
            source: entry.get("source").and_then(Value::as_str).map(str::to_string),
            duration: entry.get("duration").and_then(Value::as_f64),
            chosen_time,
            files,
        }
    }

    /// Write `image` under the first free name, never replacing an existing
    /// file: `{stem}`, then `{stem}-{id}`, then `{stem}-{id}-2` and so on.
    fn write_new(
        &self,
        stem: &str,
        id: u64,
        chosen_time: f64,
        image: &ThumbnailImage,
    ) -> io::Result<PathBuf> {
        let mut attempt = 0u64;
        loop {
            let candidate = match attempt {
                0 => stem.to_string(),
                1 => format!("{stem}-{id}"),
                n => format!("{stem}-{id}-{n}"),
            };
            let path = self
                .root
                .join(thumbnail_filename(&candidate, chosen_time, image.format));
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                    attempt += 1;
                    continue;
                }
                Err(error) => return Err(error),
            };
            if let Err(error) = file.write_all(&image.bytes).and_then(|()| file.sync_all()) {
                drop(file);
                discard(std::slice::from_ref(&path));
                return Err(error);
            }
            log::debug!("Wrote {} ({} bytes)", path.display(), image.bytes.len());
            return Ok(path);
        }
    }

    /// Images in the root that no manifest entry references.
    fn unindexed_images(
        &self,
        referenced: &HashSet<PathBuf>,
    ) -> Result<Vec<ThumbnailRecord>, ThumbnailError> {
        let directory = match fs::read_dir(&self.root) {
            Ok(directory) => directory,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut paths = Vec::new();
        for entry in directory {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| {
                    IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
                });
            if is_image && path.is_file() && !referenced.contains(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        paths.reverse();

        Ok(paths
            .into_iter()
            .map(|path| ThumbnailRecord {
                id: None,
                source: None,
                duration: None,
                chosen_time: file_timestamp(&path),
                files: vec![path],
            })
            .collect())
    }
}

impl ThumbnailSink for DirectorySink {
    fn store(
        &mut self,
        source: &VideoSource,
        extraction: &Extraction,
    ) -> Result<ThumbnailRecord, ThumbnailError> {
        fs::create_dir_all(&self.root)?;
        let mut entries = self.read_manifest()?;
        let id = entries
            .iter()
            .filter_map(|entry| entry.get("id").and_then(Value::as_u64))
            .max()
            .map_or(1, |last| last + 1);

        let stems = [self.stem.clone(), format!("{}_{SECONDARY_SUFFIX}", self.stem)];
        let mut written: Vec<PathBuf> = Vec::with_capacity(extraction.thumbnails.len());

        for (image, stem) in extraction.thumbnails.iter().zip(stems) {
            match self.write_new(&stem, id, extraction.chosen_time, image) {
                Ok(path) => written.push(path),
                Err(error) => {
                    discard(&written);
                    return Err(error.into());
                }
            }
        }

        let file_names: Vec<String> = written
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();

        let entry = json!({
            "id": id,
            "source": source.to_string(),
            "duration": extraction.duration,
            "chosen_time": extraction.chosen_time,
            "files": file_names,
        });
        let record = self.record_from_entry(&entry);
        entries.push(entry);

        if let Err(error) = self.write_manifest(&entries) {
            discard(&written);
            return Err(error);
        }

        log::info!(
            "Stored extraction #{id} from {source} in {}",
            self.root.display()
        );
        Ok(record)
    }

    fn list(&self) -> Result<Vec<ThumbnailRecord>, ThumbnailError> {
        let mut records: Vec<ThumbnailRecord> = self
            .read_manifest()?
            .iter()
            .map(|entry| self.record_from_entry(entry))
            .collect();
        records.sort_by(|left, right| right.id.cmp(&left.id));

        let referenced: HashSet<PathBuf> = records
            .iter()
            .flat_map(|record| record.files.iter().cloned())
            .collect();
        records.extend(self.unindexed_images(&referenced)?);
        Ok(records)
    }
}

fn file_timestamp(path: &Path) -> Option<f64> {
    parse_filename_timestamp(path.file_name()?.to_str()?)
}

fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(error) = fs::remove_file(path) {
            log::warn!("Failed to remove partial output {}: {error}", path.display());
        }
    }
}
