//! Thumbnail file naming.
//!
//! Stored thumbnails are named `{stem}_{seconds:.2}.{ext}`, e.g.
//! `thumbnail_12.00.png`. The chosen time is also stored explicitly by the
//! [`DirectorySink`](crate::DirectorySink); parsing it back out of a name is
//! only a fallback for files that have no manifest entry.

use std::path::Path;

use crate::codec::ImageFormat;

/// Stem used for the primary thumbnail.
pub const DEFAULT_STEM: &str = "thumbnail";

/// Suffix appended to the stem for the second image of a pair.
pub const SECONDARY_SUFFIX: &str = "wide";

/// Build the file name for a thumbnail cut at `chosen_time` seconds.
///
/// ```
/// use covershot::{ImageFormat, thumbnail_filename};
///
/// assert_eq!(thumbnail_filename("thumbnail", 12.0, ImageFormat::Png), "thumbnail_12.00.png");
/// ```
pub fn thumbnail_filename(stem: &str, chosen_time: f64, format: ImageFormat) -> String {
    format!("{stem}_{chosen_time:.2}.{}", format.extension())
}

/// Recover the timestamp from a thumbnail file name or path.
///
/// Takes the token after the last underscore of the file stem. Returns
/// `None` if there is no underscore or the token is not a finite number.
///
/// ```
/// use covershot::parse_filename_timestamp;
///
/// assert_eq!(parse_filename_timestamp("thumbnails/thumbnail_12.00.png"), Some(12.0));
/// assert_eq!(parse_filename_timestamp("cover.png"), None);
/// ```
pub fn parse_filename_timestamp(name: &str) -> Option<f64> {
    let stem = Path::new(name).file_stem()?.to_str()?;
    let (_, token) = stem.rsplit_once('_')?;
    token.parse::<f64>().ok().filter(|seconds| seconds.is_finite())
}
