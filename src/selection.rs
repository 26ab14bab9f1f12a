//! Frame time selection.
//!
//! Decides which instant of a video the thumbnail is cut from. The default
//! policy is fully deterministic: a requested timestamp inside the video is
//! rounded to the nearest whole second, anything else falls back to the
//! midpoint. The result is then clamped so the decoder is never asked for a
//! frame at or past the end of the stream.
//!
//! # Example
//!
//! ```
//! use covershot::select_frame_time;
//!
//! assert_eq!(select_frame_time(10.0, Some(3.4))?, 3.0);
//! assert_eq!(select_frame_time(10.0, None)?, 5.0);
//! // Out-of-range requests are silently corrected, not rejected.
//! assert_eq!(select_frame_time(10.0, Some(42.0))?, 5.0);
//! // Sub-second clips always resolve to the first frame.
//! assert_eq!(select_frame_time(0.5, None)?, 0.0);
//! # Ok::<(), covershot::ThumbnailError>(())
//! ```

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::ThumbnailError;

/// Distance, in seconds, kept between the chosen time and the end of the
/// stream.
pub const END_OF_STREAM_MARGIN: f64 = 1.0;

/// How a frame time is chosen when the caller did not request a usable one.
///
/// Every policy shares the same validation, rounding of requested times,
/// and end-of-stream clamp. Only the fallback differs. The random variants
/// carry their seed so a given configuration always picks the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// The visual midpoint, `duration / 2`. This is the default.
    #[default]
    Midpoint,
    /// A uniformly random instant in `[0, duration]`.
    Random {
        /// Seed for the random number generator.
        seed: u64,
    },
    /// A uniformly random whole second in `[0, floor(duration)]`.
    RandomWholeSecond {
        /// Seed for the random number generator.
        seed: u64,
    },
}

impl SelectionPolicy {
    /// Resolve the frame time for a video of `duration` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::InvalidDuration`] if `duration` is zero,
    /// negative, or not finite. A bad `requested` value never fails.
    pub fn resolve(&self, duration: f64, requested: Option<f64>) -> Result<f64, ThumbnailError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ThumbnailError::InvalidDuration(duration));
        }

        let chosen = match requested {
            Some(timestamp) if timestamp.is_finite() && (0.0..=duration).contains(&timestamp) => {
                timestamp.round()
            }
            Some(timestamp) => {
                log::warn!(
                    "Requested timestamp {timestamp}s is outside [0, {duration:.2}]; using {self:?} fallback"
                );
                self.fallback(duration)
            }
            None => self.fallback(duration),
        };

        let resolved = clamp_to_playable(chosen, duration);
        log::debug!(
            "Resolved frame time {resolved:.2}s (duration={duration:.2}s, requested={requested:?}, policy={self:?})"
        );
        Ok(resolved)
    }

    fn fallback(&self, duration: f64) -> f64 {
        match *self {
            SelectionPolicy::Midpoint => duration / 2.0,
            SelectionPolicy::Random { seed } => StdRng::seed_from_u64(seed).gen_range(0.0..=duration),
            SelectionPolicy::RandomWholeSecond { seed } => {
                let last_second = duration.floor() as u64;
                StdRng::seed_from_u64(seed).gen_range(0..=last_second) as f64
            }
        }
    }
}

/// Pick the frame time with the default [`SelectionPolicy::Midpoint`] policy.
///
/// # Errors
///
/// Returns [`ThumbnailError::InvalidDuration`] if `duration` is not a
/// positive, finite number of seconds.
pub fn select_frame_time(duration: f64, requested: Option<f64>) -> Result<f64, ThumbnailError> {
    SelectionPolicy::Midpoint.resolve(duration, requested)
}

/// Clamp `seconds` into `[0, duration - 1]`, flooring at zero.
///
/// For videos shorter than [`END_OF_STREAM_MARGIN`] the upper bound is
/// negative, so the result is always `0`.
pub fn clamp_to_playable(seconds: f64, duration: f64) -> f64 {
    seconds
        .max(0.0)
        .min(duration - END_OF_STREAM_MARGIN)
        .max(0.0)
}
