//! FFmpeg log level control.
//!
//! FFmpeg writes its own diagnostics to stderr, independently of the Rust
//! [`log`](https://crates.io/crates/log) facade used by this crate. The
//! helpers here tune that output without importing `ffmpeg-next` directly.
//!
//! ```no_run
//! use covershot::DecoderLogLevel;
//!
//! covershot::set_decoder_log_level(DecoderLogLevel::Error);
//! ```

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::ThumbnailError;

/// FFmpeg log verbosity, quietest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderLogLevel {
    /// No output at all.
    Quiet,
    /// Unrecoverable errors that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

impl From<DecoderLogLevel> for Level {
    fn from(level: DecoderLogLevel) -> Self {
        match level {
            DecoderLogLevel::Quiet => Level::Quiet,
            DecoderLogLevel::Panic => Level::Panic,
            DecoderLogLevel::Fatal => Level::Fatal,
            DecoderLogLevel::Error => Level::Error,
            DecoderLogLevel::Warning => Level::Warning,
            DecoderLogLevel::Info => Level::Info,
            DecoderLogLevel::Verbose => Level::Verbose,
            DecoderLogLevel::Debug => Level::Debug,
            DecoderLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for DecoderLogLevel {
    type Err = ThumbnailError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let level = match value.trim().to_ascii_lowercase().as_str() {
            "quiet" => DecoderLogLevel::Quiet,
            "panic" => DecoderLogLevel::Panic,
            "fatal" => DecoderLogLevel::Fatal,
            "error" => DecoderLogLevel::Error,
            "warning" | "warn" => DecoderLogLevel::Warning,
            "info" => DecoderLogLevel::Info,
            "verbose" => DecoderLogLevel::Verbose,
            "debug" => DecoderLogLevel::Debug,
            "trace" => DecoderLogLevel::Trace,
            other => {
                return Err(ThumbnailError::InvalidConfiguration(format!(
                    "unknown FFmpeg log level: {other}"
                )));
            }
        };
        Ok(level)
    }
}

/// Set FFmpeg's own log verbosity. Does not affect the `log` facade.
pub fn set_decoder_log_level(level: DecoderLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

/// FFmpeg's current log verbosity, or `None` if it is not one of the
/// standard levels.
pub fn decoder_log_level() -> Option<DecoderLogLevel> {
    let level = ffmpeg_next::util::log::get_level().ok()?;
    Some(match level {
        Level::Quiet => DecoderLogLevel::Quiet,
        Level::Panic => DecoderLogLevel::Panic,
        Level::Fatal => DecoderLogLevel::Fatal,
        Level::Error => DecoderLogLevel::Error,
        Level::Warning => DecoderLogLevel::Warning,
        Level::Info => DecoderLogLevel::Info,
        Level::Verbose => DecoderLogLevel::Verbose,
        Level::Debug => DecoderLogLevel::Debug,
        Level::Trace => DecoderLogLevel::Trace,
    })
}
