use std::{path::PathBuf, time::Duration};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use colored::Colorize;
use covershot::{
    DecoderLogLevel, DefaultSourceProvider, DirectorySink, ImageFormat, SelectionPolicy,
    SourceProvider, ThumbnailOptions, ThumbnailSink, Thumbnailer, VideoHandle, VideoSource,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  covershot extract input.mp4 --out thumbnails\n  covershot extract https://example.com/clip.mp4 --out thumbnails --size 300x140 --ratio 2:1 --timestamp 0:12\n  covershot list thumbnails --json\n  covershot info input.mp4\n  covershot completions zsh > _covershot";

#[derive(Debug, Parser)]
#[command(
    name = "covershot",
    version,
    about = "Cut cover thumbnails out of videos",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a spinner while fetching and decoding.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Middle of the video.
    Midpoint,
    /// Uniformly random time.
    Random,
    /// Uniformly random whole second.
    RandomSecond,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract thumbnails from a video and store them.
    #[command(
        about = "Extract and store thumbnails",
        after_help = "Examples:\n  covershot extract input.mp4 --out thumbnails\n  covershot extract input.mp4 --out thumbnails --ratio 16:9 --format jpg --quality 90"
    )]
    Extract {
        /// Input video path or URL.
        input: String,
        /// Output directory.
        #[arg(long)]
        out: PathBuf,
        /// Fixed thumbnail size, WIDTHxHEIGHT.
        #[arg(long, value_parser = parse_size)]
        size: Option<(u32, u32)>,
        /// Aspect ratio crop, W:H.
        #[arg(long, value_parser = parse_ratio)]
        ratio: Option<(u32, u32)>,
        /// Requested time: seconds, mm:ss, or hh:mm:ss.
        #[arg(long, value_parser = parse_timecode, allow_hyphen_values = true)]
        timestamp: Option<f64>,
        /// Output image format (png, jpg).
        #[arg(long, default_value = "png")]
        format: String,
        /// JPEG quality, 1-100.
        #[arg(long)]
        quality: Option<u8>,
        /// How to pick a frame when no timestamp is given.
        #[arg(long, value_enum, default_value = "midpoint")]
        policy: PolicyArg,
        /// Seed for the random policies.
        #[arg(long)]
        seed: Option<u64>,
        /// File name stem.
        #[arg(long)]
        stem: Option<String>,
        /// Timeout for remote fetches, in seconds.
        #[arg(long)]
        timeout: Option<u64>,
        /// Print the stored record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List stored thumbnails, newest first.
    #[command(about = "List stored thumbnails")]
    List {
        /// Directory written by `extract`.
        dir: PathBuf,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print video metadata.
    #[command(about = "Print video metadata", visible_alias = "meta")]
    Info {
        /// Input video path or URL.
        input: String,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_dimensions(value: &str, separators: &[char]) -> Result<(u32, u32), String> {
    let (width, height) = value
        .trim()
        .split_once(separators)
        .ok_or_else(|| format!("expected two numbers separated by {separators:?}: {value}"))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid width {width:?}: {error}"))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid height {height:?}: {error}"))?;
    if width == 0 || height == 0 {
        return Err(format!("dimensions must be positive: {value}"));
    }
    Ok((width, height))
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    parse_dimensions(value, &['x', 'X'])
}

fn parse_ratio(value: &str) -> Result<(u32, u32), String> {
    parse_dimensions(value, &[':', '/'])
}

/// Seconds, `mm:ss`, or `hh:mm:ss`. Negative seconds are accepted; the
/// library ignores out-of-range times.
fn parse_timecode(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time value cannot be empty".to_string());
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() {
            return Err(format!("invalid time: {trimmed}"));
        }
        return Ok(seconds);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => ("0", *minutes, *seconds),
        [hours, minutes, seconds] => (*hours, *minutes, *seconds),
        _ => return Err(format!("invalid time format: {trimmed}")),
    };

    let hours = hours
        .parse::<u64>()
        .map_err(|_| format!("invalid hours in {trimmed}"))?;
    let minutes = minutes
        .parse::<u64>()
        .map_err(|_| format!("invalid minutes in {trimmed}"))?;
    let seconds = seconds
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
        .ok_or_else(|| format!("invalid seconds in {trimmed}"))?;

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

fn selection_policy(policy: PolicyArg, seed: Option<u64>) -> SelectionPolicy {
    let seed = seed.unwrap_or_else(rand::random);
    match policy {
        PolicyArg::Midpoint => SelectionPolicy::Midpoint,
        PolicyArg::Random => SelectionPolicy::Random { seed },
        PolicyArg::RandomSecond => SelectionPolicy::RandomWholeSecond { seed },
    }
}

fn image_format(
    format: &str,
    quality: Option<u8>,
) -> Result<ImageFormat, Box<dyn std::error::Error>> {
    let parsed: ImageFormat = format.parse()?;
    match (parsed, quality) {
        (ImageFormat::Jpeg { .. }, Some(quality)) => Ok(ImageFormat::Jpeg { quality }),
        (ImageFormat::Png, Some(_)) => {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                "--quality only applies to jpg output".yellow()
            );
            Ok(parsed)
        }
        _ => Ok(parsed),
    }
}

fn init_logging(global: &GlobalOptions) {
    let level = if global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(global);
    if let Some(level) = &global.log_level {
        let parsed: DecoderLogLevel = level.parse()?;
        covershot::set_decoder_log_level(parsed);
    }
    Ok(())
}

fn spinner(
    global: &GlobalOptions,
    message: &str,
) -> Result<Option<ProgressBar>, Box<dyn std::error::Error>> {
    if !global.progress {
        return Ok(None);
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(Some(bar))
}

fn provider(timeout: Option<u64>) -> DefaultSourceProvider {
    match timeout {
        Some(seconds) => DefaultSourceProvider::new().with_timeout(Duration::from_secs(seconds)),
        None => DefaultSourceProvider::new(),
    }
}

fn open_input(input: &str) -> Result<VideoHandle, Box<dyn std::error::Error>> {
    match VideoSource::parse(input) {
        VideoSource::Path(path) => Ok(VideoHandle::open(path)?),
        source => {
            let bytes = DefaultSourceProvider::new().fetch(&source)?;
            Ok(VideoHandle::from_bytes(&bytes)?)
        }
    }
}

fn format_time(seconds: Option<f64>) -> String {
    seconds.map_or_else(|| "?".to_string(), |seconds| format!("{seconds:.2}s"))
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Extract {
            input,
            out,
            size,
            ratio,
            timestamp,
            format,
            quality,
            policy,
            seed,
            stem,
            timeout,
            json,
        } => {
            let mut options = match (size, ratio) {
                (None, None) => ThumbnailOptions::new(),
                (target_size, target_ratio) => ThumbnailOptions {
                    target_size,
                    target_ratio,
                    ..ThumbnailOptions::new()
                },
            }
            .with_format(image_format(&format, quality)?)
            .with_policy(selection_policy(policy, seed));
            if let Some(seconds) = timestamp {
                options = options.with_timestamp(seconds);
            }

            let source = VideoSource::parse(&input);
            let progress = spinner(&cli.global, &format!("extracting from {source}"))?;
            let result = Thumbnailer::extract_from_source(&source, &provider(timeout), &options);
            if let Some(bar) = &progress {
                bar.finish_and_clear();
            }
            let extraction = result?;

            let mut sink = DirectorySink::new(&out);
            if let Some(stem) = stem {
                sink = sink.with_stem(stem);
            }
            let record = sink.store(&source, &extraction)?;

            if json {
                let payload = json!({
                    "id": record.id,
                    "source": record.source,
                    "duration": extraction.duration,
                    "chosen_time": extraction.chosen_time,
                    "files": record
                        .files
                        .iter()
                        .map(|path| path.display().to_string())
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "duration {:.2}s, chosen time {:.2}s",
                    extraction.duration, extraction.chosen_time
                );
                for path in &record.files {
                    println!("{} {}", "saved".green().bold(), path.display());
                }
            }
        }
        Commands::List { dir, json } => {
            let records = DirectorySink::new(&dir).list()?;
            if json {
                let payload: Vec<_> = records
                    .iter()
                    .map(|record| {
                        json!({
                            "id": record.id,
                            "source": record.source,
                            "duration": record.duration,
                            "chosen_time": record.chosen_time,
                            "files": record
                                .files
                                .iter()
                                .map(|path| path.display().to_string())
                                .collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if records.is_empty() {
                println!("no thumbnails in {}", dir.display());
            } else {
                for record in &records {
                    let label = record
                        .id
                        .map_or_else(|| "-".to_string(), |id| format!("#{id}"));
                    println!(
                        "{} {} at {} of {}",
                        label.cyan().bold(),
                        record.source.as_deref().unwrap_or("(unknown source)"),
                        format_time(record.chosen_time),
                        format_time(record.duration)
                    );
                    for path in &record.files {
                        println!("    {}", path.display());
                    }
                }
            }
        }
        Commands::Info { input, json } => {
            let progress = spinner(&cli.global, &format!("probing {input}"))?;
            let result = open_input(&input);
            if let Some(bar) = &progress {
                bar.finish_and_clear();
            }
            let handle = result?;
            let metadata = handle.metadata();

            if json {
                let payload = json!({
                    "duration_seconds": metadata.duration,
                    "width": metadata.width,
                    "height": metadata.height,
                    "frames_per_second": metadata.frames_per_second,
                    "codec": metadata.codec,
                    "format": metadata.format,
                    "stream_index": metadata.stream_index,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!("Duration: {:.2}s", metadata.duration);
                println!(
                    "Video: {}x{} @ {:.2} fps ({})",
                    metadata.width, metadata.height, metadata.frames_per_second, metadata.codec
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "covershot", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
