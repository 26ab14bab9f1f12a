//! Decoder integration tests.
//!
//! These need `tests/fixtures/sample_video.mp4` and are skipped when it is
//! absent.

use std::path::Path;

use covershot::{
    FrameDecoder, ThumbnailError, ThumbnailOptions, ThumbnailSet, Thumbnailer, VideoHandle,
};
use ffmpeg_next::{codec::Id, media::Type};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn fixture() -> Option<&'static str> {
    Path::new(SAMPLE_VIDEO).exists().then_some(SAMPLE_VIDEO)
}

#[test]
fn metadata_is_populated() {
    let Some(path) = fixture() else { return };

    let handle = VideoHandle::open(path).expect("Failed to open test video");
    let metadata = handle.metadata();
    assert!(metadata.duration > 0.0);
    assert!(metadata.width > 0 && metadata.height > 0);
    assert!(!metadata.codec.is_empty());
    assert_eq!(handle.duration(), metadata.duration);
    assert_eq!(handle.path(), Path::new(path));
}

#[test]
fn frame_has_stream_dimensions() {
    let Some(path) = fixture() else { return };

    let mut handle = VideoHandle::open(path).expect("Failed to open test video");
    let (width, height) = (handle.metadata().width, handle.metadata().height);
    let midpoint = handle.duration() / 2.0;

    let frame = handle.frame_at(midpoint).expect("Failed to decode frame");
    assert_eq!(frame.dimensions(), (width, height));
}

#[test]
fn frames_at_start_and_last_second_decode() {
    let Some(path) = fixture() else { return };

    let mut handle = VideoHandle::open(path).expect("Failed to open test video");
    let last = (handle.duration() - 1.0).max(0.0);
    handle.frame_at(0.0).expect("Failed to decode first frame");
    handle.frame_at(last).expect("Failed to decode last playable frame");
}

#[test]
fn in_memory_and_file_agree() {
    let Some(path) = fixture() else { return };

    let bytes = std::fs::read(path).expect("Failed to read test video");
    let from_memory = VideoHandle::from_bytes(&bytes).expect("Failed to open from memory");
    let from_file = VideoHandle::open(path).expect("Failed to open test video");
    assert_eq!(from_memory.metadata().duration, from_file.metadata().duration);
    assert_eq!(from_memory.metadata().width, from_file.metadata().width);
}

#[test]
fn scratch_file_is_removed_on_drop() {
    let Some(path) = fixture() else { return };

    let bytes = std::fs::read(path).expect("Failed to read test video");
    let handle = VideoHandle::from_bytes(&bytes).expect("Failed to open from memory");
    let scratch = handle.path().to_path_buf();
    assert!(scratch.exists());

    drop(handle);
    assert!(!scratch.exists());
}

#[test]
fn extract_pair_from_file() {
    let Some(path) = fixture() else { return };

    let options = ThumbnailOptions::size(300, 140).with_ratio(2, 1);
    let extraction = Thumbnailer::extract_file(path, &options).expect("Failed to extract");

    let ThumbnailSet::Pair(small, wide) = &extraction.thumbnails else {
        panic!("expected a pair");
    };
    assert_eq!((small.width, small.height), (300, 140));
    let decoded = image::load_from_memory(&wide.bytes).expect("Failed to decode PNG");
    assert_eq!((decoded.width(), decoded.height()), (wide.width, wide.height));
    assert!(extraction.chosen_time <= (extraction.duration - 1.0).max(0.0));
}

#[test]
fn extract_from_bytes_uses_requested_second() {
    let Some(path) = fixture() else { return };

    let bytes = std::fs::read(path).expect("Failed to read test video");
    let duration = VideoHandle::from_bytes(&bytes)
        .expect("Failed to open from memory")
        .duration();
    if duration < 3.0 {
        return;
    }

    let options = ThumbnailOptions::size(64, 36).with_timestamp(1.4);
    let extraction = Thumbnailer::extract(&bytes, &options).expect("Failed to extract");
    assert_eq!(extraction.chosen_time, 1.0);
}

/// Copy the video stream of `input` into a Matroska file, moving every
/// timestamp `offset_seconds` later.
fn remux_with_offset(
    input: &Path,
    output: &Path,
    offset_seconds: i64,
) -> Result<(), ffmpeg_next::Error> {
    ffmpeg_next::init()?;
    let mut input_context = ffmpeg_next::format::input(&input)?;
    let mut output_context = ffmpeg_next::format::output(&output)?;

    let mut stream_map: Vec<Option<usize>> = Vec::new();
    for stream in input_context.streams() {
        if stream.parameters().medium() == Type::Video && stream_map.iter().all(Option::is_none) {
            let mut out_stream = output_context.add_stream(ffmpeg_next::encoder::find(Id::None))?;
            out_stream.set_parameters(stream.parameters());
            unsafe {
                (*out_stream.parameters().as_mut_ptr()).codec_tag = 0;
            }
            stream_map.push(Some(0));
        } else {
            stream_map.push(None);
        }
    }

    output_context.write_header()?;
    for (stream, mut packet) in input_context.packets() {
        let Some(output_index) = stream_map.get(stream.index()).copied().flatten() else {
            continue;
        };
        let input_time_base = stream.time_base();
        let shift = offset_seconds * i64::from(input_time_base.denominator())
            / i64::from(input_time_base.numerator());
        packet.set_pts(packet.pts().map(|pts| pts + shift));
        packet.set_dts(packet.dts().map(|dts| dts + shift));

        let output_time_base = output_context.stream(output_index).unwrap().time_base();
        packet.set_stream(output_index);
        packet.rescale_ts(input_time_base, output_time_base);
        packet.set_position(-1);
        packet.write_interleaved(&mut output_context)?;
    }
    output_context.write_trailer()?;
    Ok(())
}

#[test]
fn late_starting_stream_is_measured_from_its_start() {
    let Some(path) = fixture() else { return };

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let unshifted = directory.path().join("unshifted.mkv");
    let shifted = directory.path().join("shifted.mkv");
    remux_with_offset(Path::new(path), &unshifted, 0).expect("Failed to remux");
    remux_with_offset(Path::new(path), &shifted, 10).expect("Failed to remux");

    let mut reference = VideoHandle::open(&unshifted).expect("Failed to open remuxed video");
    let mut late = VideoHandle::open(&shifted).expect("Failed to open shifted video");
    let target = (reference.duration() / 2.0).floor();
    if target < 1.0 {
        return;
    }
    assert!((late.duration() - reference.duration()).abs() < 0.1);

    let expected = reference.frame_at(target).expect("Failed to decode reference frame");
    let actual = late.frame_at(target).expect("Failed to decode shifted frame");
    assert_eq!(actual.as_raw(), expected.as_raw());
}

#[test]
fn truncated_video_reports_a_decode_failure() {
    let Some(path) = fixture() else { return };

    let bytes = std::fs::read(path).expect("Failed to read test video");
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let truncated = directory.path().join("truncated.mp4");

    for keep in [bytes.len() / 50, bytes.len() / 4] {
        std::fs::write(&truncated, &bytes[..keep]).expect("Failed to write truncated video");
        let Ok(mut handle) = VideoHandle::open(&truncated) else {
            continue;
        };
        let midpoint = handle.duration() / 2.0;
        match handle.frame_at(midpoint) {
            Ok(frame) => assert!(frame.width() > 0),
            Err(error) => assert!(
                matches!(error, ThumbnailError::DecodeFailure { .. }),
                "expected a decode failure, got {error:?}"
            ),
        }
    }
}
