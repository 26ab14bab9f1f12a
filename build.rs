use std::{env, path::PathBuf};

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "PKG_CONFIG_PATH", "VCPKG_ROOT", "VCPKGRS_TRIPLET"];

fn warn(message: &str) {
    println!("cargo:warning={message}");
}

/// Locate a vcpkg FFmpeg install for the target triplet, if any.
fn vcpkg_ffmpeg_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let dir = PathBuf::from(root).join("installed").join(triplet);
    dir.join("include").join("libavcodec").is_dir().then_some(dir)
}

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // Elsewhere pkg-config finds FFmpeg without help.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match vcpkg_ffmpeg_dir() {
        Some(dir) => warn(&format!(
            "FFMPEG_DIR is unset; found FFmpeg under {}. Export FFMPEG_DIR={} to use it explicitly.",
            dir.display(),
            dir.display()
        )),
        None => warn(
            "FFMPEG_DIR is unset and no vcpkg FFmpeg was found. Install ffmpeg with vcpkg or point FFMPEG_DIR at an FFmpeg build.",
        ),
    }
}
