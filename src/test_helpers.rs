//! Shared test utilities for the galerie test suite.
//!
//! Fixture builders (real encoded pictures, throwaway run configs) and
//! tree inspection helpers for asserting on published output.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let config = run_config(tmp.path(), "Demo");
//! write_picture(&config.source, "a.jpg", 400, 200);
//! // ... publish ...
//! assert_eq!(list_files(&config.target.join("pics")), vec!["a.jpg", "galerie.txt", "tn_a.jpg"]);
//! ```

use crate::config::RunConfig;
use crate::scan::PictureFormat;
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use walkdir::WalkDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Encode a `width`×`height` gradient in `format`.
pub fn encode_test_image(width: u32, height: u32, format: PictureFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    let img = match format {
        PictureFormat::Gif => DynamicImage::ImageRgba8(DynamicImage::ImageRgb8(img).to_rgba8()),
        _ => DynamicImage::ImageRgb8(img),
    };
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format.image_format()).unwrap();
    buf.into_inner()
}

/// Write an encoded test picture to `dir/name`, format chosen by extension.
pub fn write_picture(dir: &Path, name: &str, width: u32, height: u32) {
    let format = PictureFormat::from_path(Path::new(name))
        .unwrap_or_else(|| panic!("{name} has no picture extension"));
    std::fs::write(dir.join(name), encode_test_image(width, height, format)).unwrap();
}

/// A run config rooted in `root`: an empty `root/source` and a not yet
/// existing `root/target`, delta publishing off.
pub fn run_config(root: &Path, title: &str) -> RunConfig {
    let source = root.join("source");
    std::fs::create_dir_all(&source).unwrap();
    RunConfig {
        source,
        target: root.join("target"),
        reference: None,
        delta: None,
        title: title.to_string(),
        assets_dir: None,
    }
}

// =========================================================================
// Tree inspection
// =========================================================================

/// Every regular file under `root`, as sorted `/`-separated relative paths.
///
/// A missing `root` lists as empty.
pub fn list_files(root: &Path) -> Vec<String> {
    if !root.exists() {
        return Vec::new();
    }
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}

/// Pixel dimensions of an encoded picture on disk.
pub fn picture_dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}
