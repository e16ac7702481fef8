//! Source directory scanning.
//!
//! First step of every publish run. Lists the picture source directory
//! (non-recursive), keeps the files whose extension is a supported picture
//! format, and returns them in a deterministic order.
//!
//! ## Supported Formats
//!
//! | Extension | Format |
//! |---|---|
//! | `.jpg`, `.jpeg` | JPEG |
//! | `.png` | PNG |
//! | `.gif` | GIF |
//! | `.bmp` | BMP |
//!
//! Extensions match case-insensitively (`DSC_0001.JPG` is a JPEG).
//! Everything else in the directory, including subdirectories, is ignored.
//!
//! ## Ordering
//!
//! Assets are sorted ascending by file name, ignoring case. Names that only
//! differ in case (`a.jpg` vs `A.jpg`, possible on case-sensitive file
//! systems) fall back to ordinal order so the result is total and stable
//! across runs.

use image::ImageFormat;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Picture directory is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Picture format, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureFormat {
    Jpeg,
    Bmp,
    Gif,
    Png,
}

const FORMAT_TABLE: &[(&str, PictureFormat)] = &[
    ("jpg", PictureFormat::Jpeg),
    ("jpeg", PictureFormat::Jpeg),
    ("bmp", PictureFormat::Bmp),
    ("gif", PictureFormat::Gif),
    ("png", PictureFormat::Png),
];

impl PictureFormat {
    /// Look up the format for a path's extension. `None` for anything outside
    /// the supported table.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        FORMAT_TABLE
            .iter()
            .find(|(candidate, _)| ext.eq_ignore_ascii_case(candidate))
            .map(|(_, format)| *format)
    }

    /// The `image` crate codec used to decode and re-encode this format.
    pub fn image_format(self) -> ImageFormat {
        match self {
            PictureFormat::Jpeg => ImageFormat::Jpeg,
            PictureFormat::Bmp => ImageFormat::Bmp,
            PictureFormat::Gif => ImageFormat::Gif,
            PictureFormat::Png => ImageFormat::Png,
        }
    }
}

/// A picture discovered in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureAsset {
    pub source_path: PathBuf,
    pub file_name: String,
    pub format: PictureFormat,
}

/// Scan the picture directory and return the supported pictures in
/// publishing order.
pub fn scan(picture_dir: &Path) -> Result<Vec<PictureAsset>, ScanError> {
    if !picture_dir.is_dir() {
        return Err(ScanError::NotADirectory(picture_dir.to_path_buf()));
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(picture_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        // Names that aren't UTF-8 can't be listed in the manifest.
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(format) = PictureFormat::from_path(entry.path()) else {
            continue;
        };
        assets.push(PictureAsset {
            source_path: entry.path().to_path_buf(),
            file_name: file_name.to_string(),
            format,
        });
    }

    assets.sort_by(|a, b| compare_file_names(&a.file_name, &b.file_name));
    Ok(assets)
}

/// Case-insensitive ascending order with an ordinal tie-break.
pub fn compare_file_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
