//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, GIF, BMP) | `image::ImageReader::with_guessed_format` + `decode` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | `image::DynamicImage::write_to` in the source format |
//!
//! The decoder is chosen from the picture's content; the extension is only a
//! fallback when the content has no recognizable signature. The encoder
//! always follows the extension, so a PNG saved as `.jpg` gets a JPEG
//! thumbnail.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ThumbnailParams;
use crate::scan::PictureFormat;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader with the format sniffed from `source`, or `fallback` when unknown.
fn reader(
    source: &[u8],
    fallback: PictureFormat,
) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    let mut reader = ImageReader::new(Cursor::new(source)).with_guessed_format()?;
    if reader.format().is_none() {
        reader.set_format(fallback.image_format());
    }
    Ok(reader)
}

fn decode(source: &[u8], fallback: PictureFormat) -> Result<DynamicImage, BackendError> {
    reader(source, fallback)?
        .decode()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode picture: {e}")))
}

/// Convert to a color type the target encoder accepts.
fn encodable(img: DynamicImage, format: PictureFormat) -> DynamicImage {
    match format {
        PictureFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        PictureFormat::Gif => DynamicImage::ImageRgba8(img.to_rgba8()),
        PictureFormat::Bmp if img.color().has_alpha() => DynamicImage::ImageRgba8(img.to_rgba8()),
        PictureFormat::Bmp => DynamicImage::ImageRgb8(img.to_rgb8()),
        PictureFormat::Png => img,
    }
}

fn encode(img: &DynamicImage, format: PictureFormat) -> Result<Vec<u8>, BackendError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format.image_format())
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to encode thumbnail: {e}")))?;
    Ok(out.into_inner())
}

impl ImageBackend for RustBackend {
    fn identify(&self, source: &[u8], format: PictureFormat) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(source, format)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {e}"))
        })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams<'_>) -> Result<Vec<u8>, BackendError> {
        let img = decode(params.source, params.format)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        encode(&encodable(resized, params.format), params.format)
    }
}
