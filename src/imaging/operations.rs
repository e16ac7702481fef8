//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take the picture bytes, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_thumbnail_dimensions;
use super::params::ThumbnailParams;
use crate::scan::PictureFormat;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// An encoded thumbnail ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Create a thumbnail whose longer edge is `max_edge`, encoded in the
/// source's own format.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &[u8],
    format: PictureFormat,
    max_edge: u32,
) -> Result<Thumbnail> {
    let dims = backend.identify(source, format)?;
    if dims.width == 0 || dims.height == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "Picture has no pixels ({}x{})",
            dims.width, dims.height
        )));
    }

    let (width, height) = calculate_thumbnail_dimensions((dims.width, dims.height), max_edge);
    let bytes = backend.thumbnail(&ThumbnailParams {
        source,
        format,
        width,
        height,
    })?;

    Ok(Thumbnail {
        bytes,
        width,
        height,
    })
}
