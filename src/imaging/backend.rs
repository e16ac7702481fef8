//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the publish
//! pipeline needs: identify (read dimensions) and thumbnail (resize and
//! re-encode). Both work on in-memory picture bytes.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::ThumbnailParams;
use crate::scan::PictureFormat;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Send` so a backend can move onto the publish worker thread.
pub trait ImageBackend: Send {
    /// Decode just enough of the picture to report its dimensions.
    fn identify(&self, source: &[u8], format: PictureFormat) -> Result<Dimensions, BackendError>;

    /// Decode, resize to exactly `width × height`, and encode in `format`.
    fn thumbnail(&self, params: &ThumbnailParams<'_>) -> Result<Vec<u8>, BackendError>;
}
