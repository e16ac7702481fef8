//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides the thumbnail geometry) and the [`backend`](super::backend)
//! (which does the actual pixel work). Keeping them separate lets the
//! pipeline run against a mock backend in tests.

use crate::scan::PictureFormat;

/// Parameters for a thumbnail operation (exact resize + re-encode).
///
/// The source is the already-read picture file, not a path: the pipeline
/// reads every picture once and uses the same bytes for the full-size copy
/// and the thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams<'a> {
    pub source: &'a [u8],
    /// Format of the source, also used for the output.
    pub format: PictureFormat,
    pub width: u32,
    pub height: u32,
}
