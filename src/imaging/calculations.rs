//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Longer edge of every thumbnail, in pixels.
pub const THUMBNAIL_MAX_EDGE: u32 = 200;

/// Calculate thumbnail dimensions that fit `max_edge` while preserving the
/// source aspect ratio.
///
/// The longer side becomes `max_edge`; the shorter side is scaled and
/// rounded to the nearest pixel. Square sources map to `max_edge × max_edge`.
/// Sources smaller than `max_edge` are scaled up.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height), both non-zero
/// * `max_edge` - Target size of the longer edge
///
/// # Returns
/// * `(width, height)` - Thumbnail dimensions, each at least 1
///
/// # Examples
/// ```
/// # use galerie::imaging::calculate_thumbnail_dimensions;
/// // 400x200 landscape → 200x100
/// assert_eq!(calculate_thumbnail_dimensions((400, 200), 200), (200, 100));
///
/// // 100x100 square → 200x200
/// assert_eq!(calculate_thumbnail_dimensions((100, 100), 200), (200, 200));
/// ```
pub fn calculate_thumbnail_dimensions(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (src_w, src_h) = source;

    let (w, h) = if src_w > src_h {
        // Landscape: width is the long edge
        let h = (max_edge as f64 * src_h as f64 / src_w as f64).round() as u32;
        (max_edge, h)
    } else {
        // Portrait or square: height is the long edge
        let w = (max_edge as f64 * src_w as f64 / src_h as f64).round() as u32;
        (w, max_edge)
    };

    // Extreme panoramas would otherwise round the short edge down to zero
    (w.max(1), h.max(1))
}
