//! Output size planning.
//!
//! Width and height are rounded independently after scaling, so the output
//! aspect ratio can drift from the source by up to half a pixel per edge.
//!
//! Edges are not clamped to one pixel. A source whose short edge scales
//! below half a pixel (100000×10 at 1280 gives 1280×0) plans a zero-sized
//! geometry, and the run then fails with `TranscodeError::Context` when the
//! frame surface is allocated.

use crate::models::media::OutputGeometry;

/// Fit `source_width × source_height` inside a `max_dimension` square.
///
/// Returns the source size unchanged when it already fits.
pub fn plan_geometry(source_width: u32, source_height: u32, max_dimension: u32) -> OutputGeometry {
    let longest = source_width.max(source_height);
    if longest <= max_dimension {
        return OutputGeometry::new(source_width, source_height);
    }

    let scale = max_dimension as f64 / longest as f64;
    OutputGeometry::new(
        (source_width as f64 * scale).round() as u32,
        (source_height as f64 * scale).round() as u32,
    )
}

/// Source-to-output scale factor (1.0 when no downscale happens).
pub fn scale_factor(source_width: u32, source_height: u32, max_dimension: u32) -> f64 {
    let longest = source_width.max(source_height);
    if longest <= max_dimension || longest == 0 {
        return 1.0;
    }
    max_dimension as f64 / longest as f64
}
