//! Pixel <-> millimeter conversion at a fixed print/scan resolution.

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Resolution assumed when none is given.
pub const DEFAULT_DPI: f64 = 300.0;

/// Convert a pixel length to millimeters at `dpi` dots per inch.
#[inline]
pub fn pixels_to_millimeters(pixels: f64, dpi: f64) -> f64 {
    pixels / dpi * MM_PER_INCH
}

/// Inverse of [`pixels_to_millimeters`].
#[inline]
pub fn millimeters_to_pixels(millimeters: f64, dpi: f64) -> f64 {
    millimeters / MM_PER_INCH * dpi
}
