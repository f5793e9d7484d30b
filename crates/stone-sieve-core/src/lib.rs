//! Core types and arithmetic for photographic stone size analysis.
//!
//! This crate is purely geometric. It does *not* depend on any image type or
//! vision library: contours arrive as point lists, and everything here is
//! rectangle fitting, unit conversion and sieve-class bookkeeping.

mod logger;
mod polygon;
mod rect;
mod sieve;
mod units;

pub use logger::{init_with_level, level_from_verbosity};
pub use polygon::polygon_area;
pub use rect::RotatedRect;
pub use sieve::{CategoryCounts, SieveClass, SCREEN_OPENINGS_MM};
pub use units::{millimeters_to_pixels, pixels_to_millimeters, DEFAULT_DPI, MM_PER_INCH};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;
