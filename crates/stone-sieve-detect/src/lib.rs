//! Stone measurement on photographs with a reference object.
//!
//! Pipeline per photo:
//! 1. grayscale, Gaussian blur, Canny edges, optional dilation;
//! 2. external contours, each reduced to its area and minimum-area rectangle;
//! 3. pick the reference contour ([`ReferenceStrategy`]);
//! 4. drop noise (area at or below `min_contour_area`) and the reference;
//! 5. scale each rectangle against the reference ([`ScaleModel`]), apply the
//!    image's calibration coefficients ([`CalibrationTable`]) and classify
//!    the shortest width into a sieve class;
//! 6. optionally draw boxes and labels onto a copy of the photo.
//!
//! ## Quickstart
//!
//! ```no_run
//! use stone_sieve_detect::{CalibrationTable, StoneDetector, StoneDetectorParams};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = StoneDetector::new(
//!     StoneDetectorParams::default(),
//!     CalibrationTable::legacy_sample1(),
//! );
//! let analysis = detector.analyze_path(Path::new("S101.jpg"), None)?;
//! println!("stones: {}", analysis.report.total());
//! # Ok(())
//! # }
//! ```

mod annotate;
mod calibration;
mod contours;
mod detector;
mod error;
mod params;
mod reference;
mod stones;

pub use annotate::Annotator;
pub use calibration::{
    CalibrationEntry, CalibrationTable, ImageCalibration, MissingCalibrationPolicy, ScaleModel,
};
pub use contours::{contour_shape, edge_map, external_contours, extract_shapes, ContourShape};
pub use detector::{load_rgb, save_rgb, ImageAnalysis, StoneDetector};
pub use error::StoneDetectError;
pub use params::{EdgeParams, StoneDetectorParams};
pub use reference::{locate_reference, Reference, ReferenceDimensions, ReferenceStrategy};
pub use stones::{measure_shapes, StoneRecord, StoneReport};
