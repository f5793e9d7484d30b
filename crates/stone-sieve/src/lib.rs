//! High-level facade for sieve-style stone size analysis.
//!
//! Re-exports the core geometry/classification crate and the image pipeline,
//! and adds the batch driver used by the `stone-sieve` binary:
//!
//! - [`SieveRunConfig`]: JSON run configuration (images, calibration table,
//!   detector parameters, output options);
//! - [`SieveRun`]: analyzes every photo in order and prints per-image tables;
//! - [`SieveTally`]: explicit cross-image accumulator folded over the
//!   per-image reports;
//! - [`SieveRunReport`]: machine-readable run report.
//!
//! ## Quickstart
//!
//! ```no_run
//! use stone_sieve::{SieveRun, SieveRunConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SieveRunConfig {
//!     images: vec!["sample1/S101.jpg".into(), "sample1/S102.jpg".into()],
//!     ..SieveRunConfig::default()
//! };
//! let report = SieveRun::new(config)?.run(&mut std::io::stdout())?;
//! println!("{} stones", report.tally.total());
//! # Ok(())
//! # }
//! ```

pub use stone_sieve_core as core;
pub use stone_sieve_detect as detect;

pub use stone_sieve_core::{CategoryCounts, RotatedRect, SieveClass};
pub use stone_sieve_detect::{
    CalibrationTable, ImageAnalysis, StoneDetectError, StoneDetector, StoneDetectorParams,
    StoneRecord, StoneReport,
};

pub mod io;
pub mod report;
mod run;
mod tally;

pub use io::{
    derive_output_path, load_calibration_json, ImageReport, SieveIoError, SieveRunConfig,
    SieveRunReport,
};
pub use run::{SieveRun, SieveRunError};
pub use tally::{aggregate, CategoryRow, SieveTally};
