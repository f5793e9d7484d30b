use std::path::PathBuf;

/// Errors returned by the stone detector.
///
/// A photo in which no stone survives filtering is *not* an error; it yields
/// a report with a zero total.
#[derive(thiserror::Error, Debug)]
pub enum StoneDetectError {
    #[error("failed to load image {path}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write annotated image {path}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no reference object found")]
    NoReferenceFound,
    #[error("degenerate reference object ({width_px:.1} x {height_px:.1} px)")]
    DegenerateReference { width_px: f64, height_px: f64 },
    #[error("no calibration entry matches image {image}")]
    CalibrationNotFound { image: String },
    #[error("failed to load label font {path}: {reason}")]
    FontLoad { path: PathBuf, reason: String },
}
