//! Per-image pipeline: load -> contours -> reference -> stones -> annotation.

use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::annotate::Annotator;
use crate::calibration::{CalibrationTable, ImageCalibration};
use crate::contours::{extract_shapes, ContourShape};
use crate::error::StoneDetectError;
use crate::params::StoneDetectorParams;
use crate::reference::{locate_reference, Reference};
use crate::stones::{measure_shapes, StoneReport};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Everything measured in one photo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub reference: Reference,
    pub calibration: ImageCalibration,
    pub report: StoneReport,
}

/// Stone detector bound to a parameter set and a calibration table.
#[derive(Debug)]
pub struct StoneDetector {
    params: StoneDetectorParams,
    calibration: CalibrationTable,
    annotator: Annotator,
}

impl StoneDetector {
    pub fn new(params: StoneDetectorParams, calibration: CalibrationTable) -> Self {
        Self {
            params,
            calibration,
            annotator: Annotator::default(),
        }
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn params(&self) -> &StoneDetectorParams {
        &self.params
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// External contours of a color image.
    pub fn shapes(&self, image: &RgbImage) -> Vec<ContourShape> {
        let gray = image::imageops::grayscale(image);
        extract_shapes(&gray, &self.params.edges)
    }

    /// Locate the reference object in the photo at `path`.
    pub fn find_reference_dimensions(&self, path: &Path) -> Result<Reference, StoneDetectError> {
        let image = load_rgb(path)?;
        locate_reference(&self.shapes(&image), &self.params.reference)
    }

    /// Measure the stones in the photo at `path` against `reference`,
    /// writing the annotated photo to `output_path` when given.
    pub fn measure_stones(
        &self,
        path: &Path,
        reference: &Reference,
        output_path: Option<&Path>,
    ) -> Result<StoneReport, StoneDetectError> {
        let image = load_rgb(path)?;
        let shapes = self.shapes(&image);
        let (_, report) = self.measure(&shapes, reference, &path.to_string_lossy())?;
        if let Some(out) = output_path {
            save_rgb(&self.annotator.annotate(&image, &report.stones), out)?;
        }
        Ok(report)
    }

    /// Measure already extracted shapes; `image_id` selects the calibration.
    pub fn measure(
        &self,
        shapes: &[ContourShape],
        reference: &Reference,
        image_id: &str,
    ) -> Result<(ImageCalibration, StoneReport), StoneDetectError> {
        let calibration = self.calibration.resolve(image_id)?;
        let report = measure_shapes(
            shapes,
            reference,
            &self.params.scale,
            &calibration,
            self.params.min_contour_area,
        );
        Ok((calibration, report))
    }

    /// Full analysis of an in-memory photo. Contours are extracted once and
    /// shared between the reference locator and the stone measurer.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image), fields(width = image.width(), height = image.height()))
    )]
    pub fn analyze(
        &self,
        image: &RgbImage,
        image_id: &str,
    ) -> Result<ImageAnalysis, StoneDetectError> {
        let shapes = self.shapes(image);
        let reference = locate_reference(&shapes, &self.params.reference)?;
        let (calibration, report) = self.measure(&shapes, &reference, image_id)?;
        Ok(ImageAnalysis {
            reference,
            calibration,
            report,
        })
    }

    /// Load, analyze and optionally write the annotated photo.
    pub fn analyze_path(
        &self,
        path: &Path,
        output_path: Option<&Path>,
    ) -> Result<ImageAnalysis, StoneDetectError> {
        log::info!("analyzing {}", path.display());
        let image = load_rgb(path)?;
        let analysis = self.analyze(&image, &path.to_string_lossy())?;
        if let Some(out) = output_path {
            save_rgb(&self.annotator.annotate(&image, &analysis.report.stones), out)?;
            log::info!("annotated image written to {}", out.display());
        }
        Ok(analysis)
    }
}

/// Decode any format `image` supports into 8-bit RGB.
pub fn load_rgb(path: &Path) -> Result<RgbImage, StoneDetectError> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| StoneDetectError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Encode by file extension.
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<(), StoneDetectError> {
    image.save(path).map_err(|source| StoneDetectError::ImageSave {
        path: path.to_path_buf(),
        source,
    })
}
