//! JSON run configuration and report helpers.

use crate::tally::SieveTally;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use stone_sieve_detect::{
    Annotator, CalibrationTable, ImageAnalysis, StoneDetectError, StoneDetector,
    StoneDetectorParams,
};

#[derive(thiserror::Error, Debug)]
pub enum SieveIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_output_suffix() -> String {
    "_output".to_string()
}

fn default_annotate() -> bool {
    true
}

/// Configuration for one sieve run over a list of photos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SieveRunConfig {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "CalibrationTable::legacy_sample1")]
    pub calibration: CalibrationTable,
    #[serde(default)]
    pub detector: StoneDetectorParams,
    /// Inserted before the extension of each input to name its annotated copy.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
    #[serde(default = "default_annotate")]
    pub annotate: bool,
    /// Label font replacing the bundled DejaVu Sans.
    #[serde(default)]
    pub font_path: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
    /// Abort on the first failing photo instead of recording the error.
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for SieveRunConfig {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            calibration: CalibrationTable::legacy_sample1(),
            detector: StoneDetectorParams::default(),
            output_suffix: default_output_suffix(),
            annotate: default_annotate(),
            font_path: None,
            report_path: None,
            fail_fast: false,
        }
    }
}

impl SieveRunConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SieveIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SieveIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Annotated image path for `image`, or `None` when annotation is off.
    pub fn output_path(&self, image: &Path) -> Option<PathBuf> {
        self.annotate
            .then(|| derive_output_path(image, &self.output_suffix))
    }

    /// Build a detector from this config, loading `font_path` if set.
    pub fn build_detector(&self) -> Result<StoneDetector, StoneDetectError> {
        let mut annotator = Annotator::new();
        if let Some(font) = self.font_path.as_deref() {
            annotator = annotator.with_font_file(font)?;
        }
        Ok(
            StoneDetector::new(self.detector.clone(), self.calibration.clone())
                .with_annotator(annotator),
        )
    }
}

/// Load a bare calibration table from JSON.
pub fn load_calibration_json(path: impl AsRef<Path>) -> Result<CalibrationTable, SieveIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// `dir/S101.jpg` + `_output` -> `dir/S101_output.jpg`. Paths without an
/// extension get the suffix appended.
pub fn derive_output_path(image: &Path, suffix: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match image.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    image.with_file_name(name)
}

/// Outcome for one photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    pub image_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub analysis: Option<ImageAnalysis>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ImageReport {
    pub fn new(image_path: &Path, output_path: Option<&Path>) -> Self {
        Self {
            image_path: image_path.to_string_lossy().into_owned(),
            output_path: output_path.map(|p| p.to_string_lossy().into_owned()),
            analysis: None,
            error: None,
        }
    }

    pub fn set_analysis(&mut self, analysis: ImageAnalysis) {
        self.analysis = Some(analysis);
        self.error = None;
    }

    /// Record a failure; no annotated image exists for a failed photo.
    pub fn set_error(&mut self, err: &StoneDetectError) {
        self.error = Some(error_chain(err));
        self.output_path = None;
    }

    pub fn stone_total(&self) -> usize {
        self.analysis.as_ref().map_or(0, |a| a.report.total())
    }
}

/// Whole-run report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SieveRunReport {
    pub images: Vec<ImageReport>,
    pub tally: SieveTally,
}

impl SieveRunReport {
    pub fn failed(&self) -> impl Iterator<Item = &ImageReport> {
        self.images.iter().filter(|r| r.error.is_some())
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SieveIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SieveIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}
