//! Batch driver: every configured photo in order, then the aggregate.

use std::io::Write;
use std::path::{Path, PathBuf};

use stone_sieve_detect::{StoneDetectError, StoneDetector};

use crate::io::{ImageReport, SieveIoError, SieveRunConfig, SieveRunReport};
use crate::report::{image_section, summary};
use crate::tally::SieveTally;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by a sieve run.
#[derive(thiserror::Error, Debug)]
pub enum SieveRunError {
    #[error("no images to analyze")]
    NoImages,

    #[error("{path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: StoneDetectError,
    },

    #[error(transparent)]
    Detect(#[from] StoneDetectError),

    #[error(transparent)]
    SieveIo(#[from] SieveIoError),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

/// A configured run with its detector built once.
#[derive(Debug)]
pub struct SieveRun {
    config: SieveRunConfig,
    detector: StoneDetector,
}

impl SieveRun {
    pub fn new(config: SieveRunConfig) -> Result<Self, SieveRunError> {
        if config.images.is_empty() {
            return Err(SieveRunError::NoImages);
        }
        let detector = config.build_detector()?;
        Ok(Self { config, detector })
    }

    pub fn config(&self) -> &SieveRunConfig {
        &self.config
    }

    pub fn detector(&self) -> &StoneDetector {
        &self.detector
    }

    /// Analyze one photo into its report entry.
    pub fn analyze_image(&self, image: &Path) -> Result<ImageReport, (ImageReport, StoneDetectError)> {
        let output = self.config.output_path(image);
        let mut entry = ImageReport::new(image, output.as_deref());
        match self.detector.analyze_path(image, output.as_deref()) {
            Ok(analysis) => {
                entry.set_analysis(analysis);
                Ok(entry)
            }
            Err(err) => {
                entry.set_error(&err);
                Err((entry, err))
            }
        }
    }

    /// Run every photo, writing the text report to `out`.
    ///
    /// Failing photos are recorded and skipped unless `fail_fast` is set.
    /// The JSON report is written to `report_path` when configured.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, out), fields(images = self.config.images.len()))
    )]
    pub fn run<W: Write>(&self, out: &mut W) -> Result<SieveRunReport, SieveRunError> {
        let mut images = Vec::with_capacity(self.config.images.len());
        let mut tally = SieveTally::new();

        for image in &self.config.images {
            let path = Path::new(image);
            let entry = match self.analyze_image(path) {
                Ok(entry) => {
                    if let Some(analysis) = &entry.analysis {
                        tally = tally.absorb(&analysis.report);
                    }
                    entry
                }
                Err((entry, err)) => {
                    log::error!("{}: {err}", path.display());
                    if self.config.fail_fast {
                        return Err(SieveRunError::Image {
                            path: path.to_path_buf(),
                            source: err,
                        });
                    }
                    tally = tally.record_failure();
                    entry
                }
            };
            write!(out, "{}", image_section(&entry))?;
            writeln!(out)?;
            images.push(entry);
        }

        write!(out, "{}", summary(&tally))?;
        log::info!(
            "{} stones in {} of {} images",
            tally.total(),
            tally.analyzed_images(),
            images.len()
        );

        let report = SieveRunReport { images, tally };
        if let Some(path) = self.config.report_path.as_deref() {
            report.write_json(path)?;
            log::info!("report written to {path}");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_list_is_rejected() {
        let err = SieveRun::new(SieveRunConfig::default()).unwrap_err();
        assert!(matches!(err, SieveRunError::NoImages));
    }

    #[test]
    fn bad_font_fails_before_any_image() {
        let cfg = SieveRunConfig {
            images: vec!["a.jpg".into()],
            font_path: Some("/no/such/font.ttf".into()),
            ..SieveRunConfig::default()
        };
        assert!(matches!(
            SieveRun::new(cfg),
            Err(SieveRunError::Detect(StoneDetectError::FontLoad { .. }))
        ));
    }

    #[test]
    fn missing_images_are_recorded_and_skipped() {
        let cfg = SieveRunConfig {
            images: vec!["/no/such/S101.jpg".into(), "/no/such/S102.jpg".into()],
            ..SieveRunConfig::default()
        };
        let mut out = Vec::new();
        let report = SieveRun::new(cfg).expect("run").run(&mut out).expect("report");

        assert_eq!(report.images.len(), 2);
        assert_eq!(report.failed().count(), 2);
        assert_eq!(report.tally.failed_images, 2);
        assert_eq!(report.tally.total(), 0);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Failed: failed to load image /no/such/S101.jpg"));
        assert!(text.contains("Total stones across all images: 0"));
    }

    #[test]
    fn fail_fast_stops_at_first_error() {
        let cfg = SieveRunConfig {
            images: vec!["/no/such/S101.jpg".into(), "/no/such/S102.jpg".into()],
            fail_fast: true,
            ..SieveRunConfig::default()
        };
        let mut out = Vec::new();
        let err = SieveRun::new(cfg).expect("run").run(&mut out).unwrap_err();
        match err {
            SieveRunError::Image { path, source } => {
                assert_eq!(path, PathBuf::from("/no/such/S101.jpg"));
                assert!(matches!(source, StoneDetectError::ImageLoad { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(out.is_empty());
    }
}
