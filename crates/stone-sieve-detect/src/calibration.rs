//! Pixel-to-millimeter scaling and per-image calibration coefficients.
//!
//! Measuring a stone is two steps. First the [`ScaleModel`] turns the
//! rectangle sides into uncalibrated lengths, by default
//! `side / reference_side * side_scale`. Then the [`CalibrationTable`] entry
//! matching the image multiplies each length by its own coefficient.

use serde::{Deserialize, Serialize};
use stone_sieve_core::{pixels_to_millimeters, RotatedRect};

use crate::error::StoneDetectError;
use crate::reference::ReferenceDimensions;

fn default_side_scale() -> f64 {
    2.0
}

/// How rectangle sides in pixels become lengths before calibration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleModel {
    /// `longer / reference.width_px * side_scale` and
    /// `shorter / reference.height_px * side_scale`.
    ReferenceRatio {
        #[serde(default = "default_side_scale")]
        side_scale: f64,
    },
    /// Sides converted at a fixed resolution; the reference only marks the
    /// contour to skip.
    Dpi { dpi: f64 },
}

impl Default for ScaleModel {
    fn default() -> Self {
        ScaleModel::ReferenceRatio {
            side_scale: default_side_scale(),
        }
    }
}

impl ScaleModel {
    /// `(from longer side, from shorter side)` before calibration.
    pub fn scale(&self, rect: &RotatedRect, reference: &ReferenceDimensions) -> (f64, f64) {
        let longer = rect.long_side();
        let shorter = rect.short_side();
        match *self {
            ScaleModel::ReferenceRatio { side_scale } => (
                longer / reference.width_px * side_scale,
                shorter / reference.height_px * side_scale,
            ),
            ScaleModel::Dpi { dpi } => (
                pixels_to_millimeters(longer, dpi),
                pixels_to_millimeters(shorter, dpi),
            ),
        }
    }
}

/// Coefficients for images whose identifier contains `pattern`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub pattern: String,
    /// Multiplier for the length derived from the longer side.
    pub long_coefficient: f64,
    /// Multiplier for the length derived from the shorter side.
    pub short_coefficient: f64,
}

impl CalibrationEntry {
    pub fn new(pattern: impl Into<String>, long_coefficient: f64, short_coefficient: f64) -> Self {
        Self {
            pattern: pattern.into(),
            long_coefficient,
            short_coefficient,
        }
    }
}

/// What to do with an image no entry matches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCalibrationPolicy {
    /// Report the scaled lengths as they are, unrounded.
    #[default]
    Uncalibrated,
    /// Fail the image with [`StoneDetectError::CalibrationNotFound`].
    Reject,
}

fn default_round_decimals() -> Option<u32> {
    Some(1)
}

/// Ordered calibration entries; the first matching pattern wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    #[serde(default)]
    pub entries: Vec<CalibrationEntry>,
    /// Calibrated lengths are rounded to this many decimals.
    #[serde(default = "default_round_decimals")]
    pub round_decimals: Option<u32>,
    #[serde(default)]
    pub on_missing: MissingCalibrationPolicy,
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            round_decimals: default_round_decimals(),
            on_missing: MissingCalibrationPolicy::default(),
        }
    }
}

impl CalibrationTable {
    pub fn new(entries: Vec<CalibrationEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Coefficients fitted for the `S101`..`S103` sample photo series.
    pub fn legacy_sample1() -> Self {
        Self::new(vec![
            CalibrationEntry::new("S101", 16.1500, 16.9000),
            CalibrationEntry::new("S102", 13.5053, 11.6684),
            CalibrationEntry::new("S103", 10.8478, 14.5800),
        ])
    }

    pub fn with_policy(mut self, on_missing: MissingCalibrationPolicy) -> Self {
        self.on_missing = on_missing;
        self
    }

    /// First entry whose pattern is a substring of `image_id`.
    pub fn lookup(&self, image_id: &str) -> Option<&CalibrationEntry> {
        self.entries
            .iter()
            .find(|e| !e.pattern.is_empty() && image_id.contains(e.pattern.as_str()))
    }

    /// Calibration to apply to every stone of `image_id`.
    pub fn resolve(&self, image_id: &str) -> Result<ImageCalibration, StoneDetectError> {
        match self.lookup(image_id) {
            Some(entry) => {
                log::debug!("calibration '{}' matches {}", entry.pattern, image_id);
                Ok(ImageCalibration {
                    entry: Some(entry.clone()),
                    round_decimals: self.round_decimals,
                })
            }
            None => match self.on_missing {
                MissingCalibrationPolicy::Uncalibrated => {
                    log::warn!(
                        "no calibration entry matches {}; reporting uncalibrated lengths",
                        image_id
                    );
                    Ok(ImageCalibration::uncalibrated())
                }
                MissingCalibrationPolicy::Reject => Err(StoneDetectError::CalibrationNotFound {
                    image: image_id.to_string(),
                }),
            },
        }
    }
}

/// Calibration resolved for one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageCalibration {
    pub entry: Option<CalibrationEntry>,
    pub round_decimals: Option<u32>,
}

impl ImageCalibration {
    pub fn uncalibrated() -> Self {
        Self {
            entry: None,
            round_decimals: None,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.entry.is_some()
    }

    /// Apply the coefficients to `(from longer side, from shorter side)`.
    /// Without an entry the values pass through untouched.
    pub fn apply(&self, long_len: f64, short_len: f64) -> (f64, f64) {
        let Some(entry) = &self.entry else {
            return (long_len, short_len);
        };
        let round = |v: f64| match self.round_decimals {
            Some(d) => round_to(v, d),
            None => v,
        };
        (
            round(long_len * entry.long_coefficient),
            round(short_len * entry.short_coefficient),
        )
    }
}

/// Half-way values go to the even neighbour: 0.25 -> 0.2, 0.75 -> 0.8.
fn round_to(v: f64, decimals: u32) -> f64 {
    let f = 10f64.powi(decimals as i32);
    (v * f).round_ties_even() / f
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn rect(w: f64, h: f64) -> RotatedRect {
        RotatedRect {
            center: Point2::new(0.0, 0.0),
            width: w,
            height: h,
            angle: 0.0,
        }
    }

    const REF: ReferenceDimensions = ReferenceDimensions {
        width_px: 100.0,
        height_px: 50.0,
    };

    #[test]
    fn reference_ratio_uses_side_scale() {
        let (d1, d2) = ScaleModel::default().scale(&rect(20.0, 40.0), &REF);
        assert_relative_eq!(d1, 40.0 / 100.0 * 2.0);
        assert_relative_eq!(d2, 20.0 / 50.0 * 2.0);

        let unit = ScaleModel::ReferenceRatio { side_scale: 1.0 };
        let (d1, d2) = unit.scale(&rect(20.0, 40.0), &REF);
        assert_relative_eq!(d1, 0.4);
        assert_relative_eq!(d2, 0.4);
    }

    #[test]
    fn dpi_model_ignores_reference_size() {
        let (d1, d2) = ScaleModel::Dpi { dpi: 300.0 }.scale(&rect(300.0, 150.0), &REF);
        assert_relative_eq!(d1, 25.4);
        assert_relative_eq!(d2, 12.7);
    }

    #[test]
    fn legacy_table_matches_by_substring() {
        let table = CalibrationTable::legacy_sample1();
        assert_eq!(
            table.lookup("C:/stones/sample1/S102.jpg").map(|e| e.long_coefficient),
            Some(13.5053)
        );
        assert_eq!(
            table.lookup("/data/S103_output.jpg").map(|e| e.short_coefficient),
            Some(14.58)
        );
        assert!(table.lookup("/data/S104.jpg").is_none());
    }

    #[test]
    fn first_matching_entry_wins() {
        let table = CalibrationTable::new(vec![
            CalibrationEntry::new("S1", 1.0, 1.0),
            CalibrationEntry::new("S101", 2.0, 2.0),
        ]);
        assert_eq!(table.lookup("S101.jpg").map(|e| e.long_coefficient), Some(1.0));
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let table = CalibrationTable::new(vec![CalibrationEntry::new("", 3.0, 3.0)]);
        assert!(table.lookup("anything.jpg").is_none());
    }

    #[test]
    fn calibrated_values_are_multiplied_and_rounded() {
        let cal = CalibrationTable::legacy_sample1()
            .resolve("S101.jpg")
            .expect("resolve");
        assert!(cal.is_calibrated());
        let (d1, d2) = cal.apply(1.03, 1.0);
        assert_relative_eq!(d1, 16.6);
        assert_relative_eq!(d2, 16.9);
    }

    #[test]
    fn exact_halves_round_to_even() {
        let cal = CalibrationTable::new(vec![CalibrationEntry::new("S1", 1.0, 1.0)])
            .resolve("S1.jpg")
            .expect("resolve");
        assert_eq!(cal.apply(0.25, 0.75), (0.2, 0.8));
        assert_eq!(cal.apply(1.25, 2.5), (1.2, 2.5));
        assert_eq!(cal.apply(-0.25, 0.26), (-0.2, 0.3));
    }

    #[test]
    fn missing_entry_passes_values_through() {
        let cal = CalibrationTable::legacy_sample1()
            .resolve("other.jpg")
            .expect("resolve");
        assert!(!cal.is_calibrated());
        assert_eq!(cal.apply(0.123456, 0.654321), (0.123456, 0.654321));
    }

    #[test]
    fn reject_policy_fails_unknown_images() {
        let table =
            CalibrationTable::legacy_sample1().with_policy(MissingCalibrationPolicy::Reject);
        let err = table.resolve("other.jpg").unwrap_err();
        assert!(matches!(err, StoneDetectError::CalibrationNotFound { ref image } if image == "other.jpg"));
        assert!(table.resolve("S103.jpg").is_ok());
    }

    #[test]
    fn table_json_defaults() {
        let table: CalibrationTable = serde_json::from_str(
            r#"{"entries": [{"pattern": "S7", "long_coefficient": 2.0, "short_coefficient": 3.0}]}"#,
        )
        .expect("parse");
        assert_eq!(table.round_decimals, Some(1));
        assert_eq!(table.on_missing, MissingCalibrationPolicy::Uncalibrated);
        assert_eq!(table.entries.len(), 1);

        let scale: ScaleModel =
            serde_json::from_str(r#"{"kind": "reference_ratio"}"#).expect("parse");
        assert_eq!(scale, ScaleModel::default());
    }
}
