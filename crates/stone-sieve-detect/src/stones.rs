//! Stone measurement and sieve classification.

use serde::{Deserialize, Serialize};
use stone_sieve_core::{CategoryCounts, RotatedRect, SieveClass};

use crate::calibration::{ImageCalibration, ScaleModel};
use crate::contours::ContourShape;
use crate::reference::Reference;

/// One measured stone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoneRecord {
    /// 1-based ordinal within its image.
    pub stone: usize,
    pub shortest_width_mm: f64,
    /// Length derived from the longer rectangle side.
    pub dimension1_mm: f64,
    /// Length derived from the shorter rectangle side.
    pub dimension2_mm: f64,
    pub class: SieveClass,
    /// Rectangle in image pixels.
    pub rect: RotatedRect,
}

impl StoneRecord {
    pub fn label(&self) -> String {
        format!("Stone{}", self.stone)
    }
}

/// Per-image measurement result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoneReport {
    pub counts: CategoryCounts,
    pub stones: Vec<StoneRecord>,
}

impl StoneReport {
    pub fn total(&self) -> usize {
        self.stones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stones.is_empty()
    }

    fn push(&mut self, mut record: StoneRecord) {
        record.stone = self.stones.len() + 1;
        record.class = self.counts.record_width(record.shortest_width_mm);
        self.stones.push(record);
    }
}

/// Measure every shape except the reference and noise.
///
/// A shape is noise when its enclosed area is `<= min_contour_area`.
pub fn measure_shapes(
    shapes: &[ContourShape],
    reference: &Reference,
    scale: &ScaleModel,
    calibration: &ImageCalibration,
    min_contour_area: f64,
) -> StoneReport {
    let mut report = StoneReport::default();

    for shape in shapes {
        if Some(shape.index) == reference.contour_index {
            continue;
        }
        if shape.area_px <= min_contour_area {
            log::trace!(
                "contour #{} dropped as noise ({:.1} px^2)",
                shape.index,
                shape.area_px
            );
            continue;
        }

        let (d1, d2) = scale.scale(&shape.rect, &reference.dimensions);
        let (dimension1_mm, dimension2_mm) = calibration.apply(d1, d2);
        report.push(StoneRecord {
            stone: 0,
            shortest_width_mm: dimension1_mm.min(dimension2_mm),
            dimension1_mm,
            dimension2_mm,
            class: SieveClass::UpTo4_75,
            rect: shape.rect,
        });
    }

    log::info!(
        "{} stones measured ({} contours)",
        report.total(),
        shapes.len()
    );
    report
}
