//! Reference-object selection.
//!
//! Every stone is scaled against the rectangle of one reference object in
//! the same photo. Which contour counts as the reference is a strategy
//! choice; the default picks the largest enclosed area.

use serde::{Deserialize, Serialize};
use stone_sieve_core::RotatedRect;

use crate::contours::ContourShape;
use crate::error::StoneDetectError;

/// How the reference object is chosen among the extracted contours.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceStrategy {
    /// Largest enclosed area wins; ties keep the earlier contour.
    #[default]
    LargestArea,
    /// Largest contour whose rectangle `long / short` ratio is within
    /// `tolerance` of `ratio` (e.g. `1.0` for a square coin card).
    AspectRatio { ratio: f64, tolerance: f64 },
    /// Known pixel size; no contour is consumed as the reference.
    Fixed { width_px: f64, height_px: f64 },
}

/// Reference rectangle size in pixels. `width_px` is the side closest to
/// the image x-axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDimensions {
    pub width_px: f64,
    pub height_px: f64,
}

impl ReferenceDimensions {
    /// Both sides must be finite and strictly positive to divide by.
    pub fn validated(self) -> Result<Self, StoneDetectError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width_px) && ok(self.height_px) {
            Ok(self)
        } else {
            Err(StoneDetectError::DegenerateReference {
                width_px: self.width_px,
                height_px: self.height_px,
            })
        }
    }
}

impl From<&RotatedRect> for ReferenceDimensions {
    fn from(rect: &RotatedRect) -> Self {
        Self {
            width_px: rect.width,
            height_px: rect.height,
        }
    }
}

/// A located reference object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub dimensions: ReferenceDimensions,
    /// Index of the contour used as reference; the stone scan skips it.
    pub contour_index: Option<usize>,
    pub rect: Option<RotatedRect>,
}

impl Reference {
    /// Reference given directly in pixels, not tied to any contour.
    pub fn fixed(width_px: f64, height_px: f64) -> Result<Self, StoneDetectError> {
        let dimensions = ReferenceDimensions {
            width_px,
            height_px,
        }
        .validated()?;
        Ok(Self {
            dimensions,
            contour_index: None,
            rect: None,
        })
    }

    fn from_shape(shape: &ContourShape) -> Result<Self, StoneDetectError> {
        Ok(Self {
            dimensions: ReferenceDimensions::from(&shape.rect).validated()?,
            contour_index: Some(shape.index),
            rect: Some(shape.rect),
        })
    }
}

/// Pick the reference among `shapes` according to `strategy`.
pub fn locate_reference(
    shapes: &[ContourShape],
    strategy: &ReferenceStrategy,
) -> Result<Reference, StoneDetectError> {
    let chosen = match strategy {
        ReferenceStrategy::LargestArea => largest(shapes.iter()),
        ReferenceStrategy::AspectRatio { ratio, tolerance } => largest(
            shapes
                .iter()
                .filter(|s| (s.rect.aspect_ratio() - ratio).abs() <= *tolerance),
        ),
        ReferenceStrategy::Fixed {
            width_px,
            height_px,
        } => return Reference::fixed(*width_px, *height_px),
    };

    let shape = chosen.ok_or(StoneDetectError::NoReferenceFound)?;
    log::info!(
        "reference: contour #{} area {:.0} px^2, {:.1} x {:.1} px",
        shape.index,
        shape.area_px,
        shape.rect.width,
        shape.rect.height
    );
    Reference::from_shape(shape)
}

/// Strictly larger area replaces the current pick, starting from zero, so
/// contours enclosing nothing are never selected.
fn largest<'a>(shapes: impl Iterator<Item = &'a ContourShape>) -> Option<&'a ContourShape> {
    let mut best: Option<&ContourShape> = None;
    let mut max_area = 0.0;
    for s in shapes {
        if s.area_px > max_area {
            max_area = s.area_px;
            best = Some(s);
        }
    }
    best
}
