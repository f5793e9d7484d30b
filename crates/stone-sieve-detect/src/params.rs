use serde::{Deserialize, Serialize};

use crate::calibration::ScaleModel;
use crate::reference::ReferenceStrategy;

/// Edge-map settings shared by the reference locator and the stone measurer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeParams {
    /// Gaussian blur sigma; `<= 0` disables blurring. The default is the
    /// sigma a 5x5 kernel implies when none is given.
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Chebyshev radius used to dilate the edge map, for photos where Canny
    /// leaves gaps in object outlines. `0` keeps raw Canny edges. Fitted
    /// rectangles are shrunk back by the same radius on every side.
    pub dilation_radius: u8,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 30.0,
            canny_high: 150.0,
            dilation_radius: 0,
        }
    }
}

/// Full parameter set for [`crate::StoneDetector`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StoneDetectorParams {
    #[serde(default)]
    pub edges: EdgeParams,
    /// Contours enclosing this many square pixels or fewer are noise.
    #[serde(default = "default_min_contour_area")]
    pub min_contour_area: f64,
    #[serde(default)]
    pub reference: ReferenceStrategy,
    #[serde(default)]
    pub scale: ScaleModel,
}

fn default_min_contour_area() -> f64 {
    100.0
}

impl Default for StoneDetectorParams {
    fn default() -> Self {
        Self {
            edges: EdgeParams::default(),
            min_contour_area: default_min_contour_area(),
            reference: ReferenceStrategy::default(),
            scale: ScaleModel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let params: StoneDetectorParams = serde_json::from_str("{}").expect("parse");
        assert_eq!(params, StoneDetectorParams::default());
        assert_eq!(params.min_contour_area, 100.0);
        assert_eq!(params.edges.canny_low, 30.0);
        assert_eq!(params.edges.canny_high, 150.0);
        assert_eq!(params.edges.dilation_radius, 0);
    }

    #[test]
    fn partial_edge_overrides_keep_other_defaults() {
        let params: StoneDetectorParams =
            serde_json::from_str(r#"{"edges": {"canny_high": 200.0}, "min_contour_area": 50}"#)
                .expect("parse");
        assert_eq!(params.edges.canny_high, 200.0);
        assert_eq!(params.edges.blur_sigma, 1.1);
        assert_eq!(params.min_contour_area, 50.0);
    }
}
