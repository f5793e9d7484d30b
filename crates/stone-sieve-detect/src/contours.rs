//! Edge map and external-contour extraction.
//!
//! grayscale -> Gaussian blur -> Canny -> (dilate) -> outer borders that are
//! not nested inside any other border.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::point::Point;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use stone_sieve_core::{polygon_area, RotatedRect};

use crate::params::EdgeParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// What the measurer needs to know about one external contour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContourShape {
    /// Position in extraction order.
    pub index: usize,
    /// Enclosed area in square pixels.
    pub area_px: f64,
    /// Minimum-area rectangle around the contour.
    pub rect: RotatedRect,
}

/// Binary edge map (255 = edge).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(gray, params), fields(width = gray.width(), height = gray.height()))
)]
pub fn edge_map(gray: &GrayImage, params: &EdgeParams) -> GrayImage {
    let blurred;
    let src = if params.blur_sigma > 0.0 {
        blurred = imageproc::filter::gaussian_blur_f32(gray, params.blur_sigma);
        &blurred
    } else {
        gray
    };

    let edges = imageproc::edges::canny(src, params.canny_low, params.canny_high);
    if params.dilation_radius == 0 {
        return edges;
    }
    imageproc::morphology::dilate(&edges, Norm::LInf, params.dilation_radius)
}

/// Outermost borders only; holes and anything nested are dropped.
pub fn external_contours(edges: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .collect()
}

/// Area and minimum-area rectangle of one contour.
pub fn contour_shape(index: usize, contour: &Contour<i32>) -> Option<ContourShape> {
    let outline: Vec<Point2<f64>> = contour.points.iter().map(to_point2).collect();
    let area_px = polygon_area(&outline);

    let hull: Vec<Point2<f64>> = imageproc::geometry::convex_hull(contour.points.as_slice())
        .iter()
        .map(to_point2)
        .collect();
    let rect = RotatedRect::from_convex_hull(&hull)?;

    Some(ContourShape {
        index,
        area_px,
        rect,
    })
}

/// Run the full edge/contour extraction on a grayscale image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(gray, params), fields(width = gray.width(), height = gray.height()))
)]
pub fn extract_shapes(gray: &GrayImage, params: &EdgeParams) -> Vec<ContourShape> {
    let edges = edge_map(gray, params);
    let grow = f64::from(params.dilation_radius);
    let shapes: Vec<ContourShape> = external_contours(&edges)
        .iter()
        .enumerate()
        .filter_map(|(i, c)| contour_shape(i, c))
        .map(|mut shape| {
            // dilation pushes the outer border out by `grow` on each side
            shape.rect = shape.rect.inset(grow);
            shape
        })
        .collect();
    log::debug!("extracted {} external contours", shapes.len());
    shapes
}

fn to_point2(p: &Point<i32>) -> Point2<f64> {
    Point2::new(p.x as f64, p.y as f64)
}
