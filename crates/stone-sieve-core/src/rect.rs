use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Rotated rectangle in image pixel coordinates.
///
/// `width` is measured along the axis given by `angle`, `height` along the
/// perpendicular. `angle` is normalized into `(-pi/4, pi/4]`, so for a
/// rectangle that is roughly axis aligned `width` is its horizontal extent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2<f64>,
    pub width: f64,
    pub height: f64,
    /// Radians, counter-clockwise in image coordinates (y down).
    pub angle: f64,
}

impl RotatedRect {
    /// Zero-size rectangle at `p`.
    pub fn point(p: Point2<f64>) -> Self {
        Self {
            center: p,
            width: 0.0,
            height: 0.0,
            angle: 0.0,
        }
    }

    /// Minimum-area enclosing rectangle of a convex polygon.
    ///
    /// `hull` must be the vertices of a convex hull in boundary order
    /// (either orientation). One of the optimal rectangles shares a side
    /// with a hull edge, so only hull edge directions are tried. Returns
    /// `None` for an empty input.
    pub fn from_convex_hull(hull: &[Point2<f64>]) -> Option<Self> {
        let first = *hull.first()?;
        let n = hull.len();

        let mut best: Option<(f64, Self)> = None;
        for i in 0..n {
            let a = hull[i];
            let b = hull[(i + 1) % n];
            let d = b - a;
            if d.norm() <= 1e-12 {
                continue;
            }

            let angle = normalize_quarter_turn(d.y.atan2(d.x));
            let rect = fit_along(hull, angle);
            let area = rect.width * rect.height;
            if best.as_ref().is_none_or(|(best_area, _)| area < *best_area - 1e-9) {
                best = Some((area, rect));
            }
        }

        Some(best.map_or_else(|| Self::point(first), |(_, rect)| rect))
    }

    pub fn long_side(&self) -> f64 {
        self.width.max(self.height)
    }

    pub fn short_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// `long_side / short_side`; infinite for a degenerate rectangle.
    pub fn aspect_ratio(&self) -> f64 {
        let short = self.short_side();
        if short <= 0.0 {
            return f64::INFINITY;
        }
        self.long_side() / short
    }

    /// Same rectangle with `margin` removed from every side. Sides never go
    /// below zero.
    pub fn inset(&self, margin: f64) -> Self {
        Self {
            width: (self.width - 2.0 * margin).max(0.0),
            height: (self.height - 2.0 * margin).max(0.0),
            ..*self
        }
    }

    /// Corner points, walking around the rectangle starting from the
    /// corner at (-width/2, -height/2) in the rectangle frame.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let (u, v) = axes(self.angle);
        let hu = u * (self.width * 0.5);
        let hv = v * (self.height * 0.5);
        let c = self.center;
        [c - hu - hv, c + hu - hv, c + hu + hv, c - hu + hv]
    }
}

fn axes(angle: f64) -> (Vector2<f64>, Vector2<f64>) {
    let (s, c) = angle.sin_cos();
    (Vector2::new(c, s), Vector2::new(-s, c))
}

fn fit_along(points: &[Point2<f64>], angle: f64) -> RotatedRect {
    let (u, v) = axes(angle);
    let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        let pu = p.coords.dot(&u);
        let pv = p.coords.dot(&v);
        min_u = min_u.min(pu);
        max_u = max_u.max(pu);
        min_v = min_v.min(pv);
        max_v = max_v.max(pv);
    }

    let center = u * ((min_u + max_u) * 0.5) + v * ((min_v + max_v) * 0.5);
    RotatedRect {
        center: Point2::from(center),
        width: max_u - min_u,
        height: max_v - min_v,
        angle,
    }
}

/// Fold an edge direction into `(-pi/4, pi/4]`. Rectangles are symmetric
/// under quarter turns, so this picks a canonical width axis.
fn normalize_quarter_turn(theta: f64) -> f64 {
    let mut t = theta - FRAC_PI_2 * (theta / FRAC_PI_2).round();
    if t <= -FRAC_PI_4 {
        t += FRAC_PI_2;
    }
    t
}
