use nalgebra::Point2;

/// Enclosed area of a closed polygon (shoelace formula, orientation-free).
///
/// The closing edge from the last point back to the first is implied.
/// Fewer than three points enclose nothing.
pub fn polygon_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    (twice * 0.5).abs()
}
