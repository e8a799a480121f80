//! Geometry primitives: trig cache, rotation, area, and point/segment
//! predicates.

use std::sync::OnceLock;

use crate::model::{Bounds, Point, RotatedPiece};

const ANGLE_CACHE_SIZE: usize = 360;

/// Cache of (sin, cos) for each integer degree 0..359, matching the original
/// C program's `sin_cache`/`cos_cache` but computed lazily and shared safely
/// across threads instead of through a mutable global.
fn trig_cache() -> &'static [(f64, f64); ANGLE_CACHE_SIZE] {
    static CACHE: OnceLock<[(f64, f64); ANGLE_CACHE_SIZE]> = OnceLock::new();
    CACHE.get_or_init(|| {
        let mut table = [(0.0, 0.0); ANGLE_CACHE_SIZE];
        for (deg, entry) in table.iter_mut().enumerate() {
            let rad = (deg as f64).to_radians();
            *entry = (rad.sin(), rad.cos());
        }
        table
    })
}

/// Normalize an integer angle in degrees to `0..360`.
pub fn normalize_angle(angle: i32) -> i32 {
    ((angle % 360) + 360) % 360
}

/// Arithmetic mean of a point set, the polygon's vertex centroid, not its
/// area centroid.
pub fn centroid(points: &[Point]) -> Point {
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f64;
    Point::new(sx / n, sy / n)
}

/// Rotate a set of points by `angle_deg` (integer degrees) about a given
/// center, using the pre-computed trig cache.
pub fn rotate_points_around(points: &[Point], angle_deg: i32, center: Point) -> Vec<Point> {
    let normalized = normalize_angle(angle_deg) as usize;
    let (sin, cos) = trig_cache()[normalized];
    points
        .iter()
        .map(|p| {
            let dx = p.x - center.x;
            let dy = p.y - center.y;
            Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
        })
        .collect()
}

/// Rotate every vertex of `piece` about the polygon's vertex centroid
/// (arithmetic mean of vertices, *not* the area centroid) by one of its
/// allowed angles. Area is preserved exactly; vertices are NOT re-translated
/// to the origin afterward.
pub fn rotate_piece(piece: &crate::model::Piece, angle: i32) -> RotatedPiece {
    let center = centroid(&piece.vertices);
    let vertices = rotate_points_around(&piece.vertices, angle, center);
    let bbox = Bounds::of(&vertices);
    RotatedPiece {
        piece_id: piece.id,
        angle: normalize_angle(angle),
        width: bbox.width(),
        height: bbox.height(),
        bbox,
        vertices,
        area: piece.area,
    }
}

/// Shoelace formula, absolute value, halved: always non-negative.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let n = points.len();
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    (sum / 2.0).abs()
}

/// Standard horizontal ray-cast parity test.
pub fn point_in_polygon(polygon: &[Point], point: Point) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        let intersects = (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Distance from `p` to the segment `a`-`b`, via clamped projection.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        let dx = p.x - a.x;
        let dy = p.y - a.y;
        return (dx * dx + dy * dy).sqrt();
    }
    let t = ((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let projx = a.x + t * abx;
    let projy = a.y + t * aby;
    let dx = p.x - projx;
    let dy = p.y - projy;
    (dx * dx + dy * dy).sqrt()
}

const ORIENTATION_EPSILON: f64 = 1e-10;

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, c: Point) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

/// Orientation-based segment intersection test with collinear-on-segment
/// handling, epsilon `1e-10` on the cross product.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    if ((d1 > ORIENTATION_EPSILON) != (d2 > ORIENTATION_EPSILON)
        || (d1 < -ORIENTATION_EPSILON) != (d2 < -ORIENTATION_EPSILON))
        && ((d3 > ORIENTATION_EPSILON) != (d4 > ORIENTATION_EPSILON)
            || (d3 < -ORIENTATION_EPSILON) != (d4 < -ORIENTATION_EPSILON))
    {
        return true;
    }

    if d1.abs() <= ORIENTATION_EPSILON && on_segment(p3, p4, p1) {
        return true;
    }
    if d2.abs() <= ORIENTATION_EPSILON && on_segment(p3, p4, p2) {
        return true;
    }
    if d3.abs() <= ORIENTATION_EPSILON && on_segment(p1, p2, p3) {
        return true;
    }
    if d4.abs() <= ORIENTATION_EPSILON && on_segment(p1, p2, p4) {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Piece;

    fn square(side: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ]
    }

    #[test]
    fn area_of_square_is_positive() {
        assert_eq!(polygon_area(&square(10.0)), 100.0);
    }

    #[test]
    fn degenerate_polygon_has_zero_area() {
        assert_eq!(polygon_area(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]), 0.0);
    }

    #[test]
    fn rotate_by_zero_is_identity() {
        let piece = Piece::new(0, square(10.0), vec![0]);
        let rotated = rotate_piece(&piece, 0);
        for (a, b) in piece.vertices.iter().zip(&rotated.vertices) {
            assert!((a.x - b.x).abs() < 1e-9);
            assert!((a.y - b.y).abs() < 1e-9);
        }
    }

    #[test]
    fn rotate_by_360_equals_rotate_by_0() {
        let piece = Piece::new(0, square(10.0), vec![0]);
        let r0 = rotate_piece(&piece, 0);
        let r360 = rotate_piece(&piece, 360);
        for (a, b) in r0.vertices.iter().zip(&r360.vertices) {
            assert!((a.x - b.x).abs() < 1e-9);
            assert!((a.y - b.y).abs() < 1e-9);
        }
    }

    #[test]
    fn rotation_preserves_area() {
        let piece = Piece::new(0, square(10.0), vec![0, 90, 180, 270]);
        for &angle in &piece.allowed_angles.clone() {
            let rotated = rotate_piece(&piece, angle);
            assert!((rotated.area - piece.area).abs() < 1e-9);
        }
    }

    #[test]
    fn point_in_polygon_basic() {
        let poly = square(10.0);
        assert!(point_in_polygon(&poly, Point::new(5.0, 5.0)));
        assert!(!point_in_polygon(&poly, Point::new(15.0, 5.0)));
    }

    #[test]
    fn point_to_segment_distance_clamped() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_distance(Point::new(-5.0, 0.0), a, b) - 5.0).abs() < 1e-9);
        assert!((point_to_segment_distance(Point::new(5.0, 5.0), a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn segments_intersect_crossing() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(10.0, 10.0);
        let p3 = Point::new(0.0, 10.0);
        let p4 = Point::new(10.0, 0.0);
        assert!(segments_intersect(p1, p2, p3, p4));
    }

    #[test]
    fn segments_parallel_do_not_intersect() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(10.0, 0.0);
        let p3 = Point::new(0.0, 1.0);
        let p4 = Point::new(10.0, 1.0);
        assert!(!segments_intersect(p1, p2, p3, p4));
    }
}
