//! Collision oracle: bbox screen, point/edge overlap, min-distance clearance
//! check, and board containment.

use crate::geometry::{point_in_polygon, point_to_segment_distance, segments_intersect};
use crate::model::{Bounds, Point};

/// Deliberately generous containment tolerance, world units. Must be
/// preserved exactly: tightening it changes which genomes are feasible.
pub const CONTAINMENT_EPSILON: f64 = 2.0;

/// Whether a piece at world-space bbox `world_bbox` fits inside a board of
/// size `board_width` x `board_height` with edge margin `margin`.
pub fn piece_fits_in_board(world_bbox: &Bounds, board_width: f64, board_height: f64, margin: f64) -> bool {
    world_bbox.min_x >= margin - CONTAINMENT_EPSILON
        && world_bbox.min_y >= margin - CONTAINMENT_EPSILON
        && world_bbox.max_x <= board_width - margin + CONTAINMENT_EPSILON
        && world_bbox.max_y <= board_height - margin + CONTAINMENT_EPSILON
}

fn min_vertex_to_polygon_distance(vertices: &[Point], polygon: &[Point]) -> f64 {
    let mut min_dist = f64::INFINITY;
    let n = polygon.len();
    for v in vertices {
        let mut j = n - 1;
        for i in 0..n {
            let d = point_to_segment_distance(*v, polygon[j], polygon[i]);
            if d < min_dist {
                min_dist = d;
            }
            j = i;
        }
    }
    min_dist
}

/// Minimum polygon-to-polygon distance: the minimum of "vertex of A to edge
/// of B" over all such pairs, and symmetrically.
pub fn min_polygon_distance(a: &[Point], b: &[Point]) -> f64 {
    if a.len() < 2 || b.len() < 2 {
        return f64::INFINITY;
    }
    min_vertex_to_polygon_distance(a, b).min(min_vertex_to_polygon_distance(b, a))
}

fn any_vertex_inside(vertices: &[Point], polygon: &[Point]) -> bool {
    vertices.iter().any(|v| point_in_polygon(polygon, *v))
}

fn any_edge_crosses(a: &[Point], b: &[Point]) -> bool {
    let na = a.len();
    let nb = b.len();
    for i in 0..na {
        let a1 = a[i];
        let a2 = a[(i + 1) % na];
        for j in 0..nb {
            let b1 = b[j];
            let b2 = b[(j + 1) % nb];
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Two polygons A (at world offset `pos_a`, already-translated world-space
/// vertices `world_a`) and B collide with required clearance `d` iff any of
/// the three conditions hold: vertex-in-polygon, edge-crossing, or
/// min-distance under clearance. `bbox_a`/`bbox_b` are the world-space
/// bounding boxes.
pub fn polygons_collide(
    world_a: &[Point],
    bbox_a: &Bounds,
    world_b: &[Point],
    bbox_b: &Bounds,
    clearance: f64,
) -> bool {
    let inflated_a = bbox_a.inflated(clearance);
    if !inflated_a.overlaps(bbox_b) {
        return false;
    }

    if any_vertex_inside(world_a, world_b) || any_vertex_inside(world_b, world_a) {
        return true;
    }
    if any_edge_crosses(world_a, world_b) {
        return true;
    }
    min_polygon_distance(world_a, world_b) < clearance
}
