//! Bottom-left-biased constructive placer.

use crate::collision::{piece_fits_in_board, polygons_collide};
use crate::model::{Board, Piece, PlacedPiece, Point, RotatedPiece};

fn is_admissible(position: Point, rotated: &RotatedPiece, board: &Board, margin: f64, clearance: f64) -> bool {
    let world_bbox = rotated.bbox.translated(position);
    if !piece_fits_in_board(&world_bbox, board.width, board.height, margin) {
        return false;
    }
    let world_vertices: Vec<Point> = rotated.vertices.iter().map(|v| v.translated(position)).collect();
    for placed in &board.placements {
        if polygons_collide(&world_vertices, &world_bbox, &placed.world_vertices(), &placed.bbox, clearance) {
            return false;
        }
    }
    true
}

/// Six contact positions adjacent to a neighbor's world-space bbox, for a
/// new piece of size `w` x `h`.
fn contact_candidates(neighbor_bbox: &crate::model::Bounds, w: f64, h: f64, clearance: f64) -> [Point; 6] {
    let left = neighbor_bbox.min_x;
    let right = neighbor_bbox.max_x;
    let bottom = neighbor_bbox.min_y;
    let top = neighbor_bbox.max_y;
    [
        Point::new(right + clearance, bottom),
        Point::new(right + clearance, top - h),
        Point::new(left, top + clearance),
        Point::new(right - w, top + clearance),
        Point::new(left - w - clearance, bottom),
        Point::new(left, bottom - h - clearance),
    ]
}

fn score(p: Point) -> f64 {
    3.0 * p.x + 0.5 * p.y
}

fn grid_score(p: Point) -> f64 {
    2.5 * p.x + 0.5 * p.y
}

const GRID_PROBE_CAP: usize = 1000;

/// Find an admissible position for `rotated` on `board`, or `None` if it
/// cannot be placed.
///
/// Candidates are generated as anchors, the intended world-space corner of
/// the rotated piece's bbox, and converted to the translation that actually
/// lands there via `to_position`. For a square piece, or any piece rotated
/// by a multiple of 180 degrees, `rotated.bbox.min` is already `(0, 0)` and
/// `to_position` is the identity; for a non-square piece rotated 90 or 270
/// degrees about its vertex centroid, the bbox minimum is offset from the
/// origin and the conversion is required for the anchor to land where
/// intended.
pub fn find_best_position(rotated: &RotatedPiece, board: &Board, margin: f64, clearance: f64) -> Option<Point> {
    let interior_w = board.width - 2.0 * margin;
    let interior_h = board.height - 2.0 * margin;
    if rotated.width > interior_w || rotated.height > interior_h {
        return None;
    }

    let to_position = |anchor: Point| Point::new(anchor.x - rotated.bbox.min_x, anchor.y - rotated.bbox.min_y);

    if board.placements.is_empty() {
        let position = to_position(Point::new(margin, margin));
        return if is_admissible(position, rotated, board, margin, clearance) {
            Some(position)
        } else {
            None
        };
    }

    let w = rotated.width;
    let h = rotated.height;
    let mut best: Option<(f64, Point)> = None;
    for placed in &board.placements {
        for anchor in contact_candidates(&placed.bbox, w, h, clearance) {
            let position = to_position(anchor);
            if !is_admissible(position, rotated, board, margin, clearance) {
                continue;
            }
            let s = score(anchor);
            if best.map_or(true, |(best_s, _)| s < best_s) {
                best = Some((s, position));
            }
        }
    }
    if let Some((_, p)) = best {
        return Some(p);
    }

    // Coarse grid-scan fallback.
    let step = (0.3 * w.max(h)).clamp(10.0, 40.0);
    let x_max = board.width - w - margin;
    let y_max = board.height - h - margin;
    let mut probes = 0usize;
    let mut best: Option<(f64, Point)> = None;
    let mut y = margin;
    'outer: while y <= y_max {
        let mut x = margin;
        while x <= x_max {
            if probes >= GRID_PROBE_CAP {
                break 'outer;
            }
            probes += 1;
            let anchor = Point::new(x, y);
            let position = to_position(anchor);
            if is_admissible(position, rotated, board, margin, clearance) {
                let s = grid_score(anchor);
                if best.map_or(true, |(best_s, _)| s < best_s) {
                    best = Some((s, position));
                }
            }
            x += step;
        }
        y += step;
    }
    best.map(|(_, p)| p)
}

/// Rotate `piece` to the angle selected by `rotation_idx`, find a position on
/// `board`, and commit the placement if admissible. Returns whether the
/// piece was placed. Never tries any rotation other than the requested one;
/// rotation choice belongs to the genetic search.
pub fn place_piece_on_board(piece: &Piece, rotation_idx: usize, board: &mut Board, margin: f64, clearance: f64) -> bool {
    let angle = piece.allowed_angles[rotation_idx];
    let rotated = crate::geometry::rotate_piece(piece, angle);
    match find_best_position(&rotated, board, margin, clearance) {
        Some(position) => {
            let area = piece.area;
            board.commit(PlacedPiece::from_rotated(rotated, position), area);
            true
        }
        None => false,
    }
}
