//! Concavity post-pass: re-seat small pieces into the concavities of large,
//! significantly non-convex placed pieces. Runs once over the best-ever
//! layout after evolution finishes; never invoked from the fitness function
//! itself.

use crate::collision::{piece_fits_in_board, polygons_collide};
use crate::geometry::{point_in_polygon, rotate_points_around};
use crate::model::{Bounds, Layout, Piece, Point};

const GRID_RESOLUTION: usize = 40;
const CONCAVITY_RATIO_THRESHOLD: f64 = 0.25;
const MAX_SMALL_AREA_FRACTION: f64 = 0.25;
const SUB_GRID_SPAN: i32 = 2; // 5x5 centered on a candidate

fn concavity_ratio(area: f64, bbox: &Bounds) -> f64 {
    let bbox_area = bbox.width() * bbox.height();
    if bbox_area <= 0.0 {
        0.0
    } else {
        1.0 - area / bbox_area
    }
}

/// World-space grid points inside `bbox` but outside `polygon`: candidate
/// re-seat positions for a small piece.
fn concavity_candidates(bbox: &Bounds, polygon: &[Point]) -> Vec<Point> {
    let mut candidates = Vec::new();
    let w = bbox.width();
    let h = bbox.height();
    if w <= 0.0 || h <= 0.0 {
        return candidates;
    }
    for iy in 0..=GRID_RESOLUTION {
        let y = bbox.min_y + h * (iy as f64) / (GRID_RESOLUTION as f64);
        for ix in 0..=GRID_RESOLUTION {
            let x = bbox.min_x + w * (ix as f64) / (GRID_RESOLUTION as f64);
            let p = Point::new(x, y);
            if !point_in_polygon(polygon, p) {
                candidates.push(p);
            }
        }
    }
    candidates
}

struct ReseatAttempt {
    position: Point,
    angle: i32,
    vertices: Vec<Point>,
    bbox: Bounds,
}

/// Try every allowed angle of `small_piece` at `candidate`, admissible
/// against every other placement already on the board (the small piece
/// itself excluded by the caller). Returns the first admissible placement.
fn try_seat_at(
    small_piece: &Piece,
    candidate: Point,
    board_width: f64,
    board_height: f64,
    margin: f64,
    clearance: f64,
    other_world_vertices: &[(Vec<Point>, Bounds)],
) -> Option<ReseatAttempt> {
    let centroid = crate::geometry::centroid(&small_piece.vertices);
    for &angle in &small_piece.allowed_angles {
        let rotated_vertices = rotate_points_around(&small_piece.vertices, angle, centroid);
        let local_bbox = Bounds::of(&rotated_vertices);
        let world_bbox = local_bbox.translated(candidate);
        if !piece_fits_in_board(&world_bbox, board_width, board_height, margin) {
            continue;
        }
        let world_vertices: Vec<Point> = rotated_vertices.iter().map(|v| v.translated(candidate)).collect();
        let collides = other_world_vertices
            .iter()
            .any(|(verts, bbox)| polygons_collide(&world_vertices, &world_bbox, verts, bbox, clearance));
        if !collides {
            return Some(ReseatAttempt { position: candidate, angle, vertices: rotated_vertices, bbox: local_bbox });
        }
    }
    None
}

/// Mutate `layout` in place, re-seating small pieces into concavities of
/// large pieces board by board. `pieces` is the full input piece list,
/// indexed by piece id. Never leaves a board worse than it started: each
/// candidate board is only mutated if a re-seat attempt actually succeeds.
pub fn relax_concavities(layout: &mut Layout, pieces: &[Piece], margin: f64, clearance: f64) {
    for board in &mut layout.boards {
        let board_width = board.width;
        let board_height = board.height;

        let mut large_indices: Vec<usize> = (0..board.placements.len())
            .filter(|&i| concavity_ratio(board.placements[i].area, &board.placements[i].bbox) >= CONCAVITY_RATIO_THRESHOLD)
            .collect();
        large_indices.sort_by(|&a, &b| {
            let ra = concavity_ratio(board.placements[a].area, &board.placements[a].bbox);
            let rb = concavity_ratio(board.placements[b].area, &board.placements[b].bbox);
            rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
        });

        for &large_idx in &large_indices {
            let large_world_vertices = board.placements[large_idx].world_vertices();
            let large_bbox = board.placements[large_idx].bbox;
            let large_area = board.placements[large_idx].area;
            let large_w = large_bbox.width();
            let large_h = large_bbox.height();

            let candidates = concavity_candidates(&large_bbox, &large_world_vertices);
            if candidates.is_empty() {
                continue;
            }

            let mut small_indices: Vec<usize> = (0..board.placements.len())
                .filter(|&i| i != large_idx && board.placements[i].area <= MAX_SMALL_AREA_FRACTION * large_area)
                .collect();
            small_indices.sort_by(|&a, &b| {
                board.placements[a]
                    .area
                    .partial_cmp(&board.placements[b].area)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let sub_step = (large_w.min(large_h)) / (2.0 * GRID_RESOLUTION as f64);

            for &small_idx in &small_indices {
                let small_piece_id = board.placements[small_idx].piece_id;
                let small_piece = &pieces[small_piece_id];

                let other_world_vertices: Vec<(Vec<Point>, Bounds)> = board
                    .placements
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != small_idx)
                    .map(|(_, p)| (p.world_vertices(), p.bbox))
                    .collect();

                let mut found: Option<ReseatAttempt> = None;
                'candidates: for &candidate in &candidates {
                    if let Some(attempt) = try_seat_at(
                        small_piece,
                        candidate,
                        board_width,
                        board_height,
                        margin,
                        clearance,
                        &other_world_vertices,
                    ) {
                        found = Some(attempt);
                        break 'candidates;
                    }
                    for dy in -SUB_GRID_SPAN..=SUB_GRID_SPAN {
                        for dx in -SUB_GRID_SPAN..=SUB_GRID_SPAN {
                            if dx == 0 && dy == 0 {
                                continue;
                            }
                            let sub = Point::new(candidate.x + dx as f64 * sub_step, candidate.y + dy as f64 * sub_step);
                            if let Some(attempt) = try_seat_at(
                                small_piece,
                                sub,
                                board_width,
                                board_height,
                                margin,
                                clearance,
                                &other_world_vertices,
                            ) {
                                found = Some(attempt);
                                break 'candidates;
                            }
                        }
                    }
                }

                if let Some(attempt) = found {
                    // original piece area is preserved; used_area on the board is unaffected
                    let placed = &mut board.placements[small_idx];
                    placed.position = attempt.position;
                    placed.angle = attempt.angle;
                    placed.vertices = attempt.vertices;
                    placed.bbox = attempt.bbox.translated(attempt.position);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_area;
    use crate::model::{Board, PlacedPiece, RotatedPiece};

    fn square(side: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ]
    }

    fn l_shape() -> Vec<Point> {
        // An L-shaped polygon: bbox 40x40, actual area 1200 -> ratio 0.25.
        vec![
            Point::new(0.0, 0.0),
            Point::new(40.0, 0.0),
            Point::new(40.0, 20.0),
            Point::new(20.0, 20.0),
            Point::new(20.0, 40.0),
            Point::new(0.0, 40.0),
        ]
    }

    #[test]
    fn concavity_ratio_of_square_is_zero() {
        let bbox = Bounds::of(&square(10.0));
        let area = polygon_area(&square(10.0));
        assert!(concavity_ratio(area, &bbox) < 1e-9);
    }

    #[test]
    fn concavity_candidates_found_in_notch() {
        let shape = l_shape();
        let bbox = Bounds::of(&shape);
        let candidates = concavity_candidates(&bbox, &shape);
        assert!(!candidates.is_empty());
        assert!(candidates.iter().any(|p| p.x > 20.0 && p.y > 20.0));
    }

    #[test]
    fn relax_concavities_never_removes_a_placement() {
        let large_piece = Piece::new(0, l_shape(), vec![0]);
        let small_piece = Piece::new(1, square(5.0), vec![0]);

        let mut board = Board::new(100.0, 100.0);
        let large_rotated = crate::geometry::rotate_piece(&large_piece, 0);
        board.commit(PlacedPiece::from_rotated(large_rotated, Point::new(0.0, 0.0)), large_piece.area);

        let small_rotated = RotatedPiece {
            piece_id: 1,
            angle: 0,
            vertices: small_piece.vertices.clone(),
            bbox: small_piece.bbox,
            width: small_piece.width,
            height: small_piece.height,
            area: small_piece.area,
        };
        board.commit(PlacedPiece::from_rotated(small_rotated, Point::new(60.0, 60.0)), small_piece.area);

        let mut layout = Layout { boards: vec![board] };
        let pieces = vec![large_piece, small_piece];
        relax_concavities(&mut layout, &pieces, 0.0, 0.0);

        assert_eq!(layout.boards[0].placements.len(), 2);
    }
}
