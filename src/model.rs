//! Core data model: points, pieces, boards, layouts and genomes.

use serde::{Deserialize, Serialize};

/// Upper bounds enforced on the problem size.
pub const MAX_PIECES: usize = 100;
pub const MAX_POINTS: usize = 1000;
pub const MAX_BOARDS: usize = 50;
pub const MAX_ANGLES: usize = 10;

/// A 2D double-precision coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translated(&self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of(points: &[Point]) -> Self {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Bounds { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn translated(&self, by: Point) -> Bounds {
        Bounds {
            min_x: self.min_x + by.x,
            min_y: self.min_y + by.y,
            max_x: self.max_x + by.x,
            max_y: self.max_y + by.y,
        }
    }

    /// Inflate every edge outward by `d`, used for the clearance screen.
    pub fn inflated(&self, d: f64) -> Bounds {
        Bounds {
            min_x: self.min_x - d,
            min_y: self.min_y - d,
            max_x: self.max_x + d,
            max_y: self.max_y + d,
        }
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

/// A piece as ingested: immutable after construction.
#[derive(Debug, Clone)]
pub struct Piece {
    pub id: usize,
    pub vertices: Vec<Point>,
    pub allowed_angles: Vec<i32>,
    pub bbox: Bounds,
    pub width: f64,
    pub height: f64,
    pub area: f64,
}

impl Piece {
    /// Build a piece from raw vertices and allowed angles, translating it so
    /// its bounding box has non-negative minimum coordinates.
    pub fn new(id: usize, mut vertices: Vec<Point>, allowed_angles: Vec<i32>) -> Self {
        let raw_bbox = Bounds::of(&vertices);
        let dx = raw_bbox.min_x.min(0.0);
        let dy = raw_bbox.min_y.min(0.0);
        if dx != 0.0 || dy != 0.0 {
            for v in &mut vertices {
                v.x -= dx;
                v.y -= dy;
            }
        }
        let bbox = Bounds::of(&vertices);
        let area = crate::geometry::polygon_area(&vertices);
        Piece {
            id,
            width: bbox.width(),
            height: bbox.height(),
            bbox,
            vertices,
            allowed_angles,
            area,
        }
    }
}

/// A piece rotated by one of its allowed angles. Owned by a [`PlacedPiece`]
/// after commit; ephemeral scratch before that.
#[derive(Debug, Clone)]
pub struct RotatedPiece {
    pub piece_id: usize,
    pub angle: i32,
    pub vertices: Vec<Point>,
    pub bbox: Bounds,
    pub width: f64,
    pub height: f64,
    pub area: f64,
}

/// A rotated piece committed onto a board at a world-space offset.
#[derive(Debug, Clone)]
pub struct PlacedPiece {
    pub piece_id: usize,
    pub angle: i32,
    pub position: Point,
    pub vertices: Vec<Point>,
    pub bbox: Bounds,
    pub area: f64,
}

impl PlacedPiece {
    pub fn from_rotated(rotated: RotatedPiece, position: Point) -> Self {
        PlacedPiece {
            piece_id: rotated.piece_id,
            angle: rotated.angle,
            bbox: rotated.bbox.translated(position),
            vertices: rotated.vertices,
            area: rotated.area,
            position,
        }
    }

    /// World-space vertices (vertex + position).
    pub fn world_vertices(&self) -> Vec<Point> {
        self.vertices.iter().map(|v| v.translated(self.position)).collect()
    }
}

/// A board: fixed dimensions, an ordered list of committed placements, and
/// accumulated used area.
#[derive(Debug, Clone)]
pub struct Board {
    pub width: f64,
    pub height: f64,
    pub placements: Vec<PlacedPiece>,
    pub used_area: f64,
}

impl Board {
    pub fn new(width: f64, height: f64) -> Self {
        Board { width, height, placements: Vec::new(), used_area: 0.0 }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn efficiency(&self) -> f64 {
        self.used_area / self.area()
    }

    pub fn commit(&mut self, placed: PlacedPiece, original_area: f64) {
        self.used_area += original_area;
        self.placements.push(placed);
    }
}

/// A full nesting result: ordered boards plus aggregate efficiency.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub boards: Vec<Board>,
}

impl Layout {
    pub fn used_area(&self) -> f64 {
        self.boards.iter().map(|b| b.used_area).sum()
    }

    pub fn board_area(&self) -> f64 {
        self.boards.iter().map(|b| b.area()).sum()
    }

    /// Aggregate efficiency across all boards used: Σ used_area / Σ board_area.
    pub fn efficiency(&self) -> f64 {
        let total_board_area = self.board_area();
        if total_board_area <= 0.0 {
            0.0
        } else {
            self.used_area() / total_board_area
        }
    }
}

/// A search-state value: a piece ordering plus a per-piece-id rotation
/// selection. `rotation` is indexed by piece id, never by position in
/// `sequence`: permuting `sequence` alone must never change which angle a
/// given piece id receives.
#[derive(Debug, Clone)]
pub struct Genome {
    pub sequence: Vec<usize>,
    pub rotation: Vec<usize>,
    pub fitness: Option<f64>,
    pub board_count: Option<usize>,
    pub efficiency: Option<f64>,
}

impl Genome {
    pub fn new(sequence: Vec<usize>, rotation: Vec<usize>) -> Self {
        Genome { sequence, rotation, fitness: None, board_count: None, efficiency: None }
    }

    pub fn invalidate(&mut self) {
        self.fitness = None;
        self.board_count = None;
        self.efficiency = None;
    }

    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }
}

/// The parsed problem description.
#[derive(Debug, Clone)]
pub struct InputDescriptor {
    pub board_width: f64,
    pub board_height: f64,
    pub distance_between_boards: f64,
    pub distance_between_pieces: f64,
    pub pieces: Vec<Piece>,
}
