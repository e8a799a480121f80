//! Input/output JSON schemas and (de)serialization.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{InputDescriptor, Layout, Piece, Point};

/// Wire format for one piece. `angle` and `data` are the historical field
/// names from the source format; `data` holds ordered `[x, y]` vertex pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPiece {
    pub angle: Vec<i32>,
    pub data: Vec<[f64; 2]>,
}

/// Wire format for the whole problem. `distance_between_peaces` and `peaces`
/// preserve a historical misspelling in the external format; the Rust field
/// names are spelled correctly.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInput {
    pub board_x: f64,
    pub board_y: f64,
    pub distance_between_boards: f64,
    #[serde(rename = "distance_between_peaces")]
    pub distance_between_pieces: f64,
    #[serde(rename = "peaces")]
    pub pieces: Vec<RawPiece>,
}

/// Parse and validate a problem description from `path`. A read or parse
/// failure here is the caller's cue to abort non-zero.
pub fn read_input(path: &std::path::Path) -> Result<InputDescriptor> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading input file {}", path.display()))?;
    let parsed: RawInput = serde_json::from_str(&raw).with_context(|| format!("parsing input file {}", path.display()))?;
    Ok(to_input_descriptor(parsed))
}

fn to_input_descriptor(raw: RawInput) -> InputDescriptor {
    let pieces = raw
        .pieces
        .into_iter()
        .enumerate()
        .map(|(id, raw_piece)| {
            let vertices: Vec<Point> = raw_piece.data.iter().map(|[x, y]| Point::new(*x, *y)).collect();
            Piece::new(id, vertices, raw_piece.angle)
        })
        .collect();
    InputDescriptor {
        board_width: raw.board_x,
        board_height: raw.board_y,
        distance_between_boards: raw.distance_between_boards,
        distance_between_pieces: raw.distance_between_pieces,
        pieces,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputPiece {
    pub piece_id: usize,
    pub position_x: f64,
    pub position_y: f64,
    pub angle: i32,
    pub data: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputBoard {
    pub board_id: usize,
    pub efficiency: f64,
    pub piece_count: usize,
    pub pieces: Vec<OutputPiece>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputDocument {
    pub board_count: usize,
    pub board_x: f64,
    pub board_y: f64,
    pub total_efficiency: f64,
    pub execution_time: f64,
    pub boards: Vec<OutputBoard>,
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Build the output document for a finished layout. `execution_time` is in
/// seconds; position is rounded to 2dp, vertices to 6dp, percentages to
/// 2dp, time to 3dp.
pub fn build_output_document(layout: &Layout, board_width: f64, board_height: f64, execution_time_secs: f64) -> OutputDocument {
    let boards = layout
        .boards
        .iter()
        .enumerate()
        .map(|(board_id, board)| {
            let pieces = board
                .placements
                .iter()
                .map(|placed| OutputPiece {
                    piece_id: placed.piece_id,
                    position_x: round_to(placed.position.x, 2),
                    position_y: round_to(placed.position.y, 2),
                    angle: placed.angle,
                    data: placed
                        .world_vertices()
                        .iter()
                        .map(|v| [round_to(v.x, 6), round_to(v.y, 6)])
                        .collect(),
                })
                .collect::<Vec<_>>();
            OutputBoard {
                board_id,
                efficiency: round_to(board.efficiency() * 100.0, 2),
                piece_count: pieces.len(),
                pieces,
            }
        })
        .collect();

    OutputDocument {
        board_count: layout.boards.len(),
        board_x: board_width,
        board_y: board_height,
        total_efficiency: round_to(layout.efficiency() * 100.0, 2),
        execution_time: round_to(execution_time_secs, 3),
        boards,
    }
}

/// Serialize `document` to `path` as pretty-printed JSON. A write failure
/// here is reported to the caller but is not grounds to abort the process
/// with a non-zero exit code: the layout was already computed.
pub fn write_output(path: &std::path::Path, document: &OutputDocument) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating output file {}", path.display()))?;
    serde_json::to_writer_pretty(file, document).with_context(|| format!("writing output file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_historical_field_names() {
        let json = r#"{
            "board_x": 100.0,
            "board_y": 100.0,
            "distance_between_boards": 1.0,
            "distance_between_peaces": 2.0,
            "peaces": [
                { "angle": [0, 90], "data": [[0,0],[10,0],[10,10],[0,10]] }
            ]
        }"#;
        let raw: RawInput = serde_json::from_str(json).unwrap();
        let input = to_input_descriptor(raw);
        assert_eq!(input.pieces.len(), 1);
        assert_eq!(input.pieces[0].allowed_angles, vec![0, 90]);
        assert!((input.distance_between_pieces - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rounding_matches_spec_precision() {
        assert_eq!(round_to(1.23456789, 2), 1.23);
        assert_eq!(round_to(1.23456789, 6), 1.234568);
        assert_eq!(round_to(33.333333, 2), 33.33);
    }

    #[test]
    fn output_document_shape_for_empty_layout() {
        let layout = Layout::default();
        let doc = build_output_document(&layout, 100.0, 100.0, 0.125);
        assert_eq!(doc.board_count, 0);
        assert_eq!(doc.execution_time, 0.125);
        assert!(doc.boards.is_empty());
    }
}
