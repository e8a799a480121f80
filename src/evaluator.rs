//! Packing evaluator: genome → layout → fitness.

use crate::model::{Board, Genome, InputDescriptor, Layout, MAX_BOARDS};
use crate::placer::place_piece_on_board;

/// Result of evaluating one genome: the layout it produced plus the derived
/// scalar statistics cached back onto the genome.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub layout: Layout,
    pub fitness: f64,
    pub board_count: usize,
    pub efficiency: f64,
}

/// Walk `genome.sequence` in placement order; for each piece id, try every
/// existing board before opening a fresh one (capped at [`MAX_BOARDS`]); a
/// piece that fits nowhere is marked un-placed and the walk continues.
pub fn evaluate_genome(genome: &Genome, input: &InputDescriptor) -> EvaluationOutcome {
    let mut layout = Layout::default();
    let mut unplaced = 0usize;

    for &piece_id in &genome.sequence {
        let piece = &input.pieces[piece_id];
        let rotation_idx = genome.rotation[piece_id];
        let mut placed_here = false;

        for board in &mut layout.boards {
            if place_piece_on_board(
                piece,
                rotation_idx,
                board,
                input.distance_between_boards,
                input.distance_between_pieces,
            ) {
                placed_here = true;
                break;
            }
        }

        if !placed_here && layout.boards.len() < MAX_BOARDS {
            let mut board = Board::new(input.board_width, input.board_height);
            if place_piece_on_board(
                piece,
                rotation_idx,
                &mut board,
                input.distance_between_boards,
                input.distance_between_pieces,
            ) {
                layout.boards.push(board);
                placed_here = true;
            }
        }

        if !placed_here {
            unplaced += 1;
        }
    }

    let board_count = layout.boards.len();
    let efficiency = layout.efficiency();
    let efficiency_pct = efficiency * 100.0;
    let fitness = 2.0 * efficiency_pct - 5.0 * board_count as f64 - 1000.0 * unplaced as f64;

    EvaluationOutcome { layout, fitness, board_count, efficiency }
}

/// Evaluate and cache the resulting scalar statistics on `genome`, returning
/// the layout it produced. Evaluating the same genome twice yields identical
/// results: the evaluator holds no state between calls.
pub fn evaluate_and_cache(genome: &mut Genome, input: &InputDescriptor) -> Layout {
    let outcome = evaluate_genome(genome, input);
    genome.fitness = Some(outcome.fitness);
    genome.board_count = Some(outcome.board_count);
    genome.efficiency = Some(outcome.efficiency);
    outcome.layout
}
