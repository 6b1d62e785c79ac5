//! Perft node counting for move-generation validation.
//!
//! Walks the legal move tree to a fixed depth and counts leaf nodes; the
//! known perft values for the standard initial position (20 / 400 / 8902 ...)
//! pin down generator correctness.

use crate::game::engine::GameEngine;
use crate::game::state::GameState;
use crate::move_generation::legal::{apply_move_to_board, legal_moves};

pub fn perft(state: &GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(
        &state.board,
        state.side_to_move,
        state.castling_rights,
        state.en_passant,
    );
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in moves {
        let mut next = state.clone();
        let captured = apply_move_to_board(&mut next.board, mv, next.en_passant);
        next.note_move_applied(mv, captured);
        nodes += perft(&next, depth - 1);
    }
    nodes
}

/// Perft from a live engine's current position.
pub fn perft_from_engine(engine: &GameEngine, depth: u8) -> u64 {
    perft(engine.state(), depth)
}
