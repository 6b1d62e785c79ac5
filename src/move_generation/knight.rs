//! Pseudo-legal knight move generation from the fixed offset table.

use crate::board::board::{Board, KNIGHT_OFFSETS};
use crate::board::piece::Color;
use crate::board::square::Square;
use crate::move_generation::chess_move::Move;

pub fn generate_knight_moves(board: &Board, from: Square, color: Color, out: &mut Vec<Move>) {
    for (d_file, d_rank) in KNIGHT_OFFSETS {
        let Some(to) = from.offset(d_file, d_rank) else {
            continue;
        };
        match board.piece_at(to) {
            Some(piece) if piece.color == color => {}
            _ => out.push(Move::new(from, to)),
        }
    }
}
