//! Pseudo-legal sliding piece generation (rook, bishop, queen).
//!
//! All three share one ray walker; rays extend until blocked, with the
//! blocking square included when it holds an enemy piece.

use crate::board::board::{Board, DIAGONAL_DIRECTIONS, ORTHOGONAL_DIRECTIONS};
use crate::board::piece::Color;
use crate::board::square::Square;
use crate::move_generation::chess_move::Move;

pub fn generate_rook_moves(board: &Board, from: Square, color: Color, out: &mut Vec<Move>) {
    walk_rays(board, from, color, &ORTHOGONAL_DIRECTIONS, out);
}

pub fn generate_bishop_moves(board: &Board, from: Square, color: Color, out: &mut Vec<Move>) {
    walk_rays(board, from, color, &DIAGONAL_DIRECTIONS, out);
}

pub fn generate_queen_moves(board: &Board, from: Square, color: Color, out: &mut Vec<Move>) {
    walk_rays(board, from, color, &ORTHOGONAL_DIRECTIONS, out);
    walk_rays(board, from, color, &DIAGONAL_DIRECTIONS, out);
}

fn walk_rays(
    board: &Board,
    from: Square,
    color: Color,
    directions: &[(i8, i8)],
    out: &mut Vec<Move>,
) {
    for &(d_file, d_rank) in directions {
        let mut current = from;
        while let Some(to) = current.offset(d_file, d_rank) {
            match board.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(piece) => {
                    if piece.color != color {
                        out.push(Move::new(from, to));
                    }
                    break;
                }
            }
            current = to;
        }
    }
}
