//! Pseudo-legal pawn move generation.

use crate::board::board::Board;
use crate::board::piece::{Color, PieceKind};
use crate::board::square::Square;
use crate::move_generation::chess_move::Move;

/// Promotion kinds in the fixed emission order used everywhere in the crate.
pub const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

pub fn generate_pawn_moves(
    board: &Board,
    from: Square,
    color: Color,
    en_passant: Option<Square>,
    out: &mut Vec<Move>,
) {
    let forward = color.forward();
    let start_rank = match color {
        Color::White => 1,
        Color::Black => 6,
    };
    let promotion_rank = match color {
        Color::White => 7,
        Color::Black => 0,
    };

    // Single push, then double push from the starting rank when both
    // intervening squares are empty.
    if let Some(one) = from.offset(0, forward) {
        if board.piece_at(one).is_none() {
            push_with_promotions(from, one, promotion_rank, out);

            if from.rank == start_rank {
                if let Some(two) = one.offset(0, forward) {
                    if board.piece_at(two).is_none() {
                        out.push(Move::new(from, two));
                    }
                }
            }
        }
    }

    // Diagonal captures and en passant.
    for d_file in [-1i8, 1] {
        let Some(to) = from.offset(d_file, forward) else {
            continue;
        };
        if let Some(target) = board.piece_at(to) {
            if target.color != color {
                push_with_promotions(from, to, promotion_rank, out);
            }
        } else if en_passant == Some(to) {
            out.push(Move::new(from, to));
        }
    }
}

fn push_with_promotions(from: Square, to: Square, promotion_rank: u8, out: &mut Vec<Move>) {
    if to.rank == promotion_rank {
        for kind in PROMOTION_KINDS {
            out.push(Move::promoting(from, to, kind));
        }
    } else {
        out.push(Move::new(from, to));
    }
}
