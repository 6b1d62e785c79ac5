//! Pseudo-legal king move generation, including castling.

use crate::board::board::{Board, KING_OFFSETS};
use crate::board::piece::{
    CastlingRights, Color, PieceKind, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE,
    CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE,
};
use crate::board::square::Square;
use crate::move_generation::chess_move::Move;

pub fn generate_king_moves(
    board: &Board,
    from: Square,
    color: Color,
    rights: CastlingRights,
    out: &mut Vec<Move>,
) {
    for (d_file, d_rank) in KING_OFFSETS {
        let Some(to) = from.offset(d_file, d_rank) else {
            continue;
        };
        match board.piece_at(to) {
            Some(piece) if piece.color == color => {}
            _ => out.push(Move::new(from, to)),
        }
    }

    generate_castling_moves(board, from, color, rights, out);
}

fn generate_castling_moves(
    board: &Board,
    from: Square,
    color: Color,
    rights: CastlingRights,
    out: &mut Vec<Move>,
) {
    let home_rank = match color {
        Color::White => 0,
        Color::Black => 7,
    };
    let king_home = Square {
        file: 4,
        rank: home_rank,
    };
    if from != king_home {
        return;
    }

    let enemy = color.opposite();

    // Cannot castle out of check.
    if board.is_attacked(from, enemy) {
        return;
    }

    let (kingside_right, queenside_right) = match color {
        Color::White => (CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE),
        Color::Black => (CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE),
    };

    // Kingside: f and g files empty, f and g not attacked, rook still home.
    if rights & kingside_right != 0
        && rook_on(board, 7, home_rank, color)
        && empty(board, 5, home_rank)
        && empty(board, 6, home_rank)
        && !attacked(board, 5, home_rank, enemy)
        && !attacked(board, 6, home_rank, enemy)
    {
        out.push(Move::new(
            from,
            Square {
                file: 6,
                rank: home_rank,
            },
        ));
    }

    // Queenside: b, c, d files empty; c and d (the king's path) not attacked.
    if rights & queenside_right != 0
        && rook_on(board, 0, home_rank, color)
        && empty(board, 1, home_rank)
        && empty(board, 2, home_rank)
        && empty(board, 3, home_rank)
        && !attacked(board, 2, home_rank, enemy)
        && !attacked(board, 3, home_rank, enemy)
    {
        out.push(Move::new(
            from,
            Square {
                file: 2,
                rank: home_rank,
            },
        ));
    }
}

fn rook_on(board: &Board, file: u8, rank: u8, color: Color) -> bool {
    matches!(
        board.piece_at(Square { file, rank }),
        Some(piece) if piece.color == color && piece.kind == PieceKind::Rook
    )
}

fn empty(board: &Board, file: u8, rank: u8) -> bool {
    board.piece_at(Square { file, rank }).is_none()
}

fn attacked(board: &Board, file: u8, rank: u8, by: Color) -> bool {
    board.is_attacked(Square { file, rank }, by)
}
