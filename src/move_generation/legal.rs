//! Full legal move generation pipeline and terminal-state detection.
//!
//! Orchestrates piece-wise pseudo-legal generation, applies each candidate to
//! a scratch board, and discards moves that leave the mover's own king
//! attacked. Enumeration order is stable: occupied squares are scanned in
//! flat index order and each piece kind emits its moves in a fixed pattern,
//! so "first candidate" tie-breaks are reproducible everywhere.

use crate::board::board::Board;
use crate::board::piece::{CastlingRights, Color, Piece, PieceKind};
use crate::board::square::Square;
use crate::move_generation::chess_move::Move;
use crate::move_generation::king::generate_king_moves;
use crate::move_generation::knight::generate_knight_moves;
use crate::move_generation::pawn::generate_pawn_moves;
use crate::move_generation::sliders::{
    generate_bishop_moves, generate_queen_moves, generate_rook_moves,
};

/// Terminal classification for the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
}

pub fn pseudo_legal_moves(
    board: &Board,
    side: Color,
    rights: CastlingRights,
    en_passant: Option<Square>,
    out: &mut Vec<Move>,
) {
    for (from, piece) in board.pieces() {
        if piece.color != side {
            continue;
        }
        match piece.kind {
            PieceKind::Pawn => generate_pawn_moves(board, from, side, en_passant, out),
            PieceKind::Knight => generate_knight_moves(board, from, side, out),
            PieceKind::Bishop => generate_bishop_moves(board, from, side, out),
            PieceKind::Rook => generate_rook_moves(board, from, side, out),
            PieceKind::Queen => generate_queen_moves(board, from, side, out),
            PieceKind::King => generate_king_moves(board, from, side, rights, out),
        }
    }
}

/// The exact legal-move set for `side`, in stable order.
pub fn legal_moves(
    board: &Board,
    side: Color,
    rights: CastlingRights,
    en_passant: Option<Square>,
) -> Vec<Move> {
    let mut pseudo = Vec::with_capacity(64);
    pseudo_legal_moves(board, side, rights, en_passant, &mut pseudo);

    let mut legal = Vec::with_capacity(pseudo.len());
    for mv in pseudo {
        let mut scratch = board.clone();
        apply_move_to_board(&mut scratch, mv, en_passant);

        // Illegal if own king is attacked after the move. Covers en-passant
        // discovered attacks because the captured pawn is already lifted.
        let king_safe = match scratch.king_square(side) {
            Some(king) => !scratch.is_attacked(king, side.opposite()),
            None => false,
        };
        if king_safe {
            legal.push(mv);
        }
    }
    legal
}

/// Apply a move to the board only: piece relocation, capture removal
/// (including the en-passant victim square), castling rook hop, and
/// promotion kind change (piece identity is preserved). Returns the captured
/// piece, if any. Castling rights / clocks / side bookkeeping live in the
/// game engine.
pub fn apply_move_to_board(
    board: &mut Board,
    mv: Move,
    en_passant: Option<Square>,
) -> Option<Piece> {
    let Some(mut piece) = board.take(mv.from) else {
        return None;
    };

    let mut captured = board.take(mv.to);

    // En passant: the captured pawn sits behind the destination square.
    if piece.kind == PieceKind::Pawn
        && captured.is_none()
        && mv.to.file != mv.from.file
        && en_passant == Some(mv.to)
    {
        captured = board.take(Square {
            file: mv.to.file,
            rank: mv.from.rank,
        });
    }

    // Castling: the king travels two files; hop the rook over.
    if piece.kind == PieceKind::King && mv.from.file.abs_diff(mv.to.file) == 2 {
        let (rook_from_file, rook_to_file) = if mv.to.file == 6 { (7, 5) } else { (0, 3) };
        let rook_from = Square {
            file: rook_from_file,
            rank: mv.from.rank,
        };
        let rook_to = Square {
            file: rook_to_file,
            rank: mv.from.rank,
        };
        if let Some(rook) = board.take(rook_from) {
            board.put(rook_to, rook);
        }
    }

    if let Some(promotion) = mv.promotion {
        piece.kind = promotion;
    }
    board.put(mv.to, piece);

    captured
}

/// Checkmate when the side to move is in check with no legal moves,
/// stalemate when it has no legal moves without being in check.
pub fn evaluate_status(
    board: &Board,
    side: Color,
    rights: CastlingRights,
    en_passant: Option<Square>,
) -> GameStatus {
    if !legal_moves(board, side, rights, en_passant).is_empty() {
        return GameStatus::Ongoing;
    }
    if is_in_check(board, side) {
        GameStatus::Checkmate
    } else {
        GameStatus::Stalemate
    }
}

#[inline]
pub fn is_in_check(board: &Board, side: Color) -> bool {
    match board.king_square(side) {
        Some(king) => board.is_attacked(king, side.opposite()),
        None => false,
    }
}
