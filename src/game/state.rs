//! Authoritative game state and the resync snapshot payload.
//!
//! `GameState` is the single model mutated by the game engine. It is created
//! at the standard initial position, mutated only through move application,
//! and replaced wholesale on reset or resync — never partially patched.

use serde::{Deserialize, Serialize};

use crate::board::board::Board;
use crate::board::piece::{
    castle_rights_of, CastlingRights, Color, Piece, PieceId, PieceKind, CASTLE_ALL,
    CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE, CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE,
};
use crate::board::square::Square;
use crate::move_generation::chess_move::Move;

/// A capture event, retained for cross-referencing by consumers
/// (for example capture-list and highlight UIs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub piece: Piece,
    pub by: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub side_to_move: Color,
    /// Locally observed moves, append-only. Cannot be reconstructed from a
    /// snapshot; `moves_made` is the counter that survives resync.
    pub history: Vec<Move>,
    /// Captured pieces partitioned by the capturing color.
    pub captured: [Vec<Piece>; 2],
    pub castling_rights: CastlingRights,
    /// En-passant target square, valid for exactly one ply.
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub moves_made: u32,
    pub last_move: Option<Move>,
    pub last_capture: Option<CaptureRecord>,
}

impl GameState {
    /// Fresh standard initial position. Deterministic, so two peers that
    /// reset independently hold byte-identical states.
    pub fn new_game() -> Self {
        Self {
            board: Board::standard_setup(),
            side_to_move: Color::White,
            history: Vec::new(),
            captured: [Vec::new(), Vec::new()],
            castling_rights: CASTLE_ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            moves_made: 0,
            last_move: None,
            last_capture: None,
        }
    }

    /// Record every non-board side effect of a move that was just applied to
    /// `self.board`: castling rights, en-passant target, clocks, capture
    /// lists, history, and the side-to-move flip.
    pub fn note_move_applied(&mut self, mv: Move, captured: Option<Piece>) {
        let mover = self.side_to_move;
        let moved_kind = self
            .board
            .piece_at(mv.to)
            .map(|piece| piece.kind)
            .unwrap_or(PieceKind::Pawn);
        let was_pawn_move = moved_kind == PieceKind::Pawn || mv.promotion.is_some();

        // Moving or capturing a king/rook permanently clears the
        // corresponding castling rights.
        if moved_kind == PieceKind::King {
            self.castling_rights &= !castle_rights_of(mover);
        }
        self.castling_rights &= !corner_right(mv.from);
        if let Some(captured_piece) = captured {
            if captured_piece.kind == PieceKind::Rook {
                self.castling_rights &= !corner_right(mv.to);
            }
        }

        // En-passant target is set only immediately after a double push and
        // cleared on every other move.
        self.en_passant = if moved_kind == PieceKind::Pawn && mv.from.rank.abs_diff(mv.to.rank) == 2
        {
            Square::new(mv.from.file, (mv.from.rank + mv.to.rank) / 2)
        } else {
            None
        };

        if was_pawn_move || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if mover == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        if let Some(captured_piece) = captured {
            self.captured[mover.index()].push(captured_piece);
            self.last_capture = Some(CaptureRecord {
                piece: captured_piece,
                by: mover,
            });
        } else {
            self.last_capture = None;
        }

        self.history.push(mv);
        self.last_move = Some(mv);
        self.moves_made += 1;
        self.side_to_move = mover.opposite();
    }

    /// Snapshot of this state relative to `perspective` (the sending peer's
    /// color): `captured_by_me` holds the pieces that side captured.
    pub fn snapshot(&self, perspective: Color) -> StateSnapshot {
        StateSnapshot {
            board: self.board.clone(),
            side_to_move: self.side_to_move,
            moves_made: self.moves_made,
            captured_by_me: self.captured[perspective.index()].clone(),
            captured_by_opponent: self.captured[perspective.opposite().index()].clone(),
            last_move_from: self.last_move.map(|mv| mv.from),
            last_move_to: self.last_move.map(|mv| mv.to),
            last_captured_piece_id: self.last_capture.map(|record| record.piece.id),
            last_capture_by_me: self.last_capture.map(|record| record.by == perspective),
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    /// Rebuild a full state from a snapshot produced by a peer of color
    /// `sender`. The snapshot is authoritative; nothing beyond structural
    /// well-formedness is validated. Move history cannot be recovered, so it
    /// restarts at the last transmitted move.
    pub fn from_snapshot(snapshot: &StateSnapshot, sender: Color) -> Self {
        let last_move = match (snapshot.last_move_from, snapshot.last_move_to) {
            (Some(from), Some(to)) => Some(Move::new(from, to)),
            _ => None,
        };
        let last_capture = snapshot.last_captured_piece_id.and_then(|id| {
            let by = match snapshot.last_capture_by_me {
                Some(true) => sender,
                _ => sender.opposite(),
            };
            let captured_by = if by == sender {
                &snapshot.captured_by_me
            } else {
                &snapshot.captured_by_opponent
            };
            captured_by
                .iter()
                .find(|piece| piece.id == id)
                .map(|piece| CaptureRecord { piece: *piece, by })
        });

        let mut captured: [Vec<Piece>; 2] = [Vec::new(), Vec::new()];
        captured[sender.index()] = snapshot.captured_by_me.clone();
        captured[sender.opposite().index()] = snapshot.captured_by_opponent.clone();

        Self {
            board: snapshot.board.clone(),
            side_to_move: snapshot.side_to_move,
            history: last_move.into_iter().collect(),
            captured,
            castling_rights: snapshot.castling_rights,
            en_passant: snapshot.en_passant,
            halfmove_clock: snapshot.halfmove_clock,
            fullmove_number: snapshot.fullmove_number,
            moves_made: snapshot.moves_made,
            last_move,
            last_capture,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new_game()
    }
}

/// The `syncState` payload: a complete, self-sufficient serialization of
/// game state. Captured-piece lists are relative to the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub board: Board,
    pub side_to_move: Color,
    pub moves_made: u32,
    pub captured_by_me: Vec<Piece>,
    pub captured_by_opponent: Vec<Piece>,
    pub last_move_from: Option<Square>,
    pub last_move_to: Option<Square>,
    pub last_captured_piece_id: Option<PieceId>,
    pub last_capture_by_me: Option<bool>,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

/// Castling right forfeited when a rook leaves or is captured on a corner.
fn corner_right(square: Square) -> CastlingRights {
    match (square.file, square.rank) {
        (7, 0) => CASTLE_WHITE_KINGSIDE,
        (0, 0) => CASTLE_WHITE_QUEENSIDE,
        (7, 7) => CASTLE_BLACK_KINGSIDE,
        (0, 7) => CASTLE_BLACK_QUEENSIDE,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::GameState;
    use crate::board::piece::{Color, CASTLE_ALL, CASTLE_BLACK_KINGSIDE, CASTLE_WHITE_KINGSIDE};
    use crate::board::square::Square;
    use crate::move_generation::chess_move::Move;
    use crate::move_generation::legal::apply_move_to_board;

    fn sq(text: &str) -> Square {
        Square::from_algebraic(text).expect("test square should parse")
    }

    fn play(state: &mut GameState, from: &str, to: &str) {
        let mv = Move::new(sq(from), sq(to));
        let captured = apply_move_to_board(&mut state.board, mv, state.en_passant);
        state.note_move_applied(mv, captured);
    }

    #[test]
    fn fresh_games_are_identical() {
        assert_eq!(GameState::new_game(), GameState::new_game());
    }

    #[test]
    fn double_push_sets_en_passant_for_one_ply() {
        let mut state = GameState::new_game();
        play(&mut state, "e2", "e4");
        assert_eq!(state.en_passant, Some(sq("e3")));
        play(&mut state, "g8", "f6");
        assert_eq!(state.en_passant, None);
    }

    #[test]
    fn rook_move_clears_only_its_own_right() {
        let mut state = GameState::new_game();
        play(&mut state, "h2", "h4");
        play(&mut state, "a7", "a6");
        play(&mut state, "h1", "h3");
        assert_eq!(state.castling_rights, CASTLE_ALL & !CASTLE_WHITE_KINGSIDE);
    }

    #[test]
    fn capturing_a_corner_rook_clears_that_right() {
        // 1.b4 g5 2.Bb2 g4 3.Bxh8: the long diagonal is open to h8.
        let mut state = GameState::new_game();
        play(&mut state, "b2", "b4");
        play(&mut state, "g7", "g5");
        play(&mut state, "c1", "b2");
        play(&mut state, "g5", "g4");
        play(&mut state, "b2", "h8");
        assert_eq!(state.castling_rights, CASTLE_ALL & !CASTLE_BLACK_KINGSIDE);
    }

    #[test]
    fn clocks_saturate_instead_of_wrapping() {
        let mut state = GameState::new_game();
        state.halfmove_clock = u16::MAX;
        state.fullmove_number = u16::MAX;
        play(&mut state, "g1", "f3");
        play(&mut state, "g8", "f6");
        assert_eq!(state.halfmove_clock, u16::MAX);
        assert_eq!(state.fullmove_number, u16::MAX);
    }

    #[test]
    fn snapshot_round_trip_reconstructs_state() {
        let mut state = GameState::new_game();
        play(&mut state, "e2", "e4");
        play(&mut state, "d7", "d5");
        play(&mut state, "e4", "d5");

        let snapshot = state.snapshot(Color::White);
        let rebuilt = GameState::from_snapshot(&snapshot, Color::White);

        assert_eq!(rebuilt.board, state.board);
        assert_eq!(rebuilt.side_to_move, state.side_to_move);
        assert_eq!(rebuilt.moves_made, 3);
        assert_eq!(rebuilt.captured, state.captured);
        assert_eq!(rebuilt.last_capture, state.last_capture);
        assert_eq!(rebuilt.castling_rights, state.castling_rights);
    }
}
