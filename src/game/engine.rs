//! The game engine: sole mutator of [`GameState`].
//!
//! Every caller that needs "the legal moves right now" — UI validation, SAN
//! resolution, network reconciliation — goes through this one surface, so the
//! three can never disagree.

use tracing::debug;

use crate::board::piece::Color;
use crate::errors::EngineError;
use crate::game::state::{CaptureRecord, GameState, StateSnapshot};
use crate::move_generation::chess_move::Move;
use crate::move_generation::legal::{
    apply_move_to_board, evaluate_status, is_in_check, legal_moves, GameStatus,
};

/// Outcome of a successfully applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub captured: Option<crate::board::piece::Piece>,
    pub status: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameEngine {
    state: GameState,
}

impl GameEngine {
    pub fn new() -> Self {
        Self {
            state: GameState::new_game(),
        }
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.state.side_to_move
    }

    /// The exact legal-move set for the side to move, in stable order.
    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(
            &self.state.board,
            self.state.side_to_move,
            self.state.castling_rights,
            self.state.en_passant,
        )
    }

    /// Whether applying `mv` would capture, with en passant counting as a
    /// capture even though the destination square is empty.
    pub fn move_is_capture(&self, mv: Move) -> bool {
        if let Some(target) = self.state.board.piece_at(mv.to) {
            return target.color != self.state.side_to_move;
        }
        let is_pawn = self
            .state
            .board
            .piece_at(mv.from)
            .map(|piece| piece.kind == crate::board::piece::PieceKind::Pawn)
            .unwrap_or(false);
        is_pawn && mv.from.file != mv.to.file && self.state.en_passant == Some(mv.to)
    }

    /// Apply `mv` if and only if it is in the current legal set (matched by
    /// from/to/promotion equality). On failure the state is unchanged.
    pub fn try_make_move(&mut self, mv: Move) -> Result<MoveOutcome, EngineError> {
        if !self.legal_moves().contains(&mv) {
            return Err(EngineError::IllegalMove(mv));
        }

        let captured = apply_move_to_board(&mut self.state.board, mv, self.state.en_passant);
        self.state.note_move_applied(mv, captured);

        let status = self.status();
        if status != GameStatus::Ongoing {
            debug!(%mv, ?status, "game reached terminal state");
        }

        Ok(MoveOutcome { captured, status })
    }

    /// Terminal classification for the side to move.
    pub fn status(&self) -> GameStatus {
        evaluate_status(
            &self.state.board,
            self.state.side_to_move,
            self.state.castling_rights,
            self.state.en_passant,
        )
    }

    pub fn in_check(&self) -> bool {
        is_in_check(&self.state.board, self.state.side_to_move)
    }

    pub fn last_capture(&self) -> Option<CaptureRecord> {
        self.state.last_capture
    }

    /// Replace the state with a fresh standard initial position.
    pub fn reset(&mut self) {
        self.state = GameState::new_game();
    }

    /// Snapshot the state relative to `perspective` (the sending side).
    pub fn snapshot(&self, perspective: Color) -> StateSnapshot {
        self.state.snapshot(perspective)
    }

    /// Replace the state wholesale from a peer snapshot. The snapshot is
    /// authoritative by protocol contract; applying the same snapshot twice
    /// leaves the state unchanged.
    pub fn load_snapshot(&mut self, snapshot: &StateSnapshot, sender: Color) {
        self.state = GameState::from_snapshot(snapshot, sender);
    }
}

#[cfg(test)]
mod tests {
    use super::GameEngine;
    use crate::board::piece::{Color, PieceId, PieceKind};
    use crate::board::square::Square;
    use crate::errors::EngineError;
    use crate::move_generation::chess_move::Move;
    use crate::move_generation::legal::GameStatus;

    fn sq(text: &str) -> Square {
        Square::from_algebraic(text).expect("test square should parse")
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(sq(from), sq(to))
    }

    fn make(engine: &mut GameEngine, from: &str, to: &str) {
        engine
            .try_make_move(mv(from, to))
            .expect("scripted move should be legal");
    }

    #[test]
    fn try_make_move_toggles_side_on_success() {
        let mut engine = GameEngine::new();
        assert_eq!(engine.side_to_move(), Color::White);
        make(&mut engine, "e2", "e4");
        assert_eq!(engine.side_to_move(), Color::Black);
    }

    #[test]
    fn illegal_move_leaves_state_untouched() {
        let mut engine = GameEngine::new();
        let before = engine.state().clone();
        let result = engine.try_make_move(mv("e2", "e5"));
        assert_eq!(
            result,
            Err(EngineError::IllegalMove(mv("e2", "e5")))
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn en_passant_removes_pawn_behind_destination() {
        // 1.e4 Nc6 2.e5 d5 3.exd6
        let mut engine = GameEngine::new();
        make(&mut engine, "e2", "e4");
        make(&mut engine, "b8", "c6");
        make(&mut engine, "e4", "e5");
        make(&mut engine, "d7", "d5");

        let capture = mv("e5", "d6");
        assert!(engine.move_is_capture(capture));
        let outcome = engine
            .try_make_move(capture)
            .expect("en passant should be legal");

        let captured = outcome.captured.expect("a pawn should be captured");
        assert_eq!(captured.kind, PieceKind::Pawn);
        assert!(engine.state().board.piece_at(sq("d5")).is_none());
        assert_eq!(
            engine.state().board.piece_at(sq("d6")).map(|p| p.kind),
            Some(PieceKind::Pawn)
        );
    }

    #[test]
    fn fools_mate_is_reported_as_checkmate() {
        // 1.f3 e5 2.g4 Qh4#
        let mut engine = GameEngine::new();
        make(&mut engine, "f2", "f3");
        make(&mut engine, "e7", "e5");
        make(&mut engine, "g2", "g4");
        let outcome = engine
            .try_make_move(mv("d8", "h4"))
            .expect("Qh4 should be legal");

        assert_eq!(outcome.status, GameStatus::Checkmate);
        assert_eq!(engine.side_to_move(), Color::White);
        assert!(engine.in_check());
        assert!(engine.legal_moves().is_empty());
    }

    #[test]
    fn castling_through_cleared_squares_is_legal() {
        let mut engine = GameEngine::new();
        for (from, to) in [
            ("e2", "e4"),
            ("e7", "e5"),
            ("g1", "f3"),
            ("b8", "c6"),
            ("f1", "c4"),
            ("g8", "f6"),
        ] {
            make(&mut engine, from, to);
        }
        assert!(engine.legal_moves().contains(&mv("e1", "g1")));
        make(&mut engine, "e1", "g1");
        assert_eq!(
            engine.state().board.piece_at(sq("f1")).map(|p| p.kind),
            Some(PieceKind::Rook)
        );
    }

    #[test]
    fn capture_records_keep_piece_identity() {
        let mut engine = GameEngine::new();
        make(&mut engine, "e2", "e4");
        make(&mut engine, "d7", "d5");
        let victim_id = engine
            .state()
            .board
            .piece_at(sq("d5"))
            .map(|p| p.id)
            .expect("black pawn should sit on d5");
        make(&mut engine, "e4", "d5");

        let record = engine.last_capture().expect("capture should be recorded");
        assert_eq!(record.piece.id, victim_id);
        assert_eq!(record.by, Color::White);
        assert_eq!(engine.state().captured[Color::White.index()].len(), 1);
    }

    #[test]
    fn reset_returns_to_identical_fresh_state() {
        let mut engine = GameEngine::new();
        make(&mut engine, "e2", "e4");
        engine.reset();
        assert_eq!(engine, GameEngine::new());
    }

    #[test]
    fn loading_the_same_snapshot_twice_is_idempotent() {
        let mut source = GameEngine::new();
        make(&mut source, "e2", "e4");
        make(&mut source, "d7", "d5");
        make(&mut source, "e4", "d5");
        let snapshot = source.snapshot(Color::White);

        let mut target = GameEngine::new();
        target.load_snapshot(&snapshot, Color::White);
        let once = target.clone();
        target.load_snapshot(&snapshot, Color::White);
        assert_eq!(target, once);
        assert_eq!(target.state().board, source.state().board);
    }

    #[test]
    fn promoted_piece_keeps_its_identity() {
        let mut engine = GameEngine::new();
        for (from, to) in [
            ("a2", "a4"),
            ("b7", "b5"),
            ("a4", "b5"),
            ("b8", "c6"),
            ("b5", "b6"),
            ("h7", "h6"),
            ("b6", "b7"),
            ("h6", "h5"),
        ] {
            make(&mut engine, from, to);
        }
        let pawn_id = engine
            .state()
            .board
            .piece_at(sq("b7"))
            .map(|p| p.id)
            .expect("white pawn should sit on b7");

        engine
            .try_make_move(Move::promoting(sq("b7"), sq("a8"), PieceKind::Queen))
            .expect("promotion capture should be legal");
        let queen = engine
            .state()
            .board
            .piece_at(sq("a8"))
            .expect("promoted queen expected");
        assert_eq!(queen.kind, PieceKind::Queen);
        assert_eq!(queen.id, PieceId(pawn_id.0));
    }
}
