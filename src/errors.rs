//! Errors used throughout the core.
//!
//! Every failure mode here is recoverable: an illegal move leaves state
//! untouched, a bad SAN token halts parsing with a partial result, and a
//! protocol divergence is repaired through the resync handshake. Nothing in
//! this crate is fatal to the process.

use thiserror::Error;

use crate::move_generation::chess_move::Move;

/// Failures reported by the game engine's mutation surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The attempted move is not in the current legal set. State unchanged.
    #[error("illegal move {0} for the side to move")]
    IllegalMove(Move),
}

/// Failures while resolving SAN tokens against the live legal-move set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    /// Token could not be parsed or matched no legal move.
    #[error("unresolvable SAN token `{0}`")]
    InvalidToken(String),
    /// Token matched more than one legal move.
    #[error("ambiguous SAN token `{0}`")]
    AmbiguousToken(String),
}

/// Failures of the local peer-session surface. Remote divergence is not
/// listed here: it is detected, logged, and recovered via resync rather
/// than surfaced as an error.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no paired peer; the session has not completed role negotiation")]
    NotPaired,
    #[error("it is not the local player's turn")]
    NotYourTurn,
    #[error("color swap is only available to white before the first move")]
    SwapUnavailable,
    #[error("a reset request is already pending")]
    ResetAlreadyPending,
    #[error("no reset request from the peer is awaiting an answer")]
    NoPendingReset,
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("message encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
