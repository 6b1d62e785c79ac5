//! Crate root module declarations for the Tandem Chess core.
//!
//! This file exposes all top-level subsystems (board model, move generation,
//! game engine, SAN/PGN notation, and the peer sync protocol) so binaries,
//! tests, and external tooling can import stable module paths.

pub mod board {
    pub mod board;
    pub mod piece;
    pub mod square;
}

pub mod move_generation {
    pub mod chess_move;
    pub mod king;
    pub mod knight;
    pub mod legal;
    pub mod pawn;
    pub mod perft;
    pub mod sliders;
}

pub mod game {
    pub mod engine;
    pub mod state;
}

pub mod notation {
    pub mod pgn;
    pub mod san;
}

pub mod sync {
    pub mod message;
    pub mod session;
}

pub mod utils {
    pub mod render;
}

pub mod errors;
