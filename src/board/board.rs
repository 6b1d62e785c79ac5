//! Mailbox board: piece placement and attack queries.
//!
//! The board is a 64-slot `Square -> Option<Piece>` mapping with an
//! incrementally maintained king-square cache per color. Attack queries walk
//! attacker patterns outward from the queried square, with each attacker kind
//! checked in turn; pawns use their capture (diagonal) pattern here, never
//! the push pattern.

use serde::{Deserialize, Serialize};

use crate::board::piece::{Color, Piece, PieceKind};
use crate::board::square::Square;

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BoardRepr", into = "BoardRepr")]
pub struct Board {
    squares: [Option<Piece>; 64],
    kings: [Option<Square>; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [None; 64],
            kings: [None; 2],
        }
    }

    /// Standard initial position. Piece identities are assigned in square
    /// index order so two peers setting up independently agree on every id.
    pub fn standard_setup() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Self::empty();
        let mut next_id = 0u8;
        let mut place = |board: &mut Self, file: u8, rank: u8, kind: PieceKind, color: Color| {
            let square = Square { file, rank };
            board.put(
                square,
                Piece {
                    kind,
                    color,
                    id: crate::board::piece::PieceId(next_id),
                },
            );
            next_id += 1;
        };

        for file in 0..8 {
            place(&mut board, file, 0, BACK_RANK[file as usize], Color::White);
        }
        for file in 0..8 {
            place(&mut board, file, 1, PieceKind::Pawn, Color::White);
        }
        for file in 0..8 {
            place(&mut board, file, 6, PieceKind::Pawn, Color::Black);
        }
        for file in 0..8 {
            place(&mut board, file, 7, BACK_RANK[file as usize], Color::Black);
        }

        board
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// Place a piece, overwriting whatever occupied the square.
    pub fn put(&mut self, square: Square, piece: Piece) {
        if piece.kind == PieceKind::King {
            self.kings[piece.color.index()] = Some(square);
        }
        self.squares[square.index()] = Some(piece);
    }

    /// Remove and return the piece on a square, if any.
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.squares[square.index()].take();
        if let Some(p) = piece {
            if p.kind == PieceKind::King {
                self.kings[p.color.index()] = None;
            }
        }
        piece
    }

    /// O(1) king lookup from the incrementally maintained cache.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.kings[color.index()]
    }

    /// All occupied squares in flat index order (the crate's canonical,
    /// deterministic scan order).
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares.iter().enumerate().filter_map(|(index, slot)| {
            slot.map(|piece| {
                let square = Square::from_index(index).unwrap_or(Square { file: 0, rank: 0 });
                (square, piece)
            })
        })
    }

    /// True if any piece of `by` color pseudo-legally reaches `square`,
    /// ignoring own-king safety.
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        // Pawn capture pattern: a pawn attacks diagonally forward, so look
        // one rank back along the attacker's advance direction.
        for d_file in [-1i8, 1] {
            if let Some(from) = square.offset(d_file, -by.forward()) {
                if let Some(piece) = self.piece_at(from) {
                    if piece.color == by && piece.kind == PieceKind::Pawn {
                        return true;
                    }
                }
            }
        }

        for (d_file, d_rank) in KNIGHT_OFFSETS {
            if let Some(from) = square.offset(d_file, d_rank) {
                if let Some(piece) = self.piece_at(from) {
                    if piece.color == by && piece.kind == PieceKind::Knight {
                        return true;
                    }
                }
            }
        }

        for (d_file, d_rank) in KING_OFFSETS {
            if let Some(from) = square.offset(d_file, d_rank) {
                if let Some(piece) = self.piece_at(from) {
                    if piece.color == by && piece.kind == PieceKind::King {
                        return true;
                    }
                }
            }
        }

        if self.ray_attacked(square, by, &ORTHOGONAL_DIRECTIONS, PieceKind::Rook) {
            return true;
        }
        if self.ray_attacked(square, by, &DIAGONAL_DIRECTIONS, PieceKind::Bishop) {
            return true;
        }

        false
    }

    fn ray_attacked(
        &self,
        square: Square,
        by: Color,
        directions: &[(i8, i8)],
        slider: PieceKind,
    ) -> bool {
        for &(d_file, d_rank) in directions {
            let mut current = square;
            while let Some(next) = current.offset(d_file, d_rank) {
                if let Some(piece) = self.piece_at(next) {
                    if piece.color == by && (piece.kind == slider || piece.kind == PieceKind::Queen)
                    {
                        return true;
                    }
                    break;
                }
                current = next;
            }
        }
        false
    }
}

/// Wire shape for the board: the list of occupied squares. Compact in JSON
/// and sidesteps the fixed-size-array limits of derived serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoardRepr {
    placements: Vec<Placement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Placement {
    square: Square,
    piece: Piece,
}

impl From<Board> for BoardRepr {
    fn from(board: Board) -> Self {
        Self {
            placements: board
                .pieces()
                .map(|(square, piece)| Placement { square, piece })
                .collect(),
        }
    }
}

impl From<BoardRepr> for Board {
    fn from(repr: BoardRepr) -> Self {
        let mut board = Board::empty();
        for placement in repr.placements {
            board.put(placement.square, placement.piece);
        }
        board
    }
}
