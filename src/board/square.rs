//! Board coordinates and algebraic conversions.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and the internal
//! file/rank representation reused by SAN, PGN, and wire-message components.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A board coordinate. `file` 0 is the a-file, `rank` 0 is White's first rank.
///
/// Both components are always in `0..=7`; construct through [`Square::new`]
/// or [`Square::from_index`] to keep that invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    #[inline]
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file > 7 || rank > 7 {
            None
        } else {
            Some(Self { file, rank })
        }
    }

    /// Square from a flat index (`0 == a1`, `7 == h1`, `63 == h8`).
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        if index > 63 {
            None
        } else {
            Some(Self {
                file: (index % 8) as u8,
                rank: (index / 8) as u8,
            })
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.rank as usize * 8 + self.file as usize
    }

    /// Shift by a file/rank delta, `None` when the result leaves the board.
    #[inline]
    pub fn offset(self, d_file: i8, d_rank: i8) -> Option<Self> {
        let file = self.file as i8 + d_file;
        let rank = self.rank as i8 + d_rank;
        if (0..=7).contains(&file) && (0..=7).contains(&rank) {
            Some(Self {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    /// Parse algebraic coordinates (for example: "e4").
    pub fn from_algebraic(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        if !(b'a'..=b'h').contains(&bytes[0]) || !(b'1'..=b'8').contains(&bytes[1]) {
            return None;
        }
        Some(Self {
            file: bytes[0] - b'a',
            rank: bytes[1] - b'1',
        })
    }

    #[inline]
    pub fn file_char(self) -> char {
        char::from(b'a' + self.file)
    }

    #[inline]
    pub fn rank_char(self) -> char {
        char::from(b'1' + self.rank)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

#[cfg(test)]
mod tests {
    use super::Square;

    #[test]
    fn round_trip_algebraic_conversions() {
        let a1 = Square::from_algebraic("a1").expect("a1 should parse");
        assert_eq!(a1.index(), 0);
        let h8 = Square::from_algebraic("h8").expect("h8 should parse");
        assert_eq!(h8.index(), 63);
        assert_eq!(a1.to_string(), "a1");
        assert_eq!(h8.to_string(), "h8");
    }

    #[test]
    fn rejects_out_of_range_input() {
        assert!(Square::from_algebraic("i1").is_none());
        assert!(Square::from_algebraic("a9").is_none());
        assert!(Square::from_algebraic("e44").is_none());
        assert!(Square::new(8, 0).is_none());
    }

    #[test]
    fn offset_stays_on_board() {
        let e4 = Square::from_algebraic("e4").expect("e4 should parse");
        assert_eq!(e4.offset(0, 1), Square::from_algebraic("e5"));
        let a1 = Square::from_algebraic("a1").expect("a1 should parse");
        assert!(a1.offset(-1, 0).is_none());
        assert!(a1.offset(0, -1).is_none());
    }
}
