//! SAN token grammar: decoding one move token into its components.
//!
//! A decoded token is not yet a move; resolution against the live legal-move
//! set happens in [`crate::notation::pgn`]. Castling accepts both the
//! letter-O and digit-zero spellings.

use crate::board::piece::PieceKind;
use crate::board::square::Square;
use crate::errors::SanError;

/// A SAN move token decomposed into its grammar elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanMove {
    pub piece: PieceKind,
    pub destination: Square,
    pub promotion: Option<PieceKind>,
    pub is_capture: bool,
    /// Disambiguation fragment: origin file and/or rank when given.
    pub from_file: Option<u8>,
    pub from_rank: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedSan {
    CastleKingside,
    CastleQueenside,
    Move(SanMove),
}

/// Strip trailing check/mate/annotation punctuation (`+`, `#`, `!`, `?`).
pub fn trim_annotation_suffix(token: &str) -> &str {
    token.trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'))
}

/// Decode a single cleaned SAN token.
pub fn parse_san(token: &str) -> Result<ParsedSan, SanError> {
    match token {
        "O-O" | "0-0" => return Ok(ParsedSan::CastleKingside),
        "O-O-O" | "0-0-0" => return Ok(ParsedSan::CastleQueenside),
        _ => {}
    }

    let invalid = || SanError::InvalidToken(token.to_owned());

    // The grammar below slices by byte position; SAN is ASCII-only, so
    // anything else is unresolvable rather than a panic.
    if !token.is_ascii() {
        return Err(invalid());
    }
    let mut rest = token;

    // Optional trailing promotion piece, with or without the '=' marker.
    let mut promotion = None;
    if let Some(last) = rest.chars().last() {
        if let Some(kind) = PieceKind::from_san_letter(last) {
            if kind != PieceKind::King && rest.len() > 2 {
                promotion = Some(kind);
                rest = &rest[..rest.len() - 1];
                rest = rest.strip_suffix('=').unwrap_or(rest);
            }
        }
    }

    // Leading piece letter; pawns are implicit.
    let mut piece = PieceKind::Pawn;
    if let Some(first) = rest.chars().next() {
        if let Some(kind) = PieceKind::from_san_letter(first) {
            piece = kind;
            rest = &rest[1..];
        }
    }

    let is_capture = rest.contains('x');
    let rest: String = rest.chars().filter(|c| *c != 'x').collect();

    if rest.len() < 2 {
        return Err(invalid());
    }
    let (disambiguation, dest_text) = rest.split_at(rest.len() - 2);
    let destination = Square::from_algebraic(dest_text).ok_or_else(invalid)?;

    let mut from_file = None;
    let mut from_rank = None;
    for c in disambiguation.chars() {
        match c {
            'a'..='h' if from_file.is_none() => from_file = Some(c as u8 - b'a'),
            '1'..='8' if from_rank.is_none() => from_rank = Some(c as u8 - b'1'),
            _ => return Err(invalid()),
        }
    }

    if promotion.is_some() && piece != PieceKind::Pawn {
        return Err(invalid());
    }

    Ok(ParsedSan::Move(SanMove {
        piece,
        destination,
        promotion,
        is_capture,
        from_file,
        from_rank,
    }))
}

#[cfg(test)]
mod tests {
    use super::{parse_san, trim_annotation_suffix, ParsedSan};
    use crate::board::piece::PieceKind;
    use crate::board::square::Square;
    use crate::errors::SanError;

    fn sq(text: &str) -> Square {
        Square::from_algebraic(text).expect("test square should parse")
    }

    fn decoded(token: &str) -> super::SanMove {
        match parse_san(token).expect("token should decode") {
            ParsedSan::Move(san) => san,
            other => panic!("expected a move token, got {other:?}"),
        }
    }

    #[test]
    fn pawn_push_and_piece_moves() {
        let e4 = decoded("e4");
        assert_eq!(e4.piece, PieceKind::Pawn);
        assert_eq!(e4.destination, sq("e4"));
        assert!(!e4.is_capture);

        let nf3 = decoded("Nf3");
        assert_eq!(nf3.piece, PieceKind::Knight);
        assert_eq!(nf3.destination, sq("f3"));
    }

    #[test]
    fn captures_and_disambiguation() {
        let exd5 = decoded("exd5");
        assert!(exd5.is_capture);
        assert_eq!(exd5.from_file, Some(4));
        assert_eq!(exd5.destination, sq("d5"));

        let nbd2 = decoded("Nbd2");
        assert_eq!(nbd2.from_file, Some(1));
        assert_eq!(nbd2.from_rank, None);

        let r1e2 = decoded("R1e2");
        assert_eq!(r1e2.from_rank, Some(0));

        let full = decoded("Qh4e1");
        assert_eq!(full.from_file, Some(7));
        assert_eq!(full.from_rank, Some(3));
    }

    #[test]
    fn promotion_spellings() {
        let with_equals = decoded("e8=Q");
        assert_eq!(with_equals.promotion, Some(PieceKind::Queen));
        let without = decoded("e8Q");
        assert_eq!(without.promotion, Some(PieceKind::Queen));
        let capture_promo = decoded("bxa8=N");
        assert!(capture_promo.is_capture);
        assert_eq!(capture_promo.promotion, Some(PieceKind::Knight));
    }

    #[test]
    fn castling_spellings() {
        assert_eq!(parse_san("O-O"), Ok(ParsedSan::CastleKingside));
        assert_eq!(parse_san("0-0"), Ok(ParsedSan::CastleKingside));
        assert_eq!(parse_san("O-O-O"), Ok(ParsedSan::CastleQueenside));
        assert_eq!(parse_san("0-0-0"), Ok(ParsedSan::CastleQueenside));
    }

    #[test]
    fn suffix_trimming() {
        assert_eq!(trim_annotation_suffix("Qh4#"), "Qh4");
        assert_eq!(trim_annotation_suffix("Nf3!?"), "Nf3");
        assert_eq!(trim_annotation_suffix("e4"), "e4");
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(parse_san("x").is_err());
        assert!(parse_san("Zf3").is_err());
        assert!(parse_san("e9").is_err());
        assert!(parse_san("").is_err());
    }

    #[test]
    fn non_ascii_tokens_are_rejected_not_sliced() {
        assert_eq!(
            parse_san("é5"),
            Err(SanError::InvalidToken("é5".to_owned()))
        );
        assert_eq!(
            parse_san("Nxé4"),
            Err(SanError::InvalidToken("Nxé4".to_owned()))
        );
    }
}
