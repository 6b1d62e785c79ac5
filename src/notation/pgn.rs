//! PGN main-line resolution and export.
//!
//! The resolver maps SAN tokens onto the engine's live legal-move set one
//! token at a time, advancing the engine as it goes. On failure it returns
//! the moves applied so far together with the offending token; the engine is
//! deliberately left at the position after the last good token so callers
//! can inspect exactly where replay stopped.

use thiserror::Error;

use crate::board::piece::{Color, PieceKind};
use crate::board::square::Square;
use crate::errors::{EngineError, SanError};
use crate::game::engine::GameEngine;
use crate::move_generation::chess_move::Move;
use crate::move_generation::legal::GameStatus;
use crate::notation::san::{parse_san, trim_annotation_suffix, ParsedSan, SanMove};

/// Replay halted: `applied` holds the moves resolved before `token` failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("PGN replay halted at token `{token}`: {error}")]
pub struct PgnFailure {
    pub applied: Vec<Move>,
    pub token: String,
    pub error: SanError,
}

/// Resolve the main line of `text` against `engine`, applying each move.
pub fn apply_pgn(engine: &mut GameEngine, text: &str) -> Result<Vec<Move>, PgnFailure> {
    let mut applied = Vec::new();

    for raw in tokenize_main_line(text) {
        let token = match raw {
            MainLineToken::Result(_) => break,
            MainLineToken::San(token) => token,
        };

        let cleaned = trim_annotation_suffix(&token);
        let resolved = parse_san(cleaned).and_then(|parsed| resolve(engine, &parsed, cleaned));
        match resolved {
            Ok(mv) => {
                // Resolution picked the move out of the legal set, so the
                // application cannot fail.
                if engine.try_make_move(mv).is_err() {
                    let error = SanError::InvalidToken(cleaned.to_owned());
                    return Err(PgnFailure {
                        applied,
                        token,
                        error,
                    });
                }
                applied.push(mv);
            }
            Err(error) => {
                return Err(PgnFailure {
                    applied,
                    token,
                    error,
                })
            }
        }
    }

    Ok(applied)
}

enum MainLineToken {
    San(String),
    Result(String),
}

/// Tokenize PGN movetext: strip comments and variations, split on
/// whitespace, peel glued move-number prefixes, and drop pure move numbers.
fn tokenize_main_line(text: &str) -> Vec<MainLineToken> {
    let stripped = strip_comments_and_variations(text);
    let mut tokens = Vec::new();

    for word in stripped.split_whitespace() {
        if is_result_token(word) {
            tokens.push(MainLineToken::Result(word.to_owned()));
            break;
        }

        // Compound tokens glue a move number to the move ("1.e4", "3...Nf6").
        let body = strip_move_number_prefix(word);
        if body.is_empty() {
            continue;
        }
        if is_result_token(body) {
            tokens.push(MainLineToken::Result(body.to_owned()));
            break;
        }
        tokens.push(MainLineToken::San(body.to_owned()));
    }

    tokens
}

/// Remove brace comments, semicolon-to-end-of-line comments, and
/// parenthesized variations (only the main line is kept).
fn strip_comments_and_variations(text: &str) -> String {
    let mut out = String::new();
    let mut brace_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut line_comment = false;

    for ch in text.chars() {
        match ch {
            '\n' => {
                line_comment = false;
                out.push(' ');
            }
            _ if line_comment => {}
            ';' if brace_depth == 0 && paren_depth == 0 => line_comment = true,
            '{' => brace_depth = brace_depth.saturating_add(1),
            '}' => brace_depth = brace_depth.saturating_sub(1),
            '(' if brace_depth == 0 => paren_depth = paren_depth.saturating_add(1),
            ')' if brace_depth == 0 => paren_depth = paren_depth.saturating_sub(1),
            _ if brace_depth == 0 && paren_depth == 0 => out.push(ch),
            _ => {}
        }
    }

    out
}

/// Peel a leading move number ("12.", "3...", or a bare number) off a token,
/// returning the move body (possibly empty).
fn strip_move_number_prefix(token: &str) -> &str {
    let digits = token.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return token;
    }
    let after_digits = &token[digits..];
    let dots = after_digits.chars().take_while(|c| *c == '.').count();
    if dots == 0 && !after_digits.is_empty() {
        // Digits followed by something other than dots ("1-0" etc.):
        // not a move number prefix.
        return token;
    }
    &after_digits[dots..]
}

fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

/// Filter the live legal-move set down to the single move the token names.
fn resolve(engine: &GameEngine, parsed: &ParsedSan, token: &str) -> Result<Move, SanError> {
    match parsed {
        ParsedSan::CastleKingside => resolve_castle(engine, 6, token),
        ParsedSan::CastleQueenside => resolve_castle(engine, 2, token),
        ParsedSan::Move(san) => resolve_san_move(engine, san, token),
    }
}

fn resolve_castle(engine: &GameEngine, king_file: u8, token: &str) -> Result<Move, SanError> {
    let home_rank = match engine.side_to_move() {
        Color::White => 0,
        Color::Black => 7,
    };
    let mv = Move::new(
        Square {
            file: 4,
            rank: home_rank,
        },
        Square {
            file: king_file,
            rank: home_rank,
        },
    );
    if engine.legal_moves().contains(&mv) {
        Ok(mv)
    } else {
        Err(SanError::InvalidToken(token.to_owned()))
    }
}

fn resolve_san_move(engine: &GameEngine, san: &SanMove, token: &str) -> Result<Move, SanError> {
    let board = &engine.state().board;
    let candidates: Vec<Move> = engine
        .legal_moves()
        .into_iter()
        .filter(|mv| {
            mv.to == san.destination
                && board.piece_at(mv.from).map(|p| p.kind) == Some(san.piece)
                && mv.promotion == san.promotion
                && engine.move_is_capture(*mv) == san.is_capture
                && san.from_file.map_or(true, |file| mv.from.file == file)
                && san.from_rank.map_or(true, |rank| mv.from.rank == rank)
        })
        .collect();

    // Exactly one surviving candidate is required. This deliberately also
    // rejects an undisambiguated pawn capture that more than one pawn could
    // play, matching the documented filter.
    match candidates.as_slice() {
        [] => Err(SanError::InvalidToken(token.to_owned())),
        [only] => Ok(*only),
        _ => Err(SanError::AmbiguousToken(token.to_owned())),
    }
}

/// Minimal-disambiguation SAN for a move that is legal right now.
pub fn san_for_move(engine: &GameEngine, mv: Move) -> Result<String, EngineError> {
    let legal = engine.legal_moves();
    if !legal.contains(&mv) {
        return Err(EngineError::IllegalMove(mv));
    }
    let board = &engine.state().board;
    let piece = board
        .piece_at(mv.from)
        .ok_or(EngineError::IllegalMove(mv))?;

    let mut san = String::new();
    if piece.kind == PieceKind::King && mv.from.file.abs_diff(mv.to.file) == 2 {
        san.push_str(if mv.to.file == 6 { "O-O" } else { "O-O-O" });
    } else {
        let is_capture = engine.move_is_capture(mv);

        if let Some(letter) = piece.kind.san_letter() {
            san.push(letter);

            let rivals: Vec<Move> = legal
                .iter()
                .copied()
                .filter(|other| {
                    other.from != mv.from
                        && other.to == mv.to
                        && board.piece_at(other.from).map(|p| p.kind) == Some(piece.kind)
                })
                .collect();
            if !rivals.is_empty() {
                let file_unique = rivals.iter().all(|other| other.from.file != mv.from.file);
                let rank_unique = rivals.iter().all(|other| other.from.rank != mv.from.rank);
                if file_unique {
                    san.push(mv.from.file_char());
                } else if rank_unique {
                    san.push(mv.from.rank_char());
                } else {
                    san.push(mv.from.file_char());
                    san.push(mv.from.rank_char());
                }
            }
        } else if is_capture {
            // Pawn captures always name the origin file.
            san.push(mv.from.file_char());
        }

        if is_capture {
            san.push('x');
        }
        san.push_str(&mv.to.to_string());
        if let Some(promotion) = mv.promotion {
            san.push('=');
            if let Some(letter) = promotion.san_letter() {
                san.push(letter);
            }
        }
    }

    // Check/mate suffix from the position after the move.
    let mut after = engine.clone();
    after.try_make_move(mv)?;
    match after.status() {
        GameStatus::Checkmate => san.push('#'),
        _ if after.in_check() => san.push('+'),
        _ => {}
    }

    Ok(san)
}

/// Export a played game as PGN movetext with standard headers.
pub fn write_pgn(history: &[Move], result: &str) -> Result<String, EngineError> {
    let result = normalize_result(result);
    let date = chrono::Local::now().format("%Y.%m.%d");

    let mut out = String::new();
    out.push_str("[Event \"Tandem Chess Game\"]\n");
    out.push_str("[Site \"Peer to Peer\"]\n");
    out.push_str(&format!("[Date \"{date}\"]\n"));
    out.push_str("[Round \"-\"]\n");
    out.push_str("[White \"White\"]\n");
    out.push_str("[Black \"Black\"]\n");
    out.push_str(&format!("[Result \"{result}\"]\n"));
    out.push('\n');

    let mut engine = GameEngine::new();
    let mut parts = Vec::with_capacity(history.len() + 1);
    for (ply, mv) in history.iter().enumerate() {
        let san = san_for_move(&engine, *mv)?;
        if ply % 2 == 0 {
            parts.push(format!("{}. {}", ply / 2 + 1, san));
        } else {
            parts.push(san);
        }
        engine.try_make_move(*mv)?;
    }
    parts.push(result.to_owned());
    out.push_str(&parts.join(" "));
    out.push('\n');

    Ok(out)
}

fn normalize_result(result: &str) -> &str {
    if is_result_token(result) {
        result
    } else {
        "*"
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_pgn, san_for_move, write_pgn};
    use crate::board::piece::PieceKind;
    use crate::board::square::Square;
    use crate::errors::SanError;
    use crate::game::engine::GameEngine;
    use crate::move_generation::chess_move::Move;

    fn sq(text: &str) -> Square {
        Square::from_algebraic(text).expect("test square should parse")
    }

    #[test]
    fn resolves_the_ruy_lopez_opening() {
        let mut engine = GameEngine::new();
        let moves = apply_pgn(&mut engine, "1. e4 e5 2. Nf3 Nc6 3. Bb5")
            .expect("main line should resolve");
        assert_eq!(moves.len(), 5);
        assert_eq!(
            engine.state().board.piece_at(sq("b5")).map(|p| p.kind),
            Some(PieceKind::Bishop)
        );
        assert_eq!(engine.state().moves_made, 5);
    }

    #[test]
    fn comments_variations_and_glued_numbers_are_handled() {
        let mut engine = GameEngine::new();
        let text = "1.e4 {best by test} e5 ; a line comment\n2.Nf3 (2. f4 exf4) 2...Nc6";
        let moves = apply_pgn(&mut engine, text).expect("annotated main line should resolve");
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn result_token_terminates_without_error() {
        let mut engine = GameEngine::new();
        let moves =
            apply_pgn(&mut engine, "1. e4 e5 1/2-1/2 2. Nf3").expect("result should terminate");
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn ambiguous_knight_token_is_rejected_with_partial_result() {
        // After 1.e4 e5 2.Ne2 Nc6 both knights can reach c3.
        let mut engine = GameEngine::new();
        let failure = apply_pgn(&mut engine, "1. e4 e5 2. Ne2 Nc6 3. Nc3")
            .expect_err("ambiguous token should fail");
        assert_eq!(failure.applied.len(), 4);
        assert_eq!(failure.token, "Nc3");
        assert_eq!(failure.error, SanError::AmbiguousToken("Nc3".to_owned()));
        // The engine reflects the moves applied up to the failing token.
        assert_eq!(engine.state().moves_made, 4);
    }

    #[test]
    fn disambiguated_knight_token_resolves() {
        let mut engine = GameEngine::new();
        let moves = apply_pgn(&mut engine, "1. e4 e5 2. Ne2 Nc6 3. Nbc3")
            .expect("disambiguated token should resolve");
        assert_eq!(moves.last(), Some(&Move::new(sq("b1"), sq("c3"))));
    }

    #[test]
    fn castling_resolves_for_both_spellings() {
        for spelling in ["O-O", "0-0"] {
            let mut engine = GameEngine::new();
            let text = format!("1. e4 e5 2. Nf3 Nc6 3. Bc4 Nf6 4. {spelling}");
            let moves = apply_pgn(&mut engine, &text).expect("castling should resolve");
            assert_eq!(moves.last(), Some(&Move::new(sq("e1"), sq("g1"))));
        }
    }

    #[test]
    fn en_passant_counts_as_a_capture() {
        let mut engine = GameEngine::new();
        let moves = apply_pgn(&mut engine, "1. e4 Nc6 2. e5 d5 3. exd6")
            .expect("en passant capture should resolve");
        assert_eq!(moves.last(), Some(&Move::new(sq("e5"), sq("d6"))));
        assert!(engine.state().board.piece_at(sq("d5")).is_none());
    }

    #[test]
    fn promotion_token_requires_matching_promotion_piece() {
        let mut engine = GameEngine::new();
        let text = "1. a4 b5 2. axb5 Nc6 3. b6 h6 4. b7 h5 5. bxa8=Q";
        let moves = apply_pgn(&mut engine, text).expect("promotion capture should resolve");
        assert_eq!(
            moves.last(),
            Some(&Move::promoting(sq("b7"), sq("a8"), PieceKind::Queen))
        );
    }

    #[test]
    fn non_ascii_token_halts_with_partial_result() {
        let mut engine = GameEngine::new();
        let failure =
            apply_pgn(&mut engine, "1. e4 é5").expect_err("non-ascii token should fail");
        assert_eq!(failure.applied.len(), 1);
        assert_eq!(failure.token, "é5");
        assert_eq!(failure.error, SanError::InvalidToken("é5".to_owned()));
        assert_eq!(engine.state().moves_made, 1);
    }

    #[test]
    fn unknown_token_halts_with_invalid_error() {
        let mut engine = GameEngine::new();
        let failure =
            apply_pgn(&mut engine, "1. e4 banana e5").expect_err("junk token should fail");
        assert_eq!(failure.applied.len(), 1);
        assert_eq!(failure.error, SanError::InvalidToken("banana".to_owned()));
    }

    #[test]
    fn write_pgn_emits_headers_and_movetext() {
        let mut engine = GameEngine::new();
        let moves =
            apply_pgn(&mut engine, "1. f3 e5 2. g4 Qh4#").expect("fools mate should resolve");

        let pgn = write_pgn(&moves, "0-1").expect("history should export");
        assert!(pgn.contains("[Event \"Tandem Chess Game\"]"));
        assert!(pgn.contains("[Result \"0-1\"]"));
        assert!(pgn.contains("1. f3 e5 2. g4 Qh4# 0-1"));

        // Exported movetext replays to the same position.
        let movetext: String = pgn
            .lines()
            .filter(|line| !line.starts_with('['))
            .collect::<Vec<_>>()
            .join(" ");
        let mut replay = GameEngine::new();
        let replayed = apply_pgn(&mut replay, &movetext).expect("exported PGN should replay");
        assert_eq!(replayed, moves);
    }
}
