//! Move notation: long algebraic (`e2e4`, `e7e8q`) and PGN/SAN
//! (`Nf3`, `Bxc6+`, `O-O`, `e8=Q#`) parsing and formatting.
//!
//! Both directions resolve ambiguity the same way: generate every legal
//! move, format or match each one, and require exactly one hit.

use crate::board::Board;
use crate::error::{MoveParseError, SanError};
use crate::types::{Color, Move, Offset, Piece, PieceKind};

impl Board {
    /// Format `mv` as five (or six, with promotion) characters of plain
    /// long algebraic notation: source square, destination square,
    /// optional lowercase promotion letter. No check/mate suffix.
    #[must_use]
    pub fn move_to_long_algebraic(&self, mv: Move) -> String {
        let mut out = format!("{}{}", mv.source(), self.move_destination(mv));
        if let Some(kind) = mv.promotion_kind() {
            out.push(kind.to_char().to_ascii_lowercase());
        }
        out
    }

    /// Parse a long-algebraic move string against the legal moves of the
    /// current position. Fails if the string is malformed or if zero or
    /// more than one legal move matches the parsed source/dest/promotion.
    pub fn parse_long_algebraic(&self, text: &str) -> Result<Move, MoveParseError> {
        let text = text.trim();
        if text.len() != 4 && text.len() != 5 {
            return Err(MoveParseError::InvalidLength { len: text.len() });
        }
        let from = Offset::from_algebraic(&text[0..2])
            .ok_or_else(|| MoveParseError::InvalidSquare { notation: text.to_string() })?;
        let to = Offset::from_algebraic(&text[2..4])
            .ok_or_else(|| MoveParseError::InvalidSquare { notation: text.to_string() })?;
        let promotion = if text.len() == 5 {
            let c = text.as_bytes()[4] as char;
            Some(
                PieceKind::from_promotion_char(c)
                    .ok_or(MoveParseError::InvalidPromotion { char: c })?,
            )
        } else {
            None
        };

        let moves = self.generate_legal_moves();
        let mut found = None;
        for &mv in moves.iter() {
            if mv.source() != from || self.move_destination(mv) != to {
                continue;
            }
            if mv.promotion_kind() != promotion {
                continue;
            }
            if found.is_some() {
                return Err(MoveParseError::IllegalMove { notation: text.to_string() });
            }
            found = Some(mv);
        }
        found.ok_or_else(|| MoveParseError::IllegalMove { notation: text.to_string() })
    }

    /// Format `mv` in PGN/SAN: piece letter (pawns omitted), minimal
    /// file/rank/both disambiguation, capture `x`, destination, `=`
    /// promotion, and a trailing `+`/`#` determined by playing the move out.
    #[must_use]
    pub fn move_to_san(&self, mv: Move) -> String {
        let mut san = String::new();

        if mv.is_castle_kingside() {
            san.push_str("O-O");
        } else if mv.is_castle_queenside() {
            san.push_str("O-O-O");
        } else {
            let from = mv.source();
            let piece = self.piece_at(from);
            let kind = piece.kind();
            let is_capture = mv.is_en_passant()
                || mv.is_promotion_capture()
                || !self.piece_at(self.move_destination(mv)).is_empty();

            if let Some(k) = kind {
                if k != PieceKind::Pawn {
                    san.push(k.to_char().to_ascii_uppercase());
                    let (needs_file, needs_rank) = self.disambiguation(mv, k);
                    if needs_file {
                        san.push((b'a' + from.file() as u8) as char);
                    }
                    if needs_rank {
                        san.push((b'1' + from.rank() as u8) as char);
                    }
                } else if is_capture {
                    san.push((b'a' + from.file() as u8) as char);
                }
            }

            if is_capture {
                san.push('x');
            }
            san.push_str(&self.move_destination(mv).to_string());
            if let Some(promo) = mv.promotion_kind() {
                san.push('=');
                san.push(promo.to_char().to_ascii_uppercase());
            }
        }

        let mut after = self.clone();
        after.make_move(mv);
        if after.generate_legal_moves().is_empty() && after.in_check(after.side_to_move()) {
            san.push('#');
        } else if after.in_check(after.side_to_move()) {
            san.push('+');
        }
        san
    }

    /// File/rank disambiguation needed among same-kind moves to the same
    /// destination, following PGN's file-then-rank-then-both preference.
    fn disambiguation(&self, mv: Move, kind: PieceKind) -> (bool, bool) {
        let from = mv.source();
        let dest = self.move_destination(mv);
        let side = self.piece_at(from).color();

        let rivals: Vec<Offset> = self
            .generate_legal_moves()
            .iter()
            .filter(|&&other| {
                other.source() != from
                    && self.move_destination(other) == dest
                    && self.piece_at(other.source()).kind() == Some(kind)
                    && self.piece_at(other.source()).color() == side
            })
            .map(|&other| other.source())
            .collect();

        if rivals.is_empty() {
            return (false, false);
        }
        let same_file = rivals.iter().any(|r| r.file() == from.file());
        let same_rank = rivals.iter().any(|r| r.rank() == from.rank());
        match (same_file, same_rank) {
            (false, _) => (true, false),
            (true, false) => (false, true),
            (true, true) => (true, true),
        }
    }

    /// Parse a PGN/SAN move string against the legal moves of the current
    /// position. Accepts a trailing `+`/`#`. Retries once by stripping a
    /// redundant rank or file disambiguator from the second character, to
    /// tolerate external generators that over-disambiguate.
    pub fn parse_san(&self, text: &str) -> Result<Move, SanError> {
        let text = text.trim().trim_end_matches(['+', '#']);
        if text.is_empty() {
            return Err(SanError::Empty);
        }

        if text == "O-O" || text == "0-0" {
            return self.find_castle(true, text);
        }
        if text == "O-O-O" || text == "0-0-0" {
            return self.find_castle(false, text);
        }

        if let Ok(mv) = self.parse_san_exact(text) {
            return Ok(mv);
        }
        if text.len() >= 2 {
            let mut stripped = String::with_capacity(text.len() - 1);
            stripped.push_str(&text[..1]);
            stripped.push_str(&text[2..]);
            if let Ok(mv) = self.parse_san_exact(&stripped) {
                return Ok(mv);
            }
        }
        Err(SanError::NoMatchingMove { san: text.to_string() })
    }

    fn find_castle(&self, kingside: bool, text: &str) -> Result<Move, SanError> {
        self.generate_legal_moves()
            .iter()
            .find(|m| if kingside { m.is_castle_kingside() } else { m.is_castle_queenside() })
            .copied()
            .ok_or_else(|| SanError::NoMatchingMove { san: text.to_string() })
    }

    fn parse_san_exact(&self, text: &str) -> Result<Move, SanError> {
        let bytes = text.as_bytes();
        let (kind, rest) = if bytes[0].is_ascii_uppercase() {
            (
                PieceKind::from_char(bytes[0] as char)
                    .ok_or_else(|| SanError::NoMatchingMove { san: text.to_string() })?,
                &text[1..],
            )
        } else {
            (PieceKind::Pawn, text)
        };

        let (disambig_file, disambig_rank, dest, promotion) = parse_san_tail(rest)
            .ok_or_else(|| SanError::NoMatchingMove { san: text.to_string() })?;

        let side = self.side_to_move();
        let candidates: Vec<Move> = self
            .generate_legal_moves()
            .iter()
            .copied()
            .filter(|&mv| {
                self.move_destination(mv) == dest
                    && self.piece_at(mv.source()) == Piece::Occupied(side, kind)
                    && mv.promotion_kind() == promotion
                    && disambig_file.map_or(true, |f| mv.source().file() == f)
                    && disambig_rank.map_or(true, |r| mv.source().rank() == r)
            })
            .collect();

        match candidates.len() {
            0 => Err(SanError::NoMatchingMove { san: text.to_string() }),
            1 => Ok(candidates[0]),
            _ => Err(SanError::AmbiguousMove { san: text.to_string() }),
        }
    }
}

/// Parse `[file][rank][x]<dest>[=promo]` into disambiguation hints, the
/// destination square, and an optional promotion kind.
fn parse_san_tail(rest: &str) -> Option<(Option<i32>, Option<i32>, Offset, Option<PieceKind>)> {
    let chars: Vec<char> = rest.chars().filter(|&c| c != 'x').collect();
    let (square_part, promo_part) = match chars.iter().position(|&c| c == '=') {
        Some(idx) => (&chars[..idx], &chars[idx + 1..]),
        None => (&chars[..], &chars[0..0]),
    };

    let promotion = match promo_part.first() {
        Some(&c) => Some(PieceKind::from_promotion_char(c.to_ascii_lowercase())?),
        None => None,
    };

    if square_part.len() < 2 {
        return None;
    }
    let dest_str: String = square_part[square_part.len() - 2..].iter().collect();
    let dest = Offset::from_algebraic(&dest_str)?;

    let mut disambig_file = None;
    let mut disambig_rank = None;
    for &c in &square_part[..square_part.len() - 2] {
        if c.is_ascii_lowercase() {
            disambig_file = Some(c as i32 - 'a' as i32);
        } else if c.is_ascii_digit() {
            disambig_rank = Some(c as i32 - '1' as i32);
        }
    }
    Some((disambig_file, disambig_rank, dest, promotion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn long_algebraic_round_trips_opening_moves() {
        let board = Board::new();
        for &mv in board.generate_legal_moves().iter() {
            let text = board.move_to_long_algebraic(mv);
            let parsed = board.parse_long_algebraic(&text).unwrap();
            assert_eq!(mv, parsed);
        }
    }

    #[test]
    fn long_algebraic_promotion_suffix() {
        let board = Board::try_from_fen("8/P6k/8/8/8/8/7K/8 w - - 0 1").unwrap();
        let mv = board.parse_long_algebraic("a7a8q").unwrap();
        assert_eq!(board.move_to_long_algebraic(mv), "a7a8q");
    }

    #[test]
    fn san_pawn_push() {
        let board = Board::new();
        let mv = board.parse_san("e4").unwrap();
        assert_eq!(board.move_to_san(mv), "e4");
    }

    #[test]
    fn san_knight_development() {
        let board = Board::new();
        let mv = board.parse_san("Nf3").unwrap();
        assert_eq!(board.move_to_san(mv), "Nf3");
    }

    #[test]
    fn san_castling() {
        let board =
            Board::try_from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let mv = board.parse_san("O-O").unwrap();
        assert!(mv.is_castle_kingside());
        assert_eq!(board.move_to_san(mv), "O-O");
        let mv = board.parse_san("O-O-O").unwrap();
        assert!(mv.is_castle_queenside());
        assert_eq!(board.move_to_san(mv), "O-O-O");
    }

    #[test]
    fn san_capture_and_promotion() {
        let board =
            Board::try_from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2")
                .unwrap();
        let mv = board.parse_san("exd5").unwrap();
        assert_eq!(board.move_to_san(mv), "exd5");

        let board = Board::try_from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1").unwrap();
        let mv = board.parse_san("a8=Q").unwrap();
        assert_eq!(mv.promotion_kind(), Some(PieceKind::Queen));
        assert_eq!(board.move_to_san(mv), "a8=Q");
    }

    #[test]
    fn san_disambiguates_by_file_and_rank() {
        let board = Board::try_from_fen("3k4/8/8/8/R6R/8/8/4K3 w - - 0 1").unwrap();
        let mv = board.parse_san("Rad4").unwrap();
        assert_eq!(mv.source().file(), 0);
        let mv = board.parse_san("Rhd4").unwrap();
        assert_eq!(mv.source().file(), 7);
    }

    #[test]
    fn san_check_and_mate_suffix() {
        let board = Board::try_from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mv = board.parse_san("Rh8").unwrap();
        assert_eq!(board.move_to_san(mv), "Rh8+");

        let board = Board::try_from_fen(
            "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2",
        )
        .unwrap();
        let mv = board.parse_san("Qh4").unwrap();
        assert_eq!(board.move_to_san(mv), "Qh4#");
    }

    #[test]
    fn san_tolerates_redundant_disambiguation() {
        let board = Board::new();
        // "Ng1f3" over-disambiguates; the second-character strip retries as "Nf3".
        let mv = board.parse_san("Ng1f3").unwrap();
        assert_eq!(board.move_to_san(mv), "Nf3");
    }
}
