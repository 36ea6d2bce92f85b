//! Piece identity and the 12-kind/EMPTY/OFFBOARD square-content model.

use std::fmt;

/// Side to move / side owning a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_white(self) -> bool {
        matches!(self, Color::White)
    }
}

/// The six piece kinds, independent of color. Values mirror the original
/// engine's `P_INDEX..K_INDEX` ordering so promotion nibbles line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    #[inline]
    #[must_use]
    pub const fn from_index(idx: u8) -> Option<PieceKind> {
        match idx {
            0 => Some(PieceKind::Pawn),
            1 => Some(PieceKind::Knight),
            2 => Some(PieceKind::Bishop),
            3 => Some(PieceKind::Rook),
            4 => Some(PieceKind::Queen),
            5 => Some(PieceKind::King),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Parse an upper- or lowercase piece letter ('N','B','R','Q','K', or
    /// 'P'/'p' for a pawn) as used by the piece-letter prefix of a SAN move.
    #[inline]
    #[must_use]
    pub fn from_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Parse a promotion letter ('q','r','b', or 'n', case-insensitive).
    /// Pawns and kings can never be promoted to, so those are rejected.
    #[inline]
    #[must_use]
    pub fn from_promotion_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'q' => Some(PieceKind::Queen),
            'r' => Some(PieceKind::Rook),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            _ => None,
        }
    }

    /// Raw material value, matching the original engine's `RawPieceValues`
    /// table (pawn=10, knight=31, bishop=33, rook=50, queen=90, king=35).
    /// The king's raw value is never summed into material totals but is
    /// kept for completeness of the lookup table.
    #[inline]
    #[must_use]
    pub const fn raw_value(self) -> i32 {
        match self {
            PieceKind::Pawn => 10,
            PieceKind::Knight => 31,
            PieceKind::Bishop => 33,
            PieceKind::Rook => 50,
            PieceKind::Queen => 90,
            PieceKind::King => 35,
        }
    }
}

/// Mailbox cell payload: one of the 12 piece kinds, EMPTY, or OFFBOARD.
///
/// The mailbox *coordinate* is `types::square::Offset`, kept as a distinct
/// type to avoid confusing a cell's content with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Piece {
    Occupied(Color, PieceKind),
    Empty,
    Offboard,
}

impl Piece {
    #[inline]
    #[must_use]
    pub const fn white(kind: PieceKind) -> Piece {
        Piece::Occupied(Color::White, kind)
    }

    #[inline]
    #[must_use]
    pub const fn black(kind: PieceKind) -> Piece {
        Piece::Occupied(Color::Black, kind)
    }

    #[inline]
    #[must_use]
    pub const fn color(self) -> Option<Color> {
        match self {
            Piece::Occupied(c, _) => Some(c),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(self) -> Option<PieceKind> {
        match self {
            Piece::Occupied(_, k) => Some(k),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_color(self, side: Color) -> bool {
        matches!(self, Piece::Occupied(c, _) if c as u8 == side as u8)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Piece::Empty)
    }

    #[inline]
    #[must_use]
    pub const fn is_offboard(self) -> bool {
        matches!(self, Piece::Offboard)
    }

    /// Flat 0..11 piece index, fitting in 4 bits: white pieces first
    /// (P,N,B,R,Q,K) then black.
    #[inline]
    #[must_use]
    pub const fn piece_index(self) -> Option<u8> {
        match self {
            Piece::Occupied(Color::White, k) => Some(k as u8),
            Piece::Occupied(Color::Black, k) => Some(6 + k as u8),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Piece> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::Occupied(color, kind))
    }

    #[must_use]
    pub fn to_fen_char(self) -> char {
        match self {
            Piece::Occupied(Color::White, k) => k.to_char().to_ascii_uppercase(),
            Piece::Occupied(Color::Black, k) => k.to_char(),
            Piece::Empty => '.',
            Piece::Offboard => '#',
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_char())
    }
}

/// Alternate semantic index into `PIECE_ARRAY_SIZE` slots, used for piece
/// counts (`SPIECE_INDEX` in the original engine): side bit (0 or 8) ORed
/// with the piece-kind index (0..5), so white and black never collide and
/// the array can be indexed directly without branching on color.
pub const PIECE_ARRAY_SIZE: usize = 16;

#[inline]
#[must_use]
pub const fn spiece_index(color: Color, kind: PieceKind) -> usize {
    let side = match color {
        Color::White => 0,
        Color::Black => 8,
    };
    side + kind as usize
}
