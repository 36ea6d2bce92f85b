//! Chess position representation and game logic.
//!
//! Uses a 144-square mailbox (12x12 with a two-square offboard border) for
//! move generation and make/unmake, so ray scans run off the edge into
//! sentinel squares instead of needing bounds checks. Supports full chess
//! rules: castling, en passant, promotion, and draw detection (material,
//! 50-move, repetition).
//!
//! # Example
//! ```
//! use chenard_engine::board::Board;
//!
//! let mut board = Board::new();
//! let moves = board.generate_legal_moves();
//! println!("Starting position has {} legal moves", moves.len());
//! ```

mod attacks;
mod draw;
mod fen;
mod make_unmake;
mod movegen;
mod zobrist;

#[cfg(test)]
mod tests;

use crate::types::{
    spiece_index, Color, Move, Offset, Piece, PieceKind, BOARD_SIZE, PIECE_ARRAY_SIZE, SF_BCHECK,
    SF_BKMOVED, SF_BKRMOVED, SF_BQRMOVED, SF_WCHECK, SF_WKMOVED, SF_WKRMOVED, SF_WQRMOVED,
};

/// Size of the approximate repetition-count table. Prime, so the hash
/// modulo this size distributes evenly across the table.
pub const REPEAT_HASH_SIZE: usize = 70_001;

/// Bound on the best-path (principal variation) array.
pub const MAX_BESTPATH_DEPTH: usize = 50;

/// A chess position: the mailbox, side to move, castling/check flags,
/// material/inventory accounting, and the bookkeeping make/unmake and
/// draw detection need.
#[derive(Clone)]
pub struct Board {
    pub(crate) squares: [Piece; BOARD_SIZE],
    pub(crate) white_to_move: bool,
    pub(crate) flags: u16,
    pub(crate) inventory: [i16; PIECE_ARRAY_SIZE],
    pub(crate) wmaterial: i32,
    pub(crate) bmaterial: i32,
    pub(crate) king_offset: [Offset; 2],
    pub(crate) prev_move: Move,
    pub(crate) ply: i32,
    pub(crate) history: Vec<Move>,
    pub(crate) initial_fen: Option<String>,
    pub(crate) edit_ply: i32,
    pub(crate) last_cap_or_pawn: i32,
    pub(crate) cached_hash: u32,
    pub(crate) repeat_table: Vec<u8>,
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

impl Board {
    /// An empty board (all squares `Piece::Empty` except the two-wide
    /// offboard border). Used by `try_from_fen` before placing pieces.
    #[must_use]
    pub fn empty() -> Board {
        let mut squares = [Piece::Offboard; BOARD_SIZE];
        for y in 2..=9 {
            for x in 2..=9 {
                squares[Offset::new(x, y).0 as usize] = Piece::Empty;
            }
        }
        Board {
            squares,
            white_to_move: true,
            flags: 0,
            inventory: [0; PIECE_ARRAY_SIZE],
            wmaterial: 0,
            bmaterial: 0,
            king_offset: [Offset(0), Offset(0)],
            prev_move: Move::null(),
            ply: 0,
            history: Vec::new(),
            initial_fen: None,
            edit_ply: 0,
            last_cap_or_pawn: 0,
            cached_hash: 0,
            repeat_table: vec![0; REPEAT_HASH_SIZE],
        }
    }

    /// The standard initial chess position.
    #[must_use]
    pub fn new() -> Board {
        Board::try_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap_or_else(|e| crate::error::fatal(&format!("built-in initial FEN rejected: {e}")))
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        if self.white_to_move {
            Color::White
        } else {
            Color::Black
        }
    }

    #[must_use]
    pub fn piece_at(&self, offset: Offset) -> Piece {
        self.squares[offset.0 as usize]
    }

    /// Write a piece (or clear with `Piece::Empty`) at `offset`, maintaining
    /// inventory counts, material totals, and king-offset tracking. This is
    /// the low-level primitive make/unmake and FEN loading build on; it does
    /// NOT touch castling flags, side-to-move, ply, or the hash — callers
    /// that need those semantics use `make_move`/`unmake_move` instead.
    pub(crate) fn set_square(&mut self, offset: Offset, piece: Piece) {
        let old = self.squares[offset.0 as usize];
        if let Piece::Occupied(color, kind) = old {
            self.inventory[spiece_index(color, kind)] -= 1;
            match color {
                Color::White => self.wmaterial -= kind.raw_value(),
                Color::Black => self.bmaterial -= kind.raw_value(),
            }
        }
        self.squares[offset.0 as usize] = piece;
        if let Piece::Occupied(color, kind) = piece {
            self.inventory[spiece_index(color, kind)] += 1;
            if kind == PieceKind::King {
                self.king_offset[color_index(color)] = offset;
            }
            match color {
                Color::White => self.wmaterial += kind.raw_value(),
                Color::Black => self.bmaterial += kind.raw_value(),
            }
        }
    }

    #[must_use]
    pub fn king_offset(&self, color: Color) -> Offset {
        self.king_offset[color_index(color)]
    }

    #[must_use]
    pub fn in_check(&self, color: Color) -> bool {
        match color {
            Color::White => self.flags & SF_WCHECK != 0,
            Color::Black => self.flags & SF_BCHECK != 0,
        }
    }

    #[must_use]
    pub fn can_castle_kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.flags & (SF_WKMOVED | SF_WKRMOVED) == 0,
            Color::Black => self.flags & (SF_BKMOVED | SF_BKRMOVED) == 0,
        }
    }

    #[must_use]
    pub fn can_castle_queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.flags & (SF_WKMOVED | SF_WQRMOVED) == 0,
            Color::Black => self.flags & (SF_BKMOVED | SF_BQRMOVED) == 0,
        }
    }

    #[must_use]
    pub fn material(&self, color: Color) -> i32 {
        match color {
            Color::White => self.wmaterial,
            Color::Black => self.bmaterial,
        }
    }

    #[must_use]
    pub fn inventory_count(&self, color: Color, kind: PieceKind) -> i16 {
        self.inventory[spiece_index(color, kind)]
    }

    #[must_use]
    pub fn ply(&self) -> i32 {
        self.ply
    }

    #[must_use]
    pub fn prev_move(&self) -> Move {
        self.prev_move
    }

    #[must_use]
    pub fn cached_hash(&self) -> u32 {
        self.cached_hash
    }

    #[must_use]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.initial_fen.is_some()
    }

    #[must_use]
    pub fn initial_fen(&self) -> Option<&str> {
        self.initial_fen.as_deref()
    }

    /// Mark the board as starting from an explicit edit: records the FEN
    /// this position was set up from and the ply it was set up at. There is
    /// no history to replay before an edit, so repetition detection stays
    /// disabled for edited boards (a documented limitation, not silently
    /// re-enabled).
    pub(crate) fn mark_edited(&mut self, fen: String) {
        self.initial_fen = Some(fen);
        self.edit_ply = self.ply;
    }

    /// Recompute the full hash from scratch (used by `try_from_fen` and by
    /// tests verifying the incremental update matches). Equivalent to the
    /// original engine's `CalcHash`.
    #[must_use]
    pub fn calc_hash(&self) -> u32 {
        let mut hash = 0u32;
        for y in 2..=9 {
            for x in 2..=9 {
                let offset = Offset::new(x, y);
                hash ^= zobrist::piece_square_key(self.piece_at(offset), offset.0 as usize);
            }
        }
        if !self.white_to_move {
            hash ^= zobrist::side_to_move_key();
        }
        hash
    }

    pub(crate) fn piece_square_key(piece: Piece, offset: Offset) -> u32 {
        zobrist::piece_square_key(piece, offset.0 as usize)
    }

    pub(crate) fn side_to_move_key() -> u32 {
        zobrist::side_to_move_key()
    }

    /// The square the moving piece ends up on, resolved for every move
    /// kind including the ones whose raw destination byte is a special
    /// code rather than a board offset (castle, en passant, promotion).
    /// Notation formatting needs this; `make_move`/`unmake_move` recompute
    /// the same squares internally rather than calling back into this.
    #[must_use]
    pub fn move_destination(&self, mv: Move) -> Offset {
        if let Some(dest) = mv.dest_offset() {
            return dest;
        }
        let side = self.side_to_move();
        let from = mv.source();
        let rank = match side {
            Color::White => 2,
            Color::Black => 9,
        };
        if mv.is_castle_kingside() {
            return Offset::new(8, rank);
        }
        if mv.is_castle_queenside() {
            return Offset::new(4, rank);
        }
        if mv.is_en_passant() {
            let file = if mv.is_en_passant_east() { from.file() + 1 } else { from.file() - 1 };
            let dest_rank = from.rank() + if side == Color::White { 1 } else { -1 };
            return Offset::from_file_rank(file, dest_rank);
        }
        if mv.is_promotion() {
            if mv.is_promotion_capture() {
                let east = mv.raw_dest() & 0xF0 == 0x90;
                let file = if east { from.file() + 1 } else { from.file() - 1 };
                let dest_rank = from.rank() + if side == Color::White { 1 } else { -1 };
                return Offset::from_file_rank(file, dest_rank);
            }
            let delta = crate::types::pawn_push_delta(side);
            return from
                .add_delta(delta)
                .unwrap_or_else(|| crate::error::fatal("promotion destination off board"));
        }
        crate::error::fatal("move has no resolvable destination")
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl PartialEq for Board {
    /// Positions are equal iff every field defining "the same position"
    /// matches: board content, side to move,
    /// castling/check flags, material, king offsets, and the previous move
    /// (needed to reconstruct the en-passant target). History, ply, and
    /// the repetition table are bookkeeping, not position identity.
    fn eq(&self, other: &Self) -> bool {
        self.squares == other.squares
            && self.white_to_move == other.white_to_move
            && self.flags == other.flags
            && self.inventory == other.inventory
            && self.wmaterial == other.wmaterial
            && self.bmaterial == other.bmaterial
            && self.king_offset == other.king_offset
            && self.prev_move == other.prev_move
            && self.cached_hash == other.cached_hash
    }
}
