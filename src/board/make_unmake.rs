//! Make/unmake move machinery.
//!
//! `make_move` records an [`UnmakeInfo`] snapshot, applies the move
//! according to its kind, updates material/inventory/castling/check state,
//! toggles side to move, bumps ply and the repetition table, and updates
//! the cached hash incrementally. `unmake_move` is the exact inverse.

use crate::types::{
    pawn_push_delta, Color, Move, Offset, Piece, PieceKind, UnmakeInfo, SF_BCHECK, SF_BKMOVED,
    SF_BKRMOVED, SF_BQRMOVED, SF_WCHECK, SF_WKMOVED, SF_WKRMOVED, SF_WQRMOVED,
};

use super::Board;

impl Board {
    /// Apply `mv` (assumed pseudo-legal) to the board. Returns the
    /// snapshot needed to undo it.
    pub fn make_move(&mut self, mv: Move) -> UnmakeInfo {
        let side = self.side_to_move();
        let from = mv.source();
        let info = UnmakeInfo {
            capture: Piece::Empty,
            flags: self.flags,
            wmaterial: self.wmaterial,
            bmaterial: self.bmaterial,
            prev_move: self.prev_move,
            last_cap_or_pawn: self.last_cap_or_pawn,
            cached_hash: self.cached_hash,
        };

        let moving_piece = self.piece_at(from);
        let mut info = info;

        if mv.is_castle_kingside() || mv.is_castle_queenside() {
            self.apply_castle(side, mv.is_castle_kingside());
            self.last_cap_or_pawn = self.ply;
        } else if mv.is_en_passant() {
            let dest = self.en_passant_destination(from, side, mv.is_en_passant_east());
            let captured_sq = Offset::new(dest.file() + 2, from.rank() + 2);
            info.capture = self.piece_at(captured_sq);
            self.remove_piece(captured_sq);
            self.move_piece(from, dest);
            self.last_cap_or_pawn = self.ply;
        } else if mv.is_promotion() {
            let dest = self.promotion_destination(from, side, mv);
            if mv.is_promotion_capture() {
                info.capture = self.piece_at(dest);
                self.remove_piece(dest);
            }
            self.remove_piece(from);
            self.place_piece(
                dest,
                Piece::Occupied(side, mv.promotion_kind().unwrap_or(PieceKind::Queen)),
            );
            self.last_cap_or_pawn = self.ply;
        } else {
            let dest = mv.dest_offset().unwrap_or_else(|| crate::error::fatal("non-special move missing destination"));
            let captured = self.piece_at(dest);
            if !captured.is_empty() {
                info.capture = captured;
                self.remove_piece(dest);
                self.last_cap_or_pawn = self.ply;
            }
            if moving_piece.kind() == Some(PieceKind::Pawn) {
                self.last_cap_or_pawn = self.ply;
            }
            self.move_piece(from, dest);
        }

        self.update_castling_rights_on_move(from, mv);
        self.white_to_move = !self.white_to_move;
        self.ply += 1;
        self.prev_move = mv;
        self.history.push(mv);

        self.recompute_check_flags();
        self.bump_repetition();

        info
    }

    /// Undo `mv`, restoring state from `info` exactly, including the
    /// cached hash and the repetition-table byte.
    pub fn unmake_move(&mut self, mv: Move, info: UnmakeInfo) {
        self.unbump_repetition();
        self.ply -= 1;
        self.white_to_move = !self.white_to_move;
        self.history.pop();
        let side = self.side_to_move();
        let from = mv.source();

        if mv.is_castle_kingside() || mv.is_castle_queenside() {
            self.undo_castle(side, mv.is_castle_kingside());
        } else if mv.is_en_passant() {
            let dest = self.en_passant_destination(from, side, mv.is_en_passant_east());
            self.move_piece(dest, from);
            let captured_sq = Offset::new(dest.file() + 2, from.rank() + 2);
            self.set_square(captured_sq, info.capture);
        } else if mv.is_promotion() {
            let dest = self.promotion_destination(from, side, mv);
            self.set_square(dest, info.capture);
            self.set_square(from, Piece::Occupied(side, PieceKind::Pawn));
        } else {
            let dest = mv.dest_offset().unwrap_or_else(|| crate::error::fatal("non-special move missing destination"));
            self.move_piece(dest, from);
            self.set_square(dest, info.capture);
        }

        self.flags = info.flags;
        self.wmaterial = info.wmaterial;
        self.bmaterial = info.bmaterial;
        self.prev_move = info.prev_move;
        self.last_cap_or_pawn = info.last_cap_or_pawn;
        self.cached_hash = info.cached_hash;
    }

    fn move_piece(&mut self, from: Offset, to: Offset) {
        let piece = self.piece_at(from);
        self.cached_hash ^= Board::piece_square_key(piece, from);
        self.set_square(from, Piece::Empty);
        self.set_square(to, piece);
        self.cached_hash ^= Board::piece_square_key(piece, to);
    }

    /// Clear `at`, XORing the previously-occupying piece out of the hash.
    /// Used before overwriting a captured piece so its hash contribution
    /// is not silently lost.
    fn remove_piece(&mut self, at: Offset) {
        let piece = self.piece_at(at);
        self.cached_hash ^= Board::piece_square_key(piece, at);
        self.set_square(at, Piece::Empty);
    }

    /// Place `piece` at `at` (assumed empty), XORing it into the hash.
    fn place_piece(&mut self, at: Offset, piece: Piece) {
        self.set_square(at, piece);
        self.cached_hash ^= Board::piece_square_key(piece, at);
    }

    fn apply_castle(&mut self, side: Color, kingside: bool) {
        let rank = home_rank(side);
        let king_from = Offset::new(6, rank);
        let (king_to, rook_from, rook_to) = if kingside {
            (Offset::new(8, rank), Offset::new(9, rank), Offset::new(7, rank))
        } else {
            (Offset::new(4, rank), Offset::new(2, rank), Offset::new(5, rank))
        };
        self.move_piece(king_from, king_to);
        self.move_piece(rook_from, rook_to);
    }

    fn undo_castle(&mut self, side: Color, kingside: bool) {
        let rank = home_rank(side);
        let king_from = Offset::new(6, rank);
        let (king_to, rook_from, rook_to) = if kingside {
            (Offset::new(8, rank), Offset::new(9, rank), Offset::new(7, rank))
        } else {
            (Offset::new(4, rank), Offset::new(2, rank), Offset::new(5, rank))
        };
        self.move_piece(king_to, king_from);
        self.move_piece(rook_to, rook_from);
    }

    /// En-passant removes a pawn from the square *beside* the moving
    /// pawn's destination: the destination is the diagonal push square,
    /// and the captured pawn sits on `from`'s rank at the destination's
    /// file.
    fn en_passant_destination(&self, from: Offset, side: Color, east: bool) -> Offset {
        let file = if east { from.file() + 1 } else { from.file() - 1 };
        let rank = from.rank() + if side == Color::White { 1 } else { -1 };
        Offset::from_file_rank(file, rank)
    }

    fn promotion_destination(&self, from: Offset, side: Color, mv: Move) -> Offset {
        if mv.is_promotion_capture() {
            let east = mv.raw_dest() & 0xF0 == 0x90; // SPECIAL_MOVE_PROMOTE_CAP_EAST
            let file = if east { from.file() + 1 } else { from.file() - 1 };
            Offset::from_file_rank(file, from.rank() + if side == Color::White { 1 } else { -1 })
        } else {
            let delta = pawn_push_delta(side);
            from.add_delta(delta).unwrap_or_else(|| crate::error::fatal("promotion destination off board"))
        }
    }

    /// Castling-eligibility flags go off when a king moves, a rook moves
    /// off its home square, or a rook's home square is written to (e.g. it
    /// gets captured there).
    fn update_castling_rights_on_move(&mut self, from: Offset, mv: Move) {
        if mv.is_castle_kingside() || mv.is_castle_queenside() {
            let side = if self.white_to_move { Color::White } else { Color::Black };
            self.set_king_moved(side);
            return;
        }
        if from == Offset::new(6, 2) {
            self.flags |= SF_WKMOVED;
        } else if from == Offset::new(6, 9) {
            self.flags |= SF_BKMOVED;
        }
        if from == Offset::new(9, 2) {
            self.flags |= SF_WKRMOVED;
        } else if from == Offset::new(2, 2) {
            self.flags |= SF_WQRMOVED;
        } else if from == Offset::new(9, 9) {
            self.flags |= SF_BKRMOVED;
        } else if from == Offset::new(2, 9) {
            self.flags |= SF_BQRMOVED;
        }
        if let Some(dest) = mv.dest_offset() {
            if dest == Offset::new(9, 2) {
                self.flags |= SF_WKRMOVED;
            } else if dest == Offset::new(2, 2) {
                self.flags |= SF_WQRMOVED;
            } else if dest == Offset::new(9, 9) {
                self.flags |= SF_BKRMOVED;
            } else if dest == Offset::new(2, 9) {
                self.flags |= SF_BQRMOVED;
            }
        }
    }

    fn set_king_moved(&mut self, side: Color) {
        match side {
            Color::White => self.flags |= SF_WKMOVED | SF_WKRMOVED | SF_WQRMOVED,
            Color::Black => self.flags |= SF_BKMOVED | SF_BKRMOVED | SF_BQRMOVED,
        }
    }

    /// Recompute both sides' in-check flags from the position reached
    /// after the move that just toggled side to move.
    fn recompute_check_flags(&mut self) {
        self.flags &= !(SF_WCHECK | SF_BCHECK);
        if self.is_attacked_by(self.king_offset(Color::White), Color::Black) {
            self.flags |= SF_WCHECK;
        }
        if self.is_attacked_by(self.king_offset(Color::Black), Color::White) {
            self.flags |= SF_BCHECK;
        }
        // side-to-move hash bit: XOR it once per ply toggle
        self.cached_hash ^= Board::side_to_move_key();
    }

    fn bump_repetition(&mut self) {
        if self.is_edited() {
            return;
        }
        let idx = (self.cached_hash as usize) % self.repeat_table.len();
        let side_shift = if self.white_to_move { 4 } else { 0 };
        let byte = self.repeat_table[idx];
        let count = (byte >> side_shift) & 0x0F;
        if count < 0x0F {
            let new_count = count + 1;
            self.repeat_table[idx] =
                (byte & !(0x0F << side_shift)) | (new_count << side_shift);
        }
    }

    fn unbump_repetition(&mut self) {
        if self.is_edited() {
            return;
        }
        let idx = (self.cached_hash as usize) % self.repeat_table.len();
        let side_shift = if self.white_to_move { 4 } else { 0 };
        let byte = self.repeat_table[idx];
        let count = (byte >> side_shift) & 0x0F;
        if count > 0 {
            let new_count = count - 1;
            self.repeat_table[idx] =
                (byte & !(0x0F << side_shift)) | (new_count << side_shift);
        }
    }

    /// Exact repeat count for the current position, obtained by replaying
    /// the game from the start and counting matching positions. The
    /// repetition byte table is only an approximate hint; this is the
    /// authoritative recount.
    #[must_use]
    pub fn exact_repetition_count(&self) -> u32 {
        if self.is_edited() {
            return 0;
        }
        let mut scratch = Board::new();
        let mut count = if scratch == *self { 1 } else { 0 };
        for &mv in &self.history {
            scratch.make_move(mv);
            if scratch == *self {
                count += 1;
            }
        }
        count
    }
}

fn home_rank(side: Color) -> i32 {
    match side {
        Color::White => 2,
        Color::Black => 9,
    }
}
