//! Pseudo-legal move generation and the legal-move post-filter.
//!
//! Two entry points per side: generate-all-moves and generate-captures
//! (the latter used by quiescence search). Each iterates the 8x8 interior,
//! dispatches per piece kind, and produces pseudo-legal moves; a post-pass
//! plays each move into a scratch copy of the board and discards it if it
//! leaves the mover's king attacked.

use crate::types::{
    pawn_attack_deltas, pawn_push_delta, slider_dirs, Color, Move, MoveList, Offset, Piece,
    PieceKind, BISHOP_DIRS, KNIGHT_DELTAS, QUEEN_DIRS, ROOK_DIRS,
};

use super::Board;

const PROMOTION_PIECES: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

impl Board {
    /// All pseudo-legal moves (quiet + captures + specials) for the side
    /// to move.
    #[must_use]
    pub fn generate_pseudo_legal_moves(&self) -> MoveList {
        self.generate_pseudo_legal(false)
    }

    /// Captures (and promotions, which are always at least as forcing as a
    /// capture) only, for quiescence search.
    #[must_use]
    pub fn generate_pseudo_legal_captures(&self) -> MoveList {
        self.generate_pseudo_legal(true)
    }

    fn generate_pseudo_legal(&self, captures_only: bool) -> MoveList {
        let mut list = MoveList::new();
        let side = self.side_to_move();
        for y in 2..=9 {
            for x in 2..=9 {
                let from = Offset::new(x, y);
                match self.piece_at(from) {
                    Piece::Occupied(c, kind) if c == side => {
                        self.generate_piece_moves(from, kind, side, captures_only, &mut list);
                    }
                    _ => {}
                }
            }
        }
        if !captures_only {
            self.generate_castles(side, &mut list);
        }
        list
    }

    fn generate_piece_moves(
        &self,
        from: Offset,
        kind: PieceKind,
        side: Color,
        captures_only: bool,
        list: &mut MoveList,
    ) {
        match kind {
            PieceKind::Pawn => self.generate_pawn_moves(from, side, captures_only, list),
            PieceKind::Knight => self.generate_jump_moves(from, side, &KNIGHT_DELTAS, captures_only, list),
            PieceKind::King => self.generate_jump_moves(from, side, &QUEEN_DIRS, captures_only, list),
            PieceKind::Bishop => self.generate_slides(from, side, &BISHOP_DIRS, captures_only, list),
            PieceKind::Rook => self.generate_slides(from, side, &ROOK_DIRS, captures_only, list),
            PieceKind::Queen => self.generate_slides(from, side, slider_dirs(PieceKind::Queen), captures_only, list),
        }
    }

    fn generate_jump_moves(
        &self,
        from: Offset,
        side: Color,
        deltas: &[i32],
        captures_only: bool,
        list: &mut MoveList,
    ) {
        for &delta in deltas {
            let Some(to) = from.add_delta(delta) else { continue };
            match self.piece_at(to) {
                Piece::Empty => {
                    if !captures_only {
                        list.push(Move::quiet(from, to));
                    }
                }
                Piece::Occupied(c, _) if c != side => list.push(Move::quiet(from, to)),
                _ => {}
            }
        }
    }

    fn generate_slides(
        &self,
        from: Offset,
        side: Color,
        dirs: &[i32],
        captures_only: bool,
        list: &mut MoveList,
    ) {
        for &delta in dirs {
            let mut to = from;
            loop {
                to = match to.add_delta(delta) {
                    Some(o) => o,
                    None => break,
                };
                match self.piece_at(to) {
                    Piece::Empty => {
                        if !captures_only {
                            list.push(Move::quiet(from, to));
                        }
                        continue;
                    }
                    Piece::Occupied(c, _) if c != side => {
                        list.push(Move::quiet(from, to));
                        break;
                    }
                    _ => break,
                }
            }
        }
    }

    fn generate_pawn_moves(&self, from: Offset, side: Color, captures_only: bool, list: &mut MoveList) {
        let push = pawn_push_delta(side);
        let start_rank = match side {
            Color::White => 1,
            Color::Black => 6,
        };
        let promo_rank = match side {
            Color::White => 7,
            Color::Black => 0,
        };

        if !captures_only {
            if let Some(one) = from.add_delta(push) {
                if self.piece_at(one).is_empty() {
                    if one.rank() == promo_rank {
                        for &kind in &PROMOTION_PIECES {
                            list.push(Move::promotion(from, kind));
                        }
                    } else {
                        list.push(Move::quiet(from, one));
                        if from.rank() == start_rank {
                            if let Some(two) = one.add_delta(push) {
                                if self.piece_at(two).is_empty() {
                                    list.push(Move::quiet(from, two));
                                }
                            }
                        }
                    }
                }
            }
        }

        for (i, delta) in pawn_attack_deltas(side).into_iter().enumerate() {
            let Some(to) = from.add_delta(delta) else { continue };
            let is_east = i == 0;
            match self.piece_at(to) {
                Piece::Occupied(c, _) if c != side => {
                    if to.rank() == promo_rank {
                        for &kind in &PROMOTION_PIECES {
                            if is_east {
                                list.push(Move::promotion_capture_east(from, kind));
                            } else {
                                list.push(Move::promotion_capture_west(from, kind));
                            }
                        }
                    } else {
                        list.push(Move::quiet(from, to));
                    }
                }
                _ => {}
            }
        }

        self.generate_en_passant(from, side, list);
    }

    /// En passant: the previous move must have been a two-square pawn push
    /// by the opponent landing adjacent to `from` on `from`'s rank.
    fn generate_en_passant(&self, from: Offset, side: Color, list: &mut MoveList) {
        let prev = self.prev_move();
        if prev.is_null() || prev.is_special() {
            return;
        }
        let Some(prev_to) = prev.dest_offset() else { return };
        let prev_from = prev.source();
        let opponent = side.opposite();
        if self.piece_at(prev_to) != Piece::Occupied(opponent, PieceKind::Pawn) {
            return;
        }
        // two-square push: rank delta of exactly 2
        if (prev_to.rank() - prev_from.rank()).abs() != 2 {
            return;
        }
        if prev_to.rank() != from.rank() {
            return;
        }
        if prev_to.file() == from.file() + 1 {
            list.push(Move::en_passant_east(from));
        } else if prev_to.file() == from.file() - 1 {
            list.push(Move::en_passant_west(from));
        }
    }

    fn generate_castles(&self, side: Color, list: &mut MoveList) {
        let rank = match side {
            Color::White => 2,
            Color::Black => 9,
        };
        let king_from = Offset::new(6, rank);
        if self.piece_at(king_from) != Piece::Occupied(side, PieceKind::King) {
            return;
        }
        if self.is_attacked_by(king_from, side.opposite()) {
            return;
        }
        if self.can_castle_kingside(side) {
            let f = Offset::new(7, rank);
            let g = Offset::new(8, rank);
            let h = Offset::new(9, rank);
            if self.piece_at(f).is_empty()
                && self.piece_at(g).is_empty()
                && self.piece_at(h) == Piece::Occupied(side, PieceKind::Rook)
                && !self.is_attacked_by(f, side.opposite())
                && !self.is_attacked_by(g, side.opposite())
            {
                list.push(Move::castle_kingside(king_from));
            }
        }
        if self.can_castle_queenside(side) {
            let d = Offset::new(5, rank);
            let c = Offset::new(4, rank);
            let b = Offset::new(3, rank);
            let a = Offset::new(2, rank);
            if self.piece_at(d).is_empty()
                && self.piece_at(c).is_empty()
                && self.piece_at(b).is_empty()
                && self.piece_at(a) == Piece::Occupied(side, PieceKind::Rook)
                && !self.is_attacked_by(d, side.opposite())
                && !self.is_attacked_by(c, side.opposite())
            {
                list.push(Move::castle_queenside(king_from));
            }
        }
    }

    /// Legal moves: pseudo-legal moves with the post-filter that discards
    /// any move leaving the mover's own king attacked.
    #[must_use]
    pub fn generate_legal_moves(&self) -> MoveList {
        self.filter_legal(self.generate_pseudo_legal_moves())
    }

    #[must_use]
    pub fn generate_legal_captures(&self) -> MoveList {
        self.filter_legal(self.generate_pseudo_legal_captures())
    }

    fn filter_legal(&self, candidates: MoveList) -> MoveList {
        let mover = self.side_to_move();
        let mut legal = MoveList::new();
        for &mv in candidates.iter() {
            let mut scratch = self.clone();
            scratch.make_move(mv);
            if !scratch.is_in_check(mover) {
                legal.push(mv);
            }
        }
        legal
    }

    /// True iff `mv` appears in the legal move list for the side to move.
    #[must_use]
    pub fn is_legal(&self, mv: Move) -> bool {
        self.generate_legal_moves().is_legal(mv)
    }

    /// True iff the side to move has no legal moves (checkmate or
    /// stalemate) -- the search and the command facade use this to decide
    /// "game over".
    #[must_use]
    pub fn game_is_over(&self) -> bool {
        self.generate_legal_moves().is_empty() || self.is_definite_draw()
    }
}
