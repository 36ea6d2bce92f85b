//! Attack tests: is a given square attacked by a given side?
//!
//! Used by check detection after every move and by the move-generation
//! post-filter that removes moves leaving the mover's king exposed.

use crate::types::{
    king_deltas, pawn_attack_deltas, slider_dirs, Color, Offset, Piece, PieceKind, KNIGHT_DELTAS,
};

use super::Board;

impl Board {
    /// True if `side` attacks `target` in the current board contents.
    /// Enumerates the eight pawn attack squares (from the target's
    /// perspective, i.e. the squares a pawn of `side` would need to stand
    /// on to capture onto `target`), the knight jumps, the four bishop/
    /// queen diagonals, the four rook/queen files/ranks, and the eight
    /// king squares.
    #[must_use]
    pub fn is_attacked_by(&self, target: Offset, side: Color) -> bool {
        // Pawns: a pawn of `side` attacks `target` if it stands on one of
        // the squares diagonally "behind" target from the attacker's point
        // of view, i.e. target minus the attacker's own attack deltas.
        for delta in pawn_attack_deltas(side) {
            if let Some(from) = target.add_delta(-delta) {
                if self.piece_at(from) == Piece::Occupied(side, PieceKind::Pawn) {
                    return true;
                }
            }
        }

        for delta in KNIGHT_DELTAS {
            if let Some(from) = target.add_delta(delta) {
                if self.piece_at(from) == Piece::Occupied(side, PieceKind::Knight) {
                    return true;
                }
            }
        }

        for delta in king_deltas() {
            if let Some(from) = target.add_delta(delta) {
                if self.piece_at(from) == Piece::Occupied(side, PieceKind::King) {
                    return true;
                }
            }
        }

        for &delta in slider_dirs(PieceKind::Bishop) {
            if self.ray_hits(target, delta, side, &[PieceKind::Bishop, PieceKind::Queen]) {
                return true;
            }
        }

        for &delta in slider_dirs(PieceKind::Rook) {
            if self.ray_hits(target, delta, side, &[PieceKind::Rook, PieceKind::Queen]) {
                return true;
            }
        }

        false
    }

    /// Scan outward from `target` along `delta` until hitting a non-empty
    /// or offboard square; true if the first piece found belongs to `side`
    /// and is one of `kinds`.
    fn ray_hits(&self, target: Offset, delta: i32, side: Color, kinds: &[PieceKind]) -> bool {
        let mut cur = target;
        loop {
            cur = match cur.add_delta(delta) {
                Some(o) => o,
                None => return false,
            };
            match self.piece_at(cur) {
                Piece::Empty => continue,
                Piece::Offboard => return false,
                Piece::Occupied(c, k) => return c == side && kinds.contains(&k),
            }
        }
    }

    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_attacked_by(self.king_offset(color), color.opposite())
    }
}
