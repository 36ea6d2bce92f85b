//! Draw detection: material draw, the 50-move rule, and repetition.

use crate::types::{Color, PieceKind};

use super::Board;

impl Board {
    /// True if neither side has enough material to force checkmate: no
    /// pawns/rooks/queens on board, and neither side has two bishops or a
    /// bishop+knight pair.
    #[must_use]
    pub fn is_material_draw(&self) -> bool {
        for color in [Color::White, Color::Black] {
            if self.inventory_count(color, PieceKind::Pawn) > 0
                || self.inventory_count(color, PieceKind::Rook) > 0
                || self.inventory_count(color, PieceKind::Queen) > 0
            {
                return false;
            }
        }
        for color in [Color::White, Color::Black] {
            let bishops = self.inventory_count(color, PieceKind::Bishop);
            let knights = self.inventory_count(color, PieceKind::Knight);
            if bishops >= 2 || (bishops >= 1 && knights >= 1) {
                return false;
            }
        }
        true
    }

    /// True if `ply - last_cap_or_pawn >= 100` (50 full moves with no
    /// capture or pawn advance by either side).
    #[must_use]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.ply - self.last_cap_or_pawn >= 100
    }

    /// True if the approximate repetition counter suggests a threefold
    /// repetition, verified by the authoritative replay-based recount.
    /// Disabled for edited positions: a board loaded mid-game from FEN has
    /// no history to replay, so repetition can never be confirmed there.
    /// This is a known, documented limitation, not an oversight.
    #[must_use]
    pub fn is_repetition_draw(&self) -> bool {
        if self.is_edited() {
            return false;
        }
        let idx = (self.cached_hash as usize) % self.repeat_table.len();
        let shift = if self.white_to_move { 4 } else { 0 };
        let approx = (self.repeat_table[idx] >> shift) & 0x0F;
        if approx < 3 {
            return false;
        }
        self.exact_repetition_count() >= 3
    }

    /// Any of the definite-draw conditions above.
    #[must_use]
    pub fn is_definite_draw(&self) -> bool {
        self.is_material_draw() || self.is_fifty_move_draw() || self.is_repetition_draw()
    }
}
