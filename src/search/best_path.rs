//! Principal-variation bookkeeping: a bounded best-line-so-far, recorded
//! per root move so the next iteration can seed move ordering with the
//! previous iteration's favored continuation and the caller can report
//! the engine's intended line once the search returns.

use crate::types::Move;

/// Hard cap matching how deep a reported line is ever useful: well past
/// this, the position has usually resolved one way or another anyway.
pub const MAX_BEST_PATH: usize = 50;

/// One recorded line, capped at [`MAX_BEST_PATH`] moves.
#[derive(Clone, Default)]
pub struct BestPath {
    moves: Vec<Move>,
}

impl BestPath {
    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    #[must_use]
    pub fn first(&self) -> Option<Move> {
        self.moves.first().copied()
    }

    /// Build a line directly from an already-ordered move sequence,
    /// truncating to the cap.
    #[must_use]
    pub fn from_moves(mut moves: Vec<Move>) -> BestPath {
        moves.truncate(MAX_BEST_PATH);
        BestPath { moves }
    }

    fn prepend(&mut self, mv: Move, continuation: &[Move]) {
        self.moves.clear();
        self.moves.push(mv);
        self.moves.extend_from_slice(continuation);
        self.moves.truncate(MAX_BEST_PATH);
    }
}

/// Triangular PV table: `line_at(ply)` is the best continuation found so
/// far from `ply` to the leaf. A node that raises alpha with a genuine
/// (non-bound) score calls `record` to graft its move onto the line
/// already recorded one ply deeper.
pub struct PvTable {
    lines: Vec<BestPath>,
}

impl PvTable {
    #[must_use]
    pub fn new(max_ply: usize) -> PvTable {
        PvTable { lines: vec![BestPath::default(); max_ply + 1] }
    }

    pub fn record(&mut self, ply: usize, mv: Move) {
        let continuation = self.lines.get(ply + 1).map(|p| p.moves.clone()).unwrap_or_default();
        if let Some(line) = self.lines.get_mut(ply) {
            line.prepend(mv, &continuation);
        }
    }

    #[must_use]
    pub fn line_at(&self, ply: usize) -> &[Move] {
        self.lines.get(ply).map_or(&[][..], BestPath::as_slice)
    }
}

/// Per-root-move best lines. Looked up by the root move itself rather
/// than by index, since the root move order is reshuffled between
/// iterations.
#[derive(Default)]
pub struct BestPathTable {
    entries: Vec<(Move, BestPath)>,
}

impl BestPathTable {
    #[must_use]
    pub fn new() -> BestPathTable {
        BestPathTable { entries: Vec::new() }
    }

    pub fn record(&mut self, root_move: Move, path: BestPath) {
        if let Some(entry) = self.entries.iter_mut().find(|(m, _)| *m == root_move) {
            entry.1 = path;
        } else {
            self.entries.push((root_move, path));
        }
    }

    #[must_use]
    pub fn get(&self, root_move: Move) -> Option<&BestPath> {
        self.entries.iter().find(|(m, _)| *m == root_move).map(|(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Offset;

    fn mv(from: &str, to: &str) -> Move {
        Move::quiet(Offset::from_algebraic(from).unwrap(), Offset::from_algebraic(to).unwrap())
    }

    #[test]
    fn pv_table_grafts_child_line_onto_parent_move() {
        let mut table = PvTable::new(4);
        table.record(2, mv("e7", "e5"));
        table.record(1, mv("e2", "e4"));
        assert_eq!(table.line_at(1), &[mv("e2", "e4"), mv("e7", "e5")]);
    }

    #[test]
    fn best_path_table_looks_up_by_root_move() {
        let mut table = BestPathTable::new();
        let mut path = BestPath::default();
        path.prepend(mv("e7", "e5"), &[]);
        table.record(mv("e2", "e4"), path);
        assert_eq!(table.get(mv("e2", "e4")).unwrap().first(), Some(mv("e7", "e5")));
        assert!(table.get(mv("d2", "d4")).is_none());
    }
}
