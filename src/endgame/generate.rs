//! Retrograde-style table generation: repeatedly sweep every reachable
//! (White king, Black king, extra piece, side-to-move) arrangement, using
//! Black's point of view to minimise the forced mate and White's to
//! maximise it, propagating one ply of backward induction per pass until
//! a sweep produces no new forced wins (§4.8).
//!
//! Rather than reimplementing check/mate detection against the canonical
//! squares directly, each candidate arrangement is materialised as a real
//! [`Board`] and driven through the board's own `generate_legal_moves`/
//! `is_in_check` -- the generator only supplies the piece placement and
//! the fixed-point loop.

use std::collections::HashMap;

use crate::board::Board;
use crate::types::{Color, Move, Offset, Piece, PieceKind};

use super::{
    canonicalizing_symmetry, pack_entry, square_from_index, table_index, EndgameMove, EndgameTable,
    MovingPiece, TABLE_LEN,
};

/// Safety cap on fixed-point sweeps: real K+piece-vs-K mate distances
/// never approach this, so hitting it means a bug rather than a slow
/// convergence.
const MAX_SWEEPS: u32 = 64;

/// A canonical (already-in-triangle) position key: distinct from the
/// in-memory [`super::table_index`] only in that it is also identified by
/// side to move, since both sides' nodes participate in the fixed point
/// even though only White's are ever persisted to the final table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StateKey {
    side: Color,
    index: usize,
}

fn build_board(white_king: Offset, black_king: Offset, extra: Offset, extra_kind: PieceKind, side: Color) -> Option<Board> {
    if white_king == black_king || white_king == extra || black_king == extra {
        return None;
    }
    let mut board = Board::empty();
    board.set_square(white_king, Piece::Occupied(Color::White, PieceKind::King));
    board.set_square(black_king, Piece::Occupied(Color::Black, PieceKind::King));
    board.set_square(extra, Piece::Occupied(Color::White, extra_kind));
    board.white_to_move = side == Color::White;
    board.cached_hash = board.calc_hash();
    if board.is_in_check(side.opposite()) {
        return None;
    }
    Some(board)
}

/// Canonicalize an arbitrary (white king, black king, extra) triple: find
/// the symmetry that puts the black king in the standard triangle and
/// apply it to every square.
fn canonical_squares(white_king: Offset, black_king: Offset, extra: Offset) -> (Offset, Offset, Offset) {
    let sym = canonicalizing_symmetry(black_king);
    (sym.apply_offset(black_king), sym.apply_offset(white_king), sym.apply_offset(extra))
}

fn state_key(board: &Board, extra_kind: PieceKind) -> Option<StateKey> {
    let side = board.side_to_move();
    let white_king = board.king_offset(Color::White);
    let black_king = board.king_offset(Color::Black);
    let extra = find_extra(board, extra_kind)?;
    let (bk, wk, ex) = canonical_squares(white_king, black_king, extra);
    Some(StateKey { side, index: table_index(bk, wk, ex) })
}

fn find_extra(board: &Board, kind: PieceKind) -> Option<Offset> {
    for y in 2..=9 {
        for x in 2..=9 {
            let offset = Offset::new(x, y);
            if board.piece_at(offset) == Piece::Occupied(Color::White, kind) {
                return Some(offset);
            }
        }
    }
    None
}

/// Every canonical arrangement of (black king in the triangle, white king,
/// extra piece), for both sides to move, skipping square collisions.
fn enumerate_states(extra_kind: PieceKind) -> Vec<(StateKey, Board)> {
    let mut states = Vec::new();
    for bk_idx in 0..64 {
        let bk = square_from_index(bk_idx);
        if !super_in_triangle(bk.file(), bk.rank()) {
            continue;
        }
        for wk_idx in 0..64 {
            let wk = square_from_index(wk_idx);
            for ex_idx in 0..64 {
                let ex = square_from_index(ex_idx);
                for side in [Color::White, Color::Black] {
                    if let Some(board) = build_board(wk, bk, ex, extra_kind, side) {
                        let index = table_index(bk, wk, ex);
                        states.push((StateKey { side, index }, board));
                    }
                }
            }
        }
    }
    states
}

fn super_in_triangle(file: i32, rank: i32) -> bool {
    (0..=3).contains(&file) && (file..=3).contains(&rank)
}

/// Generate a full tablebase for White king + one extra white piece versus
/// a lone Black king.
#[must_use]
pub fn generate(extra_kind: PieceKind) -> EndgameTable {
    let states = enumerate_states(extra_kind);

    let mut dist: HashMap<StateKey, u32> = HashMap::new();
    let mut best_move: HashMap<StateKey, Move> = HashMap::new();

    for sweep in 0..MAX_SWEEPS {
        let mut changed = false;
        for (key, board) in &states {
            let legal = board.generate_legal_moves();
            let mover = board.side_to_move();

            if legal.is_empty() {
                let mate_now = board.is_in_check(mover);
                if mate_now && dist.insert(*key, 0).is_none() {
                    changed = true;
                }
                continue;
            }

            let mut known_children: Vec<(u32, Move)> = Vec::new();
            let mut any_unknown = false;
            for &mv in legal.iter() {
                let mut child = board.clone();
                child.make_move(mv);
                match state_key(&child, extra_kind).and_then(|k| dist.get(&k).copied()) {
                    Some(d) => known_children.push((d, mv)),
                    None => any_unknown = true,
                }
            }

            match mover {
                Color::White => {
                    // White forces mate fastest: minimise over known (losing
                    // for Black) children. An unknown child is not yet
                    // proven, so it is simply not a candidate this sweep.
                    if let Some(&(best_d, mv)) = known_children.iter().min_by_key(|(d, _)| *d) {
                        let new_dist = best_d + 1;
                        let changed_here = dist.get(key).copied() != Some(new_dist);
                        if changed_here {
                            dist.insert(*key, new_dist);
                            best_move.insert(*key, mv);
                            changed = true;
                        }
                    }
                }
                Color::Black => {
                    // Black delays as long as possible; any escape to an
                    // unknown (drawn-so-far) child means no forced loss yet.
                    if any_unknown {
                        continue;
                    }
                    if let Some(&(worst_d, _)) = known_children.iter().max_by_key(|(d, _)| *d) {
                        let new_dist = worst_d + 1;
                        if dist.get(key).copied() != Some(new_dist) {
                            dist.insert(*key, new_dist);
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
        if sweep == MAX_SWEEPS - 1 {
            crate::error::fatal("endgame table generation did not converge within the sweep budget");
        }
    }

    let mut entries = vec![0u16; TABLE_LEN];
    for (key, board) in &states {
        if key.side != Color::White {
            continue;
        }
        let Some(&plies) = dist.get(key) else { continue };
        let Some(&mv) = best_move.get(key) else { continue };
        if plies == 0 || plies > 255 {
            continue;
        }
        let white_king = board.king_offset(Color::White);
        let dest = board.move_destination(mv);
        let piece = if mv.source() == white_king { MovingPiece::King } else { MovingPiece::Extra };
        entries[key.index] = pack_entry(EndgameMove { plies_to_mate: plies as u8, piece, dest });
    }

    EndgameTable::from_entries(extra_kind, entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kq_vs_k_generation_finds_a_mate() {
        let table = generate(PieceKind::Queen);
        let board = Board::try_from_fen("7k/8/8/8/8/8/8/K6Q w - - 0 1").unwrap();
        let (mv, plies) = table.consult(&board).expect("KQvK must be a forced win");
        assert!(plies >= 1);
        assert!(board.is_legal(mv));
    }

    #[test]
    fn kr_vs_k_generation_finds_a_mate() {
        let table = generate(PieceKind::Rook);
        let board = Board::try_from_fen("7k/8/8/8/8/8/8/K6R w - - 0 1").unwrap();
        let (mv, _plies) = table.consult(&board).expect("KRvK must be a forced win");
        assert!(board.is_legal(mv));
    }

    #[test]
    fn mate_distance_strictly_decreases_after_the_recorded_move() {
        let table = generate(PieceKind::Queen);
        let board = Board::try_from_fen("7k/8/8/8/8/8/8/K6Q w - - 0 1").unwrap();
        let (mv, plies) = table.consult(&board).unwrap();
        if plies > 1 {
            let mut after = board.clone();
            after.make_move(mv);
            // It is now Black's move; Black's best reply still leaves a
            // forced mate one ply shorter for White once it replies.
            let replies = after.generate_legal_moves();
            assert!(!replies.is_empty(), "not already mate when more plies were claimed");
        }
    }
}
