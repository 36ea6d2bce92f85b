//! Iterative-deepening alpha-beta search: the root driver in this module,
//! quiescence in [`quiescence`], move ordering in [`ordering`], and
//! principal-variation bookkeeping in [`best_path`].

pub mod best_path;
pub mod ordering;
pub mod quiescence;

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::eval::gene::{self, Gene};
use crate::eval::WIN_DELAY_PENALTY;
use crate::transposition::TranspositionTable;
use crate::types::{Color, Move};
use best_path::{BestPath, BestPathTable, PvTable};
use ordering::Ordering;
use quiescence::quiescence;

/// Score magnitude for an immediate mate, before the per-ply delay
/// penalty is subtracted. Kept local to search rather than reused from
/// `eval::WHITE_WINS` since here the convention is side-relative
/// (negamax), not white-relative.
const MATE: i32 = 30_000;

/// Hard recursion ceiling: check extensions have no decay of their own, so
/// without this a long forcing sequence could otherwise grow the search
/// tree without bound.
const MAX_PLY: u32 = 128;

/// Scores at or beyond this magnitude are mate scores rather than
/// ordinary evaluations, and need ply-distance rebasing on a TT hit.
/// Ordinary eval never comes anywhere close to `MATE`, so the margin
/// only needs to clear `MAX_PLY` worth of delay penalty.
const MATE_THRESHOLD: i32 = MATE - WIN_DELAY_PENALTY * MAX_PLY as i32;

/// A transposition entry's score is only valid as-is at the ply it was
/// stored at (`birth_ply`): mate scores encode absolute distance from the
/// terminal position, so reusing one at a different ply without rebasing
/// would report the wrong mate distance. Ordinary (non-mate) scores don't
/// depend on ply and pass through unchanged.
fn rebase_mate_score(score: i32, ply: u32, birth_ply: u32) -> i32 {
    let delta = WIN_DELAY_PENALTY * (ply as i32 - birth_ply as i32);
    if score >= MATE_THRESHOLD {
        score - delta
    } else if score <= -MATE_THRESHOLD {
        score + delta
    } else {
        score
    }
}

/// How long a single `search_root` call is allowed to run.
#[derive(Clone, Copy, Debug)]
pub enum Budget {
    /// Stop after completing this many plies of iterative deepening.
    Depth(u32),
    /// Stop once this much wall-clock time has elapsed, after whichever
    /// iteration is in flight aborts.
    Time(Duration),
    /// Stop once this many nodes have been visited.
    Nodes(u64),
}

/// Internal, already-resolved stopping conditions checked by
/// [`NodeCounter::tick`]; `search_root` builds this once from the public
/// [`Budget`] so deeper code never matches on the budget kind.
#[derive(Clone, Copy, Default)]
pub struct SearchLimits {
    pub deadline: Option<Instant>,
    pub node_limit: Option<u64>,
}

impl SearchLimits {
    #[must_use]
    pub fn unbounded() -> SearchLimits {
        SearchLimits { deadline: None, node_limit: None }
    }
}

/// Raised when a time/node budget is exceeded mid-search. The root driver
/// catches this and falls back to the last iteration that ran to
/// completion; it is not a user-visible error.
#[derive(Debug, Clone, Copy)]
pub struct SearchAbort;

const NODE_CHECK_INTERVAL: u64 = 4096;

/// Counts nodes visited and checks the active limits every
/// [`NODE_CHECK_INTERVAL`] nodes, so the clock is not read on every call.
pub struct NodeCounter {
    count: u64,
    abort_flag: Option<Arc<AtomicBool>>,
}

impl NodeCounter {
    #[must_use]
    pub fn new() -> NodeCounter {
        NodeCounter { count: 0, abort_flag: None }
    }

    #[must_use]
    pub fn with_abort_flag(abort_flag: Arc<AtomicBool>) -> NodeCounter {
        NodeCounter { count: 0, abort_flag: Some(abort_flag) }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.count
    }

    pub fn tick(&mut self, limits: &SearchLimits) -> Result<(), SearchAbort> {
        self.count += 1;
        if self.count % NODE_CHECK_INTERVAL != 0 {
            return Ok(());
        }
        if let Some(flag) = &self.abort_flag {
            if flag.load(AtomicOrdering::Relaxed) {
                return Err(SearchAbort);
            }
        }
        if let Some(limit) = limits.node_limit {
            if self.count >= limit {
                return Err(SearchAbort);
            }
        }
        if let Some(deadline) = limits.deadline {
            if Instant::now() >= deadline {
                return Err(SearchAbort);
            }
        }
        Ok(())
    }
}

impl Default for NodeCounter {
    fn default() -> Self {
        NodeCounter::new()
    }
}

/// What `search_root` found: the chosen move (`None` only when the
/// position has no legal moves), its side-relative score translated back
/// to white's perspective, and whether a time/node budget cut the search
/// short before its deepest iteration finished.
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth_completed: u32,
    pub aborted: bool,
    pub nodes: u64,
    pub best_path: BestPath,
}

/// Persistent per-engine search state: the transposition table and the
/// move-ordering tables (killers, history) survive across calls so later
/// searches benefit from earlier ones.
pub struct Search {
    tt: TranspositionTable,
    ordering: Ordering,
    abort_flag: Arc<AtomicBool>,
}

impl Search {
    #[must_use]
    pub fn new(tt_bytes: usize) -> Search {
        Search {
            tt: TranspositionTable::with_byte_budget(tt_bytes),
            ordering: Ordering::new(),
            abort_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle a caller thread can set to interrupt the in-progress
    /// search cooperatively.
    #[must_use]
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort_flag)
    }

    /// Drive iterative deepening at the root, returning the best move
    /// found under `budget`.
    pub fn search_root(
        &mut self,
        board: &mut Board,
        gene: &Gene,
        budget: Budget,
        randomize: bool,
        rng: &mut impl rand::Rng,
    ) -> SearchResult {
        self.tt.new_search();
        self.ordering.age(gene);
        self.abort_flag.store(false, AtomicOrdering::Relaxed);

        let mut root_moves = board.generate_legal_moves();
        if root_moves.is_empty() {
            return SearchResult {
                best_move: None,
                score: 0,
                depth_completed: 0,
                aborted: false,
                nodes: 0,
                best_path: BestPath::default(),
            };
        }
        if randomize {
            root_moves.shuffle(rng);
        }

        let start = Instant::now();
        let max_depth = match budget {
            Budget::Depth(d) => d,
            _ => 64,
        };
        let node_limit = match budget {
            Budget::Nodes(n) => Some(n),
            _ => None,
        };
        let base_deadline = match budget {
            Budget::Time(d) => Some(start + d),
            _ => None,
        };
        let mut deadline = base_deadline;
        let mut oops_used = false;

        let mut nodes = NodeCounter::with_abort_flag(self.abort_handle());
        let mover = board.side_to_move();

        let mut last_completed_move = root_moves[0];
        let mut last_completed_score = i32::MIN;
        let mut last_completed_depth = 0;
        let mut last_completed_path = BestPath::default();
        let mut aborted = false;

        let mut best_paths = BestPathTable::new();

        let mut depth = 1;
        while depth <= max_depth {
            let limits = SearchLimits { deadline, node_limit };
            let mut pv = PvTable::new(usize::try_from(max_depth).unwrap_or(64) + 16);
            let mut iter_best_move = root_moves[0];
            let mut iter_best_score = i32::MIN;
            let mut iter_aborted = false;
            let mut alpha = -(MATE + 1);
            let beta = MATE + 1;

            for i in 0..root_moves.len() {
                let mv = root_moves[i];
                let info = board.make_move(mv);
                let result =
                    self.negamax(board, gene, depth.saturating_sub(1), -beta, -alpha, 1, &mut nodes, &limits, &mut pv);
                board.unmake_move(mv, info);

                let score = match result {
                    Ok(s) => -s,
                    Err(SearchAbort) => {
                        iter_aborted = true;
                        break;
                    }
                };
                root_moves.as_mut_slice()[i] = mv.with_score(clamp_to_i16(score));

                let mut continuation = vec![mv];
                continuation.extend_from_slice(pv.line_at(1));
                best_paths.record(mv, BestPath::from_moves(continuation));

                if score > iter_best_score {
                    iter_best_score = score;
                    iter_best_move = mv;
                    if score > alpha {
                        alpha = score;
                    }
                }
            }

            if iter_aborted {
                aborted = true;
                break;
            }

            root_moves.sort_by_score_desc();
            root_moves.send_to_front(iter_best_move);

            last_completed_move = iter_best_move;
            last_completed_path = best_paths.get(iter_best_move).cloned().unwrap_or_default();

            if last_completed_depth > 0
                && iter_best_score < last_completed_score - gene.get(gene::S_SAFE_EVAL_PRUNE_MARGIN)
                && !oops_used
            {
                if let Some(d) = deadline {
                    let remaining = d.saturating_duration_since(Instant::now());
                    deadline = Some(Instant::now() + remaining + remaining);
                    oops_used = true;
                }
            }

            last_completed_score = iter_best_score;
            last_completed_depth = depth;

            if iter_best_score >= MATE - WIN_DELAY_PENALTY * 100 {
                break;
            }

            depth += 1;
        }

        let score = if mover == Color::White { last_completed_score } else { -last_completed_score };

        SearchResult {
            best_move: Some(last_completed_move),
            score,
            depth_completed: last_completed_depth,
            aborted,
            nodes: nodes.total(),
            best_path: last_completed_path,
        }
    }

    /// Internal negamax node. Returns a side-relative score: positive
    /// favors the side to move at this node.
    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &mut self,
        board: &mut Board,
        gene: &Gene,
        depth: u32,
        mut alpha: i32,
        beta: i32,
        ply: u32,
        nodes: &mut NodeCounter,
        limits: &SearchLimits,
        pv: &mut PvTable,
    ) -> Result<i32, SearchAbort> {
        nodes.tick(limits)?;

        let white_to_move = board.side_to_move() == Color::White;
        let hash = board.cached_hash();
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(white_to_move, hash) {
            tt_move = Some(entry.best_move);
            if entry.depth >= depth && entry.alpha <= alpha && entry.beta >= beta {
                return Ok(rebase_mate_score(entry.score, ply, entry.birth_ply));
            }
        }

        if depth == 0 || ply >= MAX_PLY {
            let max_check_depth = gene.get(gene::MAX_CHECK_DEPTH).max(0) as u32;
            return quiescence(board, alpha, beta, max_check_depth, gene, nodes, limits);
        }

        let mut moves = board.generate_legal_moves();
        if moves.is_empty() {
            return Ok(if board.in_check(board.side_to_move()) {
                -(MATE - WIN_DELAY_PENALTY * ply as i32)
            } else {
                0
            });
        }

        self.ordering.order(board, &mut moves, ply as usize, tt_move, gene);

        let original_alpha = alpha;
        let mut best_move = moves[0];
        let mut best_score = -(MATE + 1);

        for i in 0..moves.len() {
            let mv = moves[i];
            let info = board.make_move(mv);
            let gives_check = board.in_check(board.side_to_move());
            let extension = if gives_check { gene.get(gene::CHECK_BONUS).max(0) as u32 } else { 0 };
            let child_depth = depth - 1 + extension;
            let score = -self.negamax(board, gene, child_depth, -beta, -alpha, ply + 1, nodes, limits, pv)?;
            board.unmake_move(mv, info);

            if score > best_score {
                best_score = score;
                best_move = mv;
            }
            if score >= beta {
                self.ordering.record_cutoff(board, mv, ply as usize, gene);
                self.tt.store(white_to_move, hash, depth, ply, beta, original_alpha, beta, mv);
                return Ok(beta);
            }
            if score > alpha {
                alpha = score;
                pv.record(ply as usize, mv);
            }
        }

        self.tt.store(white_to_move, hash, depth, ply, alpha, original_alpha, beta, best_move);
        Ok(alpha)
    }
}

fn clamp_to_i16(score: i32) -> i16 {
    score.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use rand::thread_rng;

    #[test]
    fn finds_mate_in_one() {
        let mut board = Board::try_from_fen("6k1/8/6K1/8/8/8/8/7R w - - 0 1").unwrap();
        let gene = Gene::defaults();
        let mut search = Search::new(1 << 20);
        let mut rng = thread_rng();
        let result = search.search_root(&mut board, &gene, Budget::Depth(3), false, &mut rng);
        let mv = result.best_move.unwrap();
        assert_eq!(board.move_destination(mv), crate::types::Offset::from_algebraic("h8").unwrap());
    }

    #[test]
    fn prefers_winning_a_hanging_piece() {
        let mut board = Board::try_from_fen("4k3/8/8/3q4/8/8/8/3QK3 w - - 0 1").unwrap();
        let gene = Gene::defaults();
        let mut search = Search::new(1 << 20);
        let mut rng = thread_rng();
        let result = search.search_root(&mut board, &gene, Budget::Depth(3), false, &mut rng);
        assert!(result.score > 0);
    }

    #[test]
    fn node_budget_eventually_aborts_a_deep_search() {
        let mut board = Board::new();
        let gene = Gene::defaults();
        let mut search = Search::new(1 << 20);
        let mut rng = thread_rng();
        let result = search.search_root(&mut board, &gene, Budget::Nodes(500), false, &mut rng);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn non_mate_scores_pass_through_rebasing_unchanged() {
        assert_eq!(rebase_mate_score(137, 9, 2), 137);
        assert_eq!(rebase_mate_score(-137, 9, 2), -137);
    }

    #[test]
    fn mate_scores_rebase_to_the_current_ply() {
        // A mate stored 3 plies deep at birth_ply 5 (mate-in-3 from there)
        // probed again from ply 10 should still read as mate-in-3 from the
        // new node, i.e. shifted by the same (ply - birth_ply) delta.
        let stored = MATE - WIN_DELAY_PENALTY * 8;
        let rebased = rebase_mate_score(stored, 10, 5);
        assert_eq!(rebased, MATE - WIN_DELAY_PENALTY * 13);

        let stored_losing = -(MATE - WIN_DELAY_PENALTY * 8);
        let rebased_losing = rebase_mate_score(stored_losing, 10, 5);
        assert_eq!(rebased_losing, -(MATE - WIN_DELAY_PENALTY * 13));
    }
}
