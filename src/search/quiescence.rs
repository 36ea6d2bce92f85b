//! Quiescence search: extends the main search past the nominal horizon
//! through captures and a bounded number of plies of checks, so a side
//! to move is never evaluated mid-capture-sequence or mid-check.

use crate::board::Board;
use crate::eval::gene::Gene;
use crate::search::{NodeCounter, SearchAbort, SearchLimits};
use crate::types::Color;

/// Negamax quiescence from the side to move's perspective. `check_plies`
/// is how many more plies of non-capturing check extensions are still
/// allowed at this node; it counts down and never grows.
pub fn quiescence(
    board: &mut Board,
    mut alpha: i32,
    beta: i32,
    check_plies: u32,
    gene: &Gene,
    nodes: &mut NodeCounter,
    limits: &SearchLimits,
) -> Result<i32, SearchAbort> {
    nodes.tick(limits)?;

    let stand_pat = side_relative_eval(board, gene);
    if stand_pat >= beta {
        return Ok(beta);
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut candidates: Vec<_> = board.generate_legal_captures().iter().copied().collect();
    if check_plies > 0 {
        let side = board.side_to_move();
        for mv in board.generate_legal_moves().iter() {
            if candidates.contains(mv) {
                continue;
            }
            let info = board.make_move(*mv);
            let gives_check = board.in_check(side.opposite());
            board.unmake_move(*mv, info);
            if gives_check {
                candidates.push(*mv);
            }
        }
    }
    candidates.sort_by_key(|mv| std::cmp::Reverse(capture_value(board, *mv)));

    for mv in candidates {
        let info = board.make_move(mv);
        let next_check_plies = if check_plies > 0 { check_plies - 1 } else { 0 };
        let score = -quiescence(board, -beta, -alpha, next_check_plies, gene, nodes, limits)?;
        board.unmake_move(mv, info);

        if score >= beta {
            return Ok(beta);
        }
        if score > alpha {
            alpha = score;
        }
    }

    Ok(alpha)
}

fn side_relative_eval(board: &Board, gene: &Gene) -> i32 {
    let eval = board.evaluate(gene);
    if board.side_to_move() == Color::White {
        eval
    } else {
        -eval
    }
}

fn capture_value(board: &Board, mv: crate::types::Move) -> i32 {
    board.piece_at(board.move_destination(mv)).kind().map_or(0, |k| k.raw_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn quiet_position_returns_stand_pat() {
        let mut board = Board::new();
        let gene = Gene::defaults();
        let mut nodes = NodeCounter::new();
        let limits = SearchLimits::unbounded();
        let score = quiescence(&mut board, -100_000, 100_000, 0, &gene, &mut nodes, &limits).unwrap();
        assert_eq!(score, side_relative_eval(&board, &gene));
    }

    #[test]
    fn hanging_queen_capture_is_found() {
        let mut board = Board::try_from_fen("4k3/8/8/8/3q4/8/8/3QK3 w - - 0 1").unwrap();
        let gene = Gene::defaults();
        let mut nodes = NodeCounter::new();
        let limits = SearchLimits::unbounded();
        let score = quiescence(&mut board, -100_000, 100_000, 0, &gene, &mut nodes, &limits).unwrap();
        assert!(score > 0, "expected white's queen-for-queen capture to be at least even, got {score}");
    }
}
