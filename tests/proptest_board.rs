//! Property-based make/unmake and notation round-trip checks: instead of
//! a handful of hand-picked positions, `proptest` drives many random
//! legal-move walks from the start position and checks the invariants
//! hold after every one of them.

use proptest::prelude::*;

use chenard_engine::Board;

/// Walk `choices.len()` plies deep from the start position, each time
/// picking the `choice`-th legal move modulo however many are available.
/// Returns the sequence of `(move, undo info, position before)` actually
/// played, so the caller can unwind it.
fn play_walk(choices: &[u8]) -> Vec<(chenard_engine::Move, Board)> {
    let mut board = Board::new();
    let mut played = Vec::new();
    for &choice in choices {
        let moves = board.generate_legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[(choice as usize) % moves.len()];
        let before = board.clone();
        board.make_move(mv);
        played.push((mv, before));
    }
    played
}

proptest! {
    #[test]
    fn random_legal_walks_unmake_back_to_every_prior_position(choices in prop::collection::vec(0u8..32, 1..12)) {
        let mut board = Board::new();
        let mut undo_stack = Vec::new();
        for &choice in &choices {
            let moves = board.generate_legal_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves[(choice as usize) % moves.len()];
            let before = board.clone();
            let info = board.make_move(mv);
            undo_stack.push((mv, info, before));
        }
        for (mv, info, before) in undo_stack.into_iter().rev() {
            board.unmake_move(mv, info);
            prop_assert!(board == before);
            prop_assert_eq!(board.cached_hash(), before.cached_hash());
        }
    }

    #[test]
    fn every_reached_position_round_trips_through_long_algebraic_moves(choices in prop::collection::vec(0u8..32, 1..10)) {
        for (mv, before) in play_walk(&choices) {
            let text = before.move_to_long_algebraic(mv);
            let parsed = before.parse_long_algebraic(&text).unwrap();
            prop_assert_eq!(mv, parsed);
        }
    }

    #[test]
    fn every_reached_position_round_trips_through_fen(choices in prop::collection::vec(0u8..32, 1..10)) {
        for (_, before) in play_walk(&choices) {
            let round = Board::try_from_fen(&before.to_fen()).unwrap();
            prop_assert!(before == round);
        }
    }
}
