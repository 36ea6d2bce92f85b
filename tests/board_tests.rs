//! Board-level invariants driven through the public API, complementing the
//! in-module unit tests in `src/board/tests.rs` with cross-cutting
//! integration scenarios (full game replay, FEN edge cases).

use chenard_engine::Board;

#[test]
fn make_unmake_round_trips_across_a_full_opening_sequence() {
    let mut board = Board::new();
    let moves = ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6"];
    let mut applied = Vec::new();
    for &m in &moves {
        let mv = board.parse_long_algebraic(m).unwrap();
        let before = board.clone();
        let info = board.make_move(mv);
        applied.push((mv, info, before));
    }
    for (mv, info, before) in applied.into_iter().rev() {
        board.unmake_move(mv, info);
        assert!(board == before, "unmake did not restore state for {mv}");
    }
}

#[test]
fn castling_rights_are_lost_after_rook_moves_home_square() {
    let mut board =
        Board::try_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let mv = board.parse_long_algebraic("a1a2").unwrap();
    board.make_move(mv);
    assert!(!board.can_castle_queenside(chenard_engine::Color::White));
    assert!(board.can_castle_kingside(chenard_engine::Color::White));
}

#[test]
fn en_passant_target_is_inferred_from_previous_move_in_fen() {
    let board =
        Board::try_from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
            .unwrap();
    let fen = board.to_fen();
    assert!(fen.contains(" d6 "), "expected en passant target in FEN, got {fen}");
}

#[test]
fn set_fen_rejects_position_with_opponent_in_check() {
    // Black just moved, but white king is left in check: illegal.
    let result = Board::try_from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1");
    assert!(result.is_err());
}

#[test]
fn set_fen_rejects_pawn_on_back_rank() {
    let result = Board::try_from_fen("4k3/8/8/8/8/8/8/P3K3 w - - 0 1");
    assert!(result.is_err());
}

#[test]
fn threefold_repetition_replay_marks_definite_draw() {
    let mut board = Board::new();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    for _ in 0..2 {
        for &m in &shuffle {
            let mv = board.parse_long_algebraic(m).unwrap();
            board.make_move(mv);
        }
    }
    assert!(board.is_definite_draw());
}

#[test]
fn edited_board_disables_repetition_draw_detection() {
    let mut board =
        Board::set_up_from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let shuffle = ["e1d1", "e8d8", "d1e1", "d8e8"];
    for _ in 0..2 {
        for &m in &shuffle {
            let mv = board.parse_long_algebraic(m).unwrap();
            board.make_move(mv);
        }
    }
    assert!(!board.is_definite_draw(), "repetition detection must stay off for edited boards");
}

#[test]
fn insufficient_material_king_and_bishop_vs_king_is_a_draw() {
    let board = Board::try_from_fen("4k3/8/8/8/8/8/8/3BK3 w - - 0 1").unwrap();
    assert!(board.is_definite_draw());
}

#[test]
fn king_and_two_bishops_vs_king_is_not_a_material_draw() {
    let board = Board::try_from_fen("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1").unwrap();
    assert!(!board.is_definite_draw());
}
