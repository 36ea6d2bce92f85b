//! Board-level invariant tests: make/unmake reversibility, FEN round trips,
//! perft counts, and draw detection.

use super::Board;
use crate::types::Move;

fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = board.generate_legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for &mv in moves.iter() {
        let info = board.make_move(mv);
        nodes += perft(board, depth - 1);
        board.unmake_move(mv, info);
    }
    nodes
}

#[test]
fn initial_position_has_twenty_moves() {
    let board = Board::new();
    assert_eq!(board.generate_legal_moves().len(), 20);
}

#[test]
fn perft_initial_position_depth_1_to_4() {
    let mut board = Board::new();
    assert_eq!(perft(&mut board, 1), 20);
    assert_eq!(perft(&mut board, 2), 400);
    assert_eq!(perft(&mut board, 3), 8_902);
    assert_eq!(perft(&mut board, 4), 197_281);
}

#[test]
fn perft_kiwipete_depth_2() {
    // The well-known "Kiwipete" stress position (castling, en passant,
    // promotions all reachable within a couple of plies).
    let mut board = Board::try_from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .unwrap();
    assert_eq!(perft(&mut board, 1), 48);
    assert_eq!(perft(&mut board, 2), 2_039);
}

#[test]
fn make_unmake_round_trips_bit_for_bit() {
    let mut board = Board::new();
    let moves: Vec<Move> = board.generate_legal_moves().iter().copied().collect();
    for mv in moves {
        let before = board.clone();
        let info = board.make_move(mv);
        board.unmake_move(mv, info);
        assert!(board == before, "unmake did not restore position for {mv}");
        assert_eq!(board.cached_hash(), before.cached_hash());
    }
}

#[test]
fn fen_round_trips_through_to_fen() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
    ];
    for fen in fens {
        let board = Board::try_from_fen(fen).unwrap();
        let round = Board::try_from_fen(&board.to_fen()).unwrap();
        assert!(board == round, "FEN round trip mismatch for {fen}");
    }
}

#[test]
fn hash_matches_calc_hash_after_play() {
    let mut board = Board::new();
    assert_eq!(board.cached_hash(), board.calc_hash());
    for &mv in board.generate_legal_moves().iter().collect::<Vec<_>>().iter() {
        board.make_move(*mv);
        assert_eq!(board.cached_hash(), board.calc_hash());
        break;
    }
}

#[test]
fn king_query_position_has_five_legal_moves() {
    let board = Board::try_from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
    assert_eq!(board.generate_legal_moves().len(), 5);
}

#[test]
fn en_passant_is_generated_and_reversible() {
    let mut board =
        Board::try_from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
            .unwrap();
    let moves = board.generate_legal_moves();
    let ep = moves.iter().find(|m| m.is_en_passant());
    assert!(ep.is_some(), "expected an en passant capture to be legal");
    let mv = *ep.unwrap();
    let before = board.clone();
    let info = board.make_move(mv);
    assert!(board.piece_at(crate::types::Offset::from_algebraic("d5").unwrap()).is_empty());
    board.unmake_move(mv, info);
    assert!(board == before);
}

#[test]
fn castling_requires_clear_and_unattacked_path() {
    let board =
        Board::try_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let moves = board.generate_legal_moves();
    assert!(moves.iter().any(|m| m.is_castle_kingside()));
    assert!(moves.iter().any(|m| m.is_castle_queenside()));
}

#[test]
fn material_draw_detects_kk() {
    let board = Board::try_from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(board.is_material_draw());
    assert!(board.is_definite_draw());
}

#[test]
fn fifty_move_rule_triggers_at_100_plies() {
    let mut board = Board::try_from_fen("4k3/8/8/8/8/8/8/4K3 w - - 99 60").unwrap();
    // last_cap_or_pawn was derived from halfmove clock 99; one quiet ply
    // should push it to the 100-ply threshold.
    let mv = board
        .generate_legal_moves()
        .iter()
        .next()
        .copied()
        .expect("king has a legal move");
    board.make_move(mv);
    assert!(board.is_fifty_move_draw());
}

#[test]
fn set_up_from_fen_disables_repetition_detection() {
    let board = Board::set_up_from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
    assert!(board.is_edited());
    assert!(!board.is_repetition_draw());
}

#[test]
fn new_game_is_not_edited() {
    assert!(!Board::new().is_edited());
}
