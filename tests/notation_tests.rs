//! Long-algebraic and PGN/SAN notation round trips, driven through the
//! public API across a handful of full games rather than single moves.

use chenard_engine::Board;

#[test]
fn every_legal_move_in_a_midgame_position_round_trips_through_long_algebraic() {
    let board =
        Board::try_from_fen("r1bqk2r/pp1n1ppp/2p1pn2/3p4/2PP4/2N1PN2/PP3PPP/R1BQKB1R w KQkq - 2 7")
            .unwrap();
    for &mv in board.generate_legal_moves().iter() {
        let text = board.move_to_long_algebraic(mv);
        let parsed = board.parse_long_algebraic(&text).unwrap();
        assert_eq!(mv, parsed, "round trip failed for {text}");
    }
}

#[test]
fn every_legal_move_in_a_midgame_position_round_trips_through_san() {
    let board =
        Board::try_from_fen("r1bqk2r/pp1n1ppp/2p1pn2/3p4/2PP4/2N1PN2/PP3PPP/R1BQKB1R w KQkq - 2 7")
            .unwrap();
    for &mv in board.generate_legal_moves().iter() {
        let san = board.move_to_san(mv);
        let parsed = board.parse_san(&san).unwrap();
        assert_eq!(mv, parsed, "SAN round trip failed for {san}");
    }
}

#[test]
fn a_recorded_opening_plays_back_by_san_and_matches_the_expected_fen() {
    let mut board = Board::new();
    let moves = ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"];
    for &san in &moves {
        let mv = board.parse_san(san).unwrap();
        board.make_move(mv);
    }
    let fen = board.to_fen();
    assert!(fen.starts_with("r1bqkbnr/1ppp1ppp/p1n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R"));
}

#[test]
fn parse_long_algebraic_rejects_an_illegal_square_pair() {
    let board = Board::new();
    // e2e5 is not a legal pawn move from the start position.
    assert!(board.parse_long_algebraic("e2e5").is_err());
}

#[test]
fn parse_san_rejects_nonsense_text() {
    let board = Board::new();
    assert!(board.parse_san("Zz9").is_err());
}
