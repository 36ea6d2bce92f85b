//! 32-bit Zobrist-style hash constants, lazily built once per process.
//!
//! The hash XORs one 32-bit constant per (piece, square) that is actually
//! occupied, plus a single side-to-move constant. It is recomputed from
//! scratch by [`calc_hash`] and updated incrementally by make/unmake.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Piece, BOARD_SIZE, PIECE_ARRAY_SIZE};

struct ZobristTable {
    piece_square: [[u32; BOARD_SIZE]; PIECE_ARRAY_SIZE],
    side_to_move: u32,
}

// Fixed seed: the hash must be reproducible across runs/processes for
// search determinism and for the transposition/endgame tables to agree
// with whatever produced a saved table file.
const ZOBRIST_SEED: u64 = 0x4348_454E_4152_44u64;

static TABLE: Lazy<ZobristTable> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
    let mut piece_square = [[0u32; BOARD_SIZE]; PIECE_ARRAY_SIZE];
    for slot in piece_square.iter_mut() {
        for cell in slot.iter_mut() {
            *cell = rng.gen();
        }
    }
    ZobristTable {
        piece_square,
        side_to_move: rng.gen(),
    }
});

#[inline]
pub(crate) fn piece_square_key(piece: Piece, offset: usize) -> u32 {
    match piece.piece_index() {
        Some(idx) => TABLE.piece_square[idx as usize][offset],
        None => 0,
    }
}

#[inline]
pub(crate) fn side_to_move_key() -> u32 {
    TABLE.side_to_move
}
