//! King-position tables for the "lone king" endgame pattern: when one side
//! has only a king (possibly plus pawns), the winning side is rewarded for
//! driving the defending king toward a corner, and the defending king's
//! mobility is penalised.
//!
//! The three tables (`QR`, `BW`, `BB`) mirror the original engine's
//! `KingPosTableQR`/`KingPosTableBW`/`KingPosTableBB`: a queen or rook can
//! mate in any corner, but a bishop can only support mate in the corners
//! its color of square reaches. The verbatim constant tables were not
//! available to regenerate from, so these are computed once from the
//! corner-distance rule the original describes, rather than hand-copied.

use crate::types::{Offset, BOARD_SIZE};

/// Chebyshev distance from `offset` to the nearest of `corners`, each given
/// as (file, rank) in 0..7.
fn distance_to_nearest(offset: Offset, corners: &[(i32, i32)]) -> i32 {
    let file = offset.file();
    let rank = offset.rank();
    corners
        .iter()
        .map(|&(cf, cr)| (file - cf).abs().max((rank - cr).abs()))
        .min()
        .unwrap_or(7)
}

const ALL_CORNERS: [(i32, i32); 4] = [(0, 0), (0, 7), (7, 0), (7, 7)];
/// a1 and h8 are dark squares; a bishop on a dark (black) square supports
/// mate only in those two corners.
const DARK_CORNERS: [(i32, i32); 2] = [(0, 0), (7, 7)];
/// a8 and h1 are light squares.
const LIGHT_CORNERS: [(i32, i32); 2] = [(0, 7), (7, 0)];

fn build_table(corners: &[(i32, i32)]) -> [i32; BOARD_SIZE] {
    let mut table = [0; BOARD_SIZE];
    for i in 0..BOARD_SIZE {
        let offset = Offset(i as u8);
        table[i] = if offset.is_interior() {
            // Closer to a qualifying corner scores higher; max distance is 7.
            7 - distance_to_nearest(offset, corners)
        } else {
            0
        };
    }
    table
}

/// Queen or rook can force mate in any corner.
#[must_use]
pub fn king_pos_table_qr() -> [i32; BOARD_SIZE] {
    build_table(&ALL_CORNERS)
}

/// Bishop traveling on light squares: only the light corners (a8, h1) are
/// reachable mating corners.
#[must_use]
pub fn king_pos_table_bishop_light() -> [i32; BOARD_SIZE] {
    build_table(&LIGHT_CORNERS)
}

/// Bishop traveling on dark squares: only the dark corners (a1, h8).
#[must_use]
pub fn king_pos_table_bishop_dark() -> [i32; BOARD_SIZE] {
    build_table(&DARK_CORNERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_squares_score_highest() {
        let table = king_pos_table_qr();
        let a1 = Offset::from_file_rank(0, 0);
        let d4 = Offset::from_file_rank(3, 3);
        assert!(table[a1.0 as usize] > table[d4.0 as usize]);
    }

    #[test]
    fn bishop_tables_only_favor_matching_corners() {
        let light = king_pos_table_bishop_light();
        let dark = king_pos_table_bishop_dark();
        let a1 = Offset::from_file_rank(0, 0); // dark corner
        let a8 = Offset::from_file_rank(0, 7); // light corner
        assert!(dark[a1.0 as usize] > light[a1.0 as usize]);
        assert!(light[a8.0 as usize] > dark[a8.0 as usize]);
    }
}
