//! Static position evaluation: a nonlinear material term plus a positional
//! term driven by the tunable [`gene::Gene`] vector.

pub mod endgame_patterns;
pub mod gene;

use crate::board::Board;
use crate::types::{Color, Offset, Piece, PieceKind};
use gene::Gene;

/// Score returned for a position that is a confirmed win for white, before
/// the mate-distance penalty is applied.
pub const WHITE_WINS: i32 = 30_000;
pub const BLACK_WINS: i32 = -30_000;
/// Subtracted (for white) or added (for black) per ply of mate distance, so
/// shorter mates score strictly better than longer ones.
pub const WIN_DELAY_PENALTY: i32 = 1;

const PAWN_VAL: i32 = PieceKind::Pawn.raw_value();
const KNIGHT_VAL: i32 = PieceKind::Knight.raw_value();
const BISHOP_VAL: i32 = PieceKind::Bishop.raw_value();
const ROOK_VAL: i32 = PieceKind::Rook.raw_value();
const QUEEN_VAL: i32 = PieceKind::Queen.raw_value();
const KING_VAL: i32 = PieceKind::King.raw_value();

const INITIAL_MATERIAL: i32 = KING_VAL + QUEEN_VAL + 2 * ROOK_VAL + 2 * BISHOP_VAL + 2 * KNIGHT_VAL + 8 * PAWN_VAL;

/// Nonlinear transform of one side's raw material total: a downward-opening
/// parabola centered so that losing material while ahead costs more than
/// the same trade while behind gains, and vice versa. `D` is the slope of
/// the curve a queen's worth of material down from the initial material
/// total — matching the original engine's tuned constant.
fn material_eval(material: i32) -> i32 {
    const D: f64 = 1.4;
    let init = f64::from(INITIAL_MATERIAL);
    let a = (D - 1.0) / (2.0 * init);
    let b = 0.5 / a + init;
    let c = 0.25 / a + init;
    let x = f64::from(material);
    let g = -a * (x - b) * (x - b) + c;
    (10.0 * g + 0.5) as i32
}

impl Board {
    /// Static evaluation from white's perspective: positive favors white.
    /// Combines the nonlinear material term with a positional term, and
    /// substitutes the lone-king endgame pattern when one side has no
    /// pieces but a king (and possibly pawns).
    #[must_use]
    pub fn evaluate(&self, gene: &Gene) -> i32 {
        let material = material_eval(self.material(Color::White)) - material_eval(self.material(Color::Black));

        let positional = self.positional_eval(gene);

        let endgame = self.lone_king_bonus(gene, Color::White) - self.lone_king_bonus(gene, Color::Black);

        material + positional + endgame
    }

    fn positional_eval(&self, gene: &Gene) -> i32 {
        let mut score = 0;
        score += self.bishop_pair_term(gene);
        score += self.rook_file_term(gene);
        score += self.pawn_structure_term(gene);
        score += self.king_safety_term(gene);
        if self.in_check(self.side_to_move()) {
            score -= sign(self.side_to_move()) * gene.get(gene::CHECK_BONUS);
        }
        if self.white_to_move {
            score += gene.get(gene::TEMPO_BONUS);
        } else {
            score -= gene.get(gene::TEMPO_BONUS);
        }
        score
    }

    fn bishop_pair_term(&self, gene: &Gene) -> i32 {
        let mut score = 0;
        for color in [Color::White, Color::Black] {
            if self.inventory_count(color, PieceKind::Bishop) >= 2 {
                score += sign(color) * gene.get(gene::TWO_BISHOP_SYNERGY);
            }
        }
        score
    }

    /// Rook on an open or half-open file, and on the seventh rank.
    fn rook_file_term(&self, gene: &Gene) -> i32 {
        let mut score = 0;
        for file in 0..8 {
            let mut white_pawns = 0;
            let mut black_pawns = 0;
            for rank in 0..8 {
                match self.piece_at(Offset::from_file_rank(file, rank)) {
                    Piece::Occupied(Color::White, PieceKind::Pawn) => white_pawns += 1,
                    Piece::Occupied(Color::Black, PieceKind::Pawn) => black_pawns += 1,
                    _ => {}
                }
            }
            for rank in 0..8 {
                if let Piece::Occupied(color, PieceKind::Rook) =
                    self.piece_at(Offset::from_file_rank(file, rank))
                {
                    let (own_pawns, enemy_pawns) = match color {
                        Color::White => (white_pawns, black_pawns),
                        Color::Black => (black_pawns, white_pawns),
                    };
                    if own_pawns == 0 && enemy_pawns == 0 {
                        score += sign(color) * gene.get(gene::ROOK_OPEN_FILE);
                    }
                    let seventh = match color {
                        Color::White => rank == 6,
                        Color::Black => rank == 1,
                    };
                    if seventh {
                        score += sign(color) * gene.get(gene::ROOK_ON_SEVENTH);
                    }
                }
            }
        }
        score
    }

    /// Doubled and split (isolated) pawn penalties, plus a bonus for a
    /// passed pawn scaled by distance to promotion.
    fn pawn_structure_term(&self, gene: &Gene) -> i32 {
        let mut score = 0;
        for color in [Color::White, Color::Black] {
            let mut files = [0u8; 8];
            for file in 0..8 {
                for rank in 0..8 {
                    if self.piece_at(Offset::from_file_rank(file, rank)) == Piece::Occupied(color, PieceKind::Pawn) {
                        files[file as usize] += 1;
                    }
                }
            }
            for file in 0..8 {
                if files[file] >= 2 {
                    score -= sign(color) * gene.get(gene::PAWN_DOUBLED) * (i32::from(files[file]) - 1);
                }
                let has_neighbor = (file > 0 && files[file - 1] > 0) || (file < 7 && files[file + 1] > 0);
                if files[file] > 0 && !has_neighbor {
                    score -= sign(color) * gene.get(gene::PAWN_SPLIT);
                }
            }
            for file in 0..8 {
                for rank in 0..8 {
                    if self.piece_at(Offset::from_file_rank(file, rank)) == Piece::Occupied(color, PieceKind::Pawn)
                        && self.is_passed_pawn(color, file, rank)
                    {
                        score += sign(color) * self.passed_pawn_bonus(gene, color, rank);
                    }
                }
            }
        }
        score
    }

    fn is_passed_pawn(&self, color: Color, file: i32, rank: i32) -> bool {
        let (dir, last_rank) = match color {
            Color::White => (1, 7),
            Color::Black => (-1, 0),
        };
        let mut r = rank + dir;
        while r != last_rank + dir && (0..8).contains(&r) {
            for f in (file - 1).max(0)..=(file + 1).min(7) {
                if self.piece_at(Offset::from_file_rank(f, r)) == Piece::Occupied(color.opposite(), PieceKind::Pawn)
                {
                    return false;
                }
            }
            r += dir;
        }
        true
    }

    fn passed_pawn_bonus(&self, gene: &Gene, color: Color, rank: i32) -> i32 {
        let distance = match color {
            Color::White => 7 - rank,
            Color::Black => rank,
        };
        match distance {
            0 | 1 => gene.get(gene::PASSED_1_FROM_PROM),
            2 => gene.get(gene::PASSED_2_FROM_PROM),
            3 => gene.get(gene::PASSED_3_FROM_PROM),
            _ => gene.get(gene::PASSED_PAWN_ALONE),
        }
    }

    /// Pawn shield in front of a castled king, scaled by how many of the
    /// three shield squares are occupied by a friendly pawn.
    fn king_safety_term(&self, gene: &Gene) -> i32 {
        let mut score = 0;
        for color in [Color::White, Color::Black] {
            let king = self.king_offset(color);
            if !king.is_interior() {
                continue;
            }
            let shield_rank = match color {
                Color::White => king.rank() + 1,
                Color::Black => king.rank() - 1,
            };
            if !(0..8).contains(&shield_rank) {
                continue;
            }
            let mut shielded = 0;
            for file in (king.file() - 1).max(0)..=(king.file() + 1).min(7) {
                if self.piece_at(Offset::from_file_rank(file, shield_rank)) == Piece::Occupied(color, PieceKind::Pawn)
                {
                    shielded += 1;
                }
            }
            score += sign(color)
                * match shielded {
                    3 => gene.get(gene::PAWN_PROTECTS_KING1),
                    2 => gene.get(gene::PAWN_PROTECTS_KING1) / 2,
                    1 => gene.get(gene::PAWN_PROTECTS_KING1) / 4,
                    _ => 0,
                };
        }
        score
    }

    /// True if `color` has only a king (and possibly pawns) -- the
    /// specialised endgame pattern applies to the opponent driving this
    /// king toward a corner.
    fn is_lone_king(&self, color: Color) -> bool {
        [PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen]
            .iter()
            .all(|&kind| self.inventory_count(color, kind) == 0)
    }

    /// Bonus credited to `color` for driving the *opposing* lone king
    /// toward a mating corner, chosen by `color`'s remaining piece mix.
    fn lone_king_bonus(&self, gene: &Gene, color: Color) -> i32 {
        let opponent = color.opposite();
        if !self.is_lone_king(opponent) {
            return 0;
        }
        if self.inventory_count(color, PieceKind::Queen) == 0 && self.inventory_count(color, PieceKind::Rook) == 0 {
            let has_dark = self.has_bishop_on(color, false);
            let has_light = self.has_bishop_on(color, true);
            if !has_dark && !has_light {
                return 0;
            }
        }

        let table = self.king_corner_table(color);
        let opp_king = self.king_offset(opponent);
        if !opp_king.is_interior() {
            return 0;
        }
        let proximity = table[opp_king.0 as usize];
        let freedom_penalty = self.generate_pseudo_king_moves(opp_king, opponent).len() as i32;
        gene.get(gene::KING_OPPOSITION) * proximity / 7 - freedom_penalty
    }

    fn has_bishop_on(&self, color: Color, light_square: bool) -> bool {
        for y in 2..=9 {
            for x in 2..=9 {
                let offset = Offset::new(x, y);
                if self.piece_at(offset) == Piece::Occupied(color, PieceKind::Bishop)
                    && (((offset.file() + offset.rank()) % 2 == 0) == light_square)
                {
                    return true;
                }
            }
        }
        false
    }

    fn king_corner_table(&self, color: Color) -> [i32; crate::types::BOARD_SIZE] {
        if self.inventory_count(color, PieceKind::Queen) > 0 || self.inventory_count(color, PieceKind::Rook) > 0 {
            return endgame_patterns::king_pos_table_qr();
        }
        if self.has_bishop_on(color, true) {
            endgame_patterns::king_pos_table_bishop_light()
        } else {
            endgame_patterns::king_pos_table_bishop_dark()
        }
    }

    fn generate_pseudo_king_moves(&self, from: Offset, side: Color) -> crate::types::MoveList {
        let mut list = crate::types::MoveList::new();
        for &delta in &crate::types::QUEEN_DIRS {
            let Some(to) = from.add_delta(delta) else { continue };
            match self.piece_at(to) {
                Piece::Empty => list.push(crate::types::Move::quiet(from, to)),
                Piece::Occupied(c, _) if c != side => list.push(crate::types::Move::quiet(from, to)),
                _ => {}
            }
        }
        list
    }
}

fn sign(color: Color) -> i32 {
    if color.is_white() {
        1
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn symmetric_position_evaluates_near_zero() {
        let board = Board::new();
        let gene = Gene::defaults();
        let score = board.evaluate(&gene);
        assert!(score.abs() <= gene.get(gene::TEMPO_BONUS), "expected near-zero eval, got {score}");
    }

    #[test]
    fn extra_queen_scores_strongly_positive() {
        let board = Board::try_from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let gene = Gene::defaults();
        assert!(board.evaluate(&gene) > 500);
    }

    #[test]
    fn lone_king_is_pushed_toward_a_corner() {
        let center = Board::try_from_fen("8/8/3k4/8/8/3K4/8/3R4 w - - 0 1").unwrap();
        let corner = Board::try_from_fen("7k/8/8/8/8/3K4/8/3R4 w - - 0 1").unwrap();
        let gene = Gene::defaults();
        assert!(corner.evaluate(&gene) > center.evaluate(&gene));
    }

    #[test]
    fn material_eval_rewards_being_ahead_after_a_trade() {
        // Down a rook with queens on vs. down a rook with queens off:
        // the nonlinear transform should make the no-queens difference
        // closer to the raw material gap than the with-queens difference.
        let with_queens =
            material_eval(INITIAL_MATERIAL) - material_eval(INITIAL_MATERIAL - ROOK_VAL);
        let without_queens = material_eval(INITIAL_MATERIAL - QUEEN_VAL)
            - material_eval(INITIAL_MATERIAL - QUEEN_VAL - ROOK_VAL);
        assert_ne!(with_queens, without_queens);
    }
}
