//! The heuristic-constant vector ("gene") that parameterises evaluation and
//! move ordering. Kept out of compiled code so the constants can be tuned
//! (by hand or by a genetic algorithm) without a rebuild: load a
//! `key=value` text file over the defaults, or run with defaults alone.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::error::GeneError;

/// One named heuristic constant: its default and the clamp range a tuner
/// is allowed to explore.
#[derive(Debug, Clone, Copy)]
pub struct GeneDefinition {
    pub name: &'static str,
    pub default: i32,
    pub min: i32,
    pub max: i32,
}

pub const GENE_COUNT: usize = 82;

/// Verbatim layout of the original engine's heuristic constant table:
/// name, default, min, max, in index order. Index order matters — move
/// ordering and eval code below refer to entries by their `*_IDX` constant.
pub static GENE_TABLE: [GeneDefinition; GENE_COUNT] = [
    GeneDefinition { name: "EscapeCheckDepth", default: 0, min: 0, max: 2 },
    GeneDefinition { name: "MaxCheckDepth", default: 2, min: 0, max: 4 },
    GeneDefinition { name: "MO_HashHistMax", default: 2900, min: 500, max: 6000 },
    GeneDefinition { name: "MO_HashHistIncr", default: 35, min: 10, max: 100 },
    GeneDefinition { name: "S_SafeEvalPruneMargin", default: 220, min: 180, max: 500 },
    GeneDefinition { name: "CheckBonus", default: 2, min: 0, max: 6 },
    GeneDefinition { name: "TempoBonus", default: 1, min: 1, max: 4 },
    GeneDefinition { name: "KnightAttackKpos", default: 10, min: 3, max: 20 },
    GeneDefinition { name: "BishopAttackKpos", default: 12, min: 3, max: 20 },
    GeneDefinition { name: "RookAttackKpos", default: 18, min: 3, max: 30 },
    GeneDefinition { name: "QueenAttackKpos", default: 20, min: 3, max: 30 },
    GeneDefinition { name: "KnightProtectKpos", default: 5, min: 1, max: 20 },
    GeneDefinition { name: "BishopProtectKpos", default: 6, min: 1, max: 20 },
    GeneDefinition { name: "RookProtectKpos", default: 9, min: 1, max: 30 },
    GeneDefinition { name: "QueenProtectKpos", default: 10, min: 1, max: 30 },
    GeneDefinition { name: "RookTrappedByKing", default: 30, min: 5, max: 50 },
    GeneDefinition { name: "PawnProtectsKing1", default: 25, min: 7, max: 40 },
    GeneDefinition { name: "PawnProtectsKing2", default: 20, min: 8, max: 40 },
    GeneDefinition { name: "PawnProtectsKing3", default: 9, min: 3, max: 30 },
    GeneDefinition { name: "CastleKnightGuard", default: 10, min: 5, max: 30 },
    GeneDefinition { name: "CastleHole1", default: 15, min: 5, max: 50 },
    GeneDefinition { name: "CastleHole2", default: 35, min: 7, max: 55 },
    GeneDefinition { name: "CastleHole3", default: 29, min: 6, max: 50 },
    GeneDefinition { name: "CastleHoleDanger", default: 23, min: 5, max: 50 },
    GeneDefinition { name: "KingOpposition", default: 20, min: 5, max: 40 },
    GeneDefinition { name: "CanKCastleBonus", default: 15, min: 6, max: 30 },
    GeneDefinition { name: "CanQCastleBonus", default: 12, min: 5, max: 30 },
    GeneDefinition { name: "CanKQCastleBonus", default: 20, min: 7, max: 40 },
    GeneDefinition { name: "KCastlePathEmpty", default: 6, min: 2, max: 12 },
    GeneDefinition { name: "QCastlePathEmpty", default: 5, min: 2, max: 12 },
    GeneDefinition { name: "CtekHole", default: 5, min: 1, max: 12 },
    GeneDefinition { name: "CtekHoleQ", default: 50, min: 5, max: 150 },
    GeneDefinition { name: "CtekPawn1", default: 15, min: 2, max: 40 },
    GeneDefinition { name: "CtekPawn2", default: 5, min: 1, max: 30 },
    GeneDefinition { name: "CtekKnight", default: 8, min: 1, max: 25 },
    GeneDefinition { name: "CtekBishop", default: 5, min: 1, max: 20 },
    GeneDefinition { name: "CtekRook", default: 10, min: 1, max: 30 },
    GeneDefinition { name: "CtekQueen3", default: 13, min: 1, max: 40 },
    GeneDefinition { name: "CtekQueen2", default: 18, min: 1, max: 45 },
    GeneDefinition { name: "BishopImmobile", default: 20, min: 3, max: 40 },
    GeneDefinition { name: "CenterBlockBishop1", default: 20, min: 3, max: 40 },
    GeneDefinition { name: "CenterBlockBishop2", default: 7, min: 1, max: 30 },
    GeneDefinition { name: "TwoBishopSynergy", default: 10, min: 3, max: 25 },
    GeneDefinition { name: "BishopPinK", default: 12, min: 2, max: 30 },
    GeneDefinition { name: "BishopPinQ", default: 8, min: 1, max: 25 },
    GeneDefinition { name: "BishopPinR", default: 3, min: 0, max: 20 },
    GeneDefinition { name: "PawnFork", default: 30, min: 5, max: 60 },
    GeneDefinition { name: "PawnSideFile", default: 10, min: 3, max: 40 },
    GeneDefinition { name: "PawnDoubled", default: 14, min: 3, max: 50 },
    GeneDefinition { name: "PawnSplit", default: 12, min: 2, max: 40 },
    GeneDefinition { name: "PawnProtect1", default: 3, min: 0, max: 10 },
    GeneDefinition { name: "PawnProtect2", default: 5, min: 0, max: 12 },
    GeneDefinition { name: "BishopProtectPawn", default: 2, min: 0, max: 8 },
    GeneDefinition { name: "PassedPawnProtect1", default: 40, min: 5, max: 80 },
    GeneDefinition { name: "PassedPawnProtect2", default: 45, min: 6, max: 80 },
    GeneDefinition { name: "PassedPawnAlone", default: 18, min: 2, max: 50 },
    GeneDefinition { name: "PassedPawnVulnerable", default: 8, min: 1, max: 35 },
    GeneDefinition { name: "Passed3FromProm", default: 50, min: 10, max: 90 },
    GeneDefinition { name: "Passed2FromProm", default: 75, min: 15, max: 100 },
    GeneDefinition { name: "Passed1FromProm", default: 150, min: 20, max: 200 },
    GeneDefinition { name: "PassedPieceBlock", default: 8, min: 0, max: 20 },
    GeneDefinition { name: "Blocked2FromProm", default: 10, min: 1, max: 50 },
    GeneDefinition { name: "RookPinQ", default: 9, min: 0, max: 25 },
    GeneDefinition { name: "RookPinK", default: 13, min: 0, max: 30 },
    GeneDefinition { name: "RookOpenFile", default: 6, min: 1, max: 20 },
    GeneDefinition { name: "RookReachSeventh", default: 7, min: 1, max: 25 },
    GeneDefinition { name: "RookOnSeventh", default: 12, min: 2, max: 40 },
    GeneDefinition { name: "RookConnectVert", default: 4, min: 0, max: 15 },
    GeneDefinition { name: "RookConnectHor", default: 2, min: 0, max: 10 },
    GeneDefinition { name: "RookImmobileHor", default: 5, min: 0, max: 20 },
    GeneDefinition { name: "RookImmobile", default: 15, min: 1, max: 35 },
    GeneDefinition { name: "RookBacksPassedPawn1", default: 9, min: 1, max: 25 },
    GeneDefinition { name: "RookBacksPassedPawn2", default: 12, min: 1, max: 35 },
    GeneDefinition { name: "MO_PrevSquare", default: 210, min: 80, max: 350 },
    GeneDefinition { name: "MO_Check", default: 45, min: 15, max: 150 },
    GeneDefinition { name: "MO_KillerMove", default: 45, min: 15, max: 150 },
    GeneDefinition { name: "MO_HashHistShift", default: 4, min: 2, max: 6 },
    GeneDefinition { name: "MO_PawnCapture", default: 3, min: 0, max: 15 },
    GeneDefinition { name: "MO_PawnDanger", default: 1, min: 0, max: 8 },
    GeneDefinition { name: "MO_Forward", default: 5, min: 0, max: 20 },
    GeneDefinition { name: "MO_Castle", default: 10, min: 0, max: 40 },
    GeneDefinition { name: "KnightForkUncertainty", default: 7, min: 0, max: 9 },
];

macro_rules! gene_index_consts {
    ($($name:ident => $idx:expr),+ $(,)?) => {
        $(pub const $name: usize = $idx;)+
    };
}

gene_index_consts! {
    ESCAPE_CHECK_DEPTH => 0,
    MAX_CHECK_DEPTH => 1,
    MO_HASH_HIST_MAX => 2,
    MO_HASH_HIST_INCR => 3,
    S_SAFE_EVAL_PRUNE_MARGIN => 4,
    CHECK_BONUS => 5,
    TEMPO_BONUS => 6,
    KNIGHT_ATTACK_KPOS => 7,
    BISHOP_ATTACK_KPOS => 8,
    ROOK_ATTACK_KPOS => 9,
    QUEEN_ATTACK_KPOS => 10,
    PAWN_PROTECTS_KING1 => 16,
    KING_OPPOSITION => 24,
    CAN_KQ_CASTLE_BONUS => 27,
    BISHOP_IMMOBILE => 39,
    TWO_BISHOP_SYNERGY => 42,
    PAWN_DOUBLED => 48,
    PAWN_SPLIT => 49,
    PASSED_PAWN_ALONE => 55,
    PASSED_3_FROM_PROM => 57,
    PASSED_2_FROM_PROM => 58,
    PASSED_1_FROM_PROM => 59,
    ROOK_OPEN_FILE => 64,
    ROOK_REACH_SEVENTH => 65,
    ROOK_ON_SEVENTH => 66,
    ROOK_CONNECT_VERT => 67,
    ROOK_CONNECT_HOR => 68,
    MO_PREV_SQUARE => 73,
    MO_CHECK => 74,
    MO_KILLER_MOVE => 75,
    MO_HASH_HIST_SHIFT => 76,
    MO_PAWN_CAPTURE => 77,
    MO_PAWN_DANGER => 78,
    MO_FORWARD => 79,
    MO_CASTLE => 80,
}

/// A tuned instance of every heuristic constant, indexed positionally.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gene {
    values: [i32; GENE_COUNT],
}

impl Gene {
    /// All constants at their defaults.
    #[must_use]
    pub fn defaults() -> Gene {
        let mut values = [0; GENE_COUNT];
        for (i, def) in GENE_TABLE.iter().enumerate() {
            values[i] = def.default;
        }
        Gene { values }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> i32 {
        self.values[index]
    }

    pub fn set(&mut self, index: usize, value: i32) {
        let def = &GENE_TABLE[index];
        self.values[index] = value.clamp(def.min, def.max);
    }

    fn index_of(name: &str) -> Option<usize> {
        GENE_TABLE.iter().position(|def| def.name == name)
    }

    /// Load from `key=value` text, one assignment per line, `#` comments
    /// allowed. Keys absent from the text keep their default value;
    /// unrecognised keys are rejected rather than silently ignored, to
    /// catch typos in hand-edited gene files early.
    pub fn load_from_str(text: &str) -> Result<Gene, GeneError> {
        let mut gene = Gene::defaults();
        for (lineno, raw_line) in text.lines().enumerate() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(GeneError::Io(format!(
                    "gene file line {}: expected 'name=value'",
                    lineno + 1
                )));
            };
            let key = key.trim();
            let value: i32 = value.trim().parse().map_err(|_| {
                GeneError::Io(format!("gene file line {}: bad integer for '{key}'", lineno + 1))
            })?;
            let index = Gene::index_of(key)
                .ok_or_else(|| GeneError::Io(format!("unknown gene name '{key}'")))?;
            gene.set(index, value);
        }
        Ok(gene)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Gene, GeneError> {
        let text = std::fs::read_to_string(path).map_err(|e| GeneError::Io(e.to_string()))?;
        Gene::load_from_str(&text)
    }

    /// Serialize as `name=value` lines, one per constant, in table order.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (i, def) in GENE_TABLE.iter().enumerate() {
            let _ = writeln!(out, "{}={}", def.name, self.values[i]);
        }
        out
    }

    /// Name -> value view, for diagnostics and the command-channel facade.
    #[must_use]
    pub fn as_named_map(&self) -> HashMap<&'static str, i32> {
        GENE_TABLE.iter().enumerate().map(|(i, def)| (def.name, self.values[i])).collect()
    }
}

impl Default for Gene {
    fn default() -> Gene {
        Gene::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_table() {
        let gene = Gene::defaults();
        for (i, def) in GENE_TABLE.iter().enumerate() {
            assert_eq!(gene.get(i), def.default);
        }
    }

    #[test]
    fn load_overrides_named_keys_only() {
        let gene = Gene::load_from_str("TempoBonus=3\n# comment\nCheckBonus=4\n").unwrap();
        assert_eq!(gene.get(TEMPO_BONUS), 3);
        assert_eq!(gene.get(CHECK_BONUS), 4);
        assert_eq!(gene.get(ROOK_OPEN_FILE), GENE_TABLE[ROOK_OPEN_FILE].default);
    }

    #[test]
    fn load_clamps_out_of_range_values() {
        let gene = Gene::load_from_str("TempoBonus=999\n").unwrap();
        assert_eq!(gene.get(TEMPO_BONUS), GENE_TABLE[TEMPO_BONUS].max);
    }

    #[test]
    fn load_rejects_unknown_key() {
        assert!(Gene::load_from_str("NotAGene=1\n").is_err());
    }

    #[test]
    fn round_trips_through_text() {
        let mut gene = Gene::defaults();
        gene.set(TEMPO_BONUS, 2);
        let text = gene.to_text();
        let reloaded = Gene::load_from_str(&text).unwrap();
        assert_eq!(reloaded.get(TEMPO_BONUS), 2);
    }
}
