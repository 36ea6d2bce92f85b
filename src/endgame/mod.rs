//! Endgame tablebases: King + one extra white piece versus a lone king.
//!
//! Generation lives in [`generate`]; this module owns the on-disk format
//! (§3/§6), the 8-fold dihedral symmetry reduction used to keep the table
//! small, and consultation at search time.
//!
//! Scope: the original engine's database generator (`egdbase.cpp`)
//! supports arbitrary non-king piece combinations, including pawns (with
//! their own 2-fold left-right symmetry). This crate's generator (see
//! [`generate::generate`]) is scoped to the single-extra-white-piece case
//! (KQvK, KRvK, ...) that covers every endgame a search actually needs a
//! forced mate for; the file format and canonical-index machinery here are
//! written to generalise, but multi-piece and pawn-bearing sets are not
//! wired up to a generator. Recorded as an open question resolution in
//! `DESIGN.md` rather than silently guessed.

pub mod generate;

use std::io::Write as _;
use std::path::Path;

use crate::error::EndgameError;
use crate::types::{Color, Move, Offset, Piece, PieceKind};

const SIGNATURE: &[u8; 4] = b"egdb";
const PREFIX_SIZE: usize = 32;

/// One of the 8 symmetries of the square board (the dihedral group D4),
/// used to fold the 64x64x64 (black king x white king x extra piece)
/// search space down to the ~10x64x64 a canonical black-king-in-the-a1-
/// d1-d4-triangle representative set needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symmetry {
    Id,
    Rot90,
    Rot180,
    Rot270,
    FlipFile,
    FlipRank,
    FlipDiag,
    FlipAnti,
}

const ALL_SYMMETRIES: [Symmetry; 8] = [
    Symmetry::Id,
    Symmetry::Rot90,
    Symmetry::Rot180,
    Symmetry::Rot270,
    Symmetry::FlipFile,
    Symmetry::FlipRank,
    Symmetry::FlipDiag,
    Symmetry::FlipAnti,
];

impl Symmetry {
    fn apply(self, file: i32, rank: i32) -> (i32, i32) {
        match self {
            Symmetry::Id => (file, rank),
            Symmetry::Rot90 => (rank, 7 - file),
            Symmetry::Rot180 => (7 - file, 7 - rank),
            Symmetry::Rot270 => (7 - rank, file),
            Symmetry::FlipFile => (7 - file, rank),
            Symmetry::FlipRank => (file, 7 - rank),
            Symmetry::FlipDiag => (rank, file),
            Symmetry::FlipAnti => (7 - rank, 7 - file),
        }
    }

    fn apply_offset(self, offset: Offset) -> Offset {
        let (f, r) = self.apply(offset.file(), offset.rank());
        Offset::from_file_rank(f, r)
    }

    fn inverse(self) -> Symmetry {
        match self {
            Symmetry::Rot90 => Symmetry::Rot270,
            Symmetry::Rot270 => Symmetry::Rot90,
            other => other,
        }
    }
}

/// True for the 10 squares of the standard a1-d1-d4 triangle: `file <= 3`
/// and `file <= rank <= 3`. Every square on the board is equivalent, under
/// some symmetry, to exactly one square in this set (ties on the main
/// diagonal are broken by picking the first matching symmetry in a fixed
/// enumeration order).
fn in_triangle(file: i32, rank: i32) -> bool {
    (0..=3).contains(&file) && (file..=3).contains(&rank)
}

/// The symmetry that maps `black_king` into the canonical triangle.
pub(crate) fn canonicalizing_symmetry(black_king: Offset) -> Symmetry {
    for &sym in &ALL_SYMMETRIES {
        let (f, r) = sym.apply(black_king.file(), black_king.rank());
        if in_triangle(f, r) {
            return sym;
        }
    }
    unreachable!("every square maps into the triangle under some symmetry")
}

fn square_index(offset: Offset) -> usize {
    (offset.file() + 8 * offset.rank()) as usize
}

fn square_from_index(index: usize) -> Offset {
    Offset::from_file_rank((index % 8) as i32, (index / 8) as i32)
}

/// Flat index into the table for (black king, white king, extra piece),
/// all already-canonical squares (0..64 each).
pub(crate) fn table_index(black_king: Offset, white_king: Offset, extra: Offset) -> usize {
    (square_index(black_king) * 64 + square_index(white_king)) * 64 + square_index(extra)
}

pub(crate) const TABLE_LEN: usize = 64 * 64 * 64;

/// Which piece a packed entry says moves: the king, or the tracked extra
/// piece. Two bits, matching §3's "2 bits into the piece slot 1..4".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MovingPiece {
    King,
    Extra,
}

/// A decoded packed endgame entry: distance to mate in plies, which piece
/// moves, and its (canonical) destination square.
#[derive(Debug, Clone, Copy)]
pub struct EndgameMove {
    pub(crate) plies_to_mate: u8,
    pub(crate) piece: MovingPiece,
    pub(crate) dest: Offset,
}

fn pack(entry: EndgameMove) -> u16 {
    let piece_bits: u16 = match entry.piece {
        MovingPiece::King => 0,
        MovingPiece::Extra => 1,
    };
    let low = (piece_bits << 6) | (square_index(entry.dest) as u16 & 0x3F);
    (u16::from(entry.plies_to_mate) << 8) | low
}

fn unpack(word: u16) -> Option<EndgameMove> {
    if word & 0xFF == 0 {
        return None;
    }
    let plies_to_mate = (word >> 8) as u8;
    let low = word & 0xFF;
    let piece = if (low >> 6) & 1 == 0 { MovingPiece::King } else { MovingPiece::Extra };
    let dest = square_from_index((low & 0x3F) as usize);
    Some(EndgameMove { plies_to_mate, piece, dest })
}

/// A loaded King+piece-vs-King tablebase: which extra piece it covers, and
/// the canonical-index-ordered packed entries.
pub struct EndgameTable {
    pub extra_piece: PieceKind,
    entries: Vec<u16>,
}

impl EndgameTable {
    #[must_use]
    pub(crate) fn from_entries(extra_piece: PieceKind, entries: Vec<u16>) -> EndgameTable {
        debug_assert_eq!(entries.len(), TABLE_LEN);
        EndgameTable { extra_piece, entries }
    }

    /// Conventional file name for this piece set, e.g. `wq.egm` for a
    /// white queen, matching the original naming scheme (§6).
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("w{}.egm", self.extra_piece.to_char())
    }

    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), EndgameError> {
        let path = dir.as_ref().join(self.file_name());
        let tmp_path = path.with_extension("egm.tmp");
        let result = (|| -> Result<(), EndgameError> {
            let mut file =
                std::fs::File::create(&tmp_path).map_err(|e| EndgameError::Io(e.to_string()))?;
            let mut prefix = [0u8; PREFIX_SIZE];
            prefix[0..4].copy_from_slice(SIGNATURE);
            prefix[4..6].copy_from_slice(&(PREFIX_SIZE as u16).to_le_bytes());
            prefix[6..8].copy_from_slice(&2u16.to_le_bytes());
            prefix[8..12].copy_from_slice(&(self.entries.len() as u32).to_le_bytes());
            file.write_all(&prefix).map_err(|e| EndgameError::Io(e.to_string()))?;
            for word in &self.entries {
                file.write_all(&word.to_le_bytes()).map_err(|e| EndgameError::Io(e.to_string()))?;
            }
            Ok(())
        })();
        if result.is_err() {
            let _ = std::fs::remove_file(&tmp_path);
            return result;
        }
        std::fs::rename(&tmp_path, &path).map_err(|e| EndgameError::Io(e.to_string()))?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, extra_piece: PieceKind) -> Result<EndgameTable, EndgameError> {
        let bytes = std::fs::read(path).map_err(|e| EndgameError::Io(e.to_string()))?;
        if bytes.len() < PREFIX_SIZE || &bytes[0..4] != SIGNATURE {
            return Err(EndgameError::BadSignature);
        }
        let entry_size = u16::from_le_bytes([bytes[6], bytes[7]]) as usize;
        if entry_size != 2 {
            return Err(EndgameError::BadEntrySize { found: entry_size });
        }
        let num_entries = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        let body = &bytes[PREFIX_SIZE..];
        if body.len() < num_entries * 2 {
            return Err(EndgameError::Io("truncated endgame table body".to_string()));
        }
        let entries = body[..num_entries * 2]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Ok(EndgameTable { extra_piece, entries })
    }

    /// True if `board`'s material exactly matches this table's piece set:
    /// White has a king plus exactly one of `extra_piece`, Black has a
    /// bare king, no other material on either side.
    #[must_use]
    pub fn matches(&self, board: &crate::board::Board) -> bool {
        for kind in [PieceKind::Pawn, PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen] {
            let expected_white = if kind == self.extra_piece { 1 } else { 0 };
            if board.inventory_count(Color::White, kind) != expected_white {
                return false;
            }
            if board.inventory_count(Color::Black, kind) != 0 {
                return false;
            }
        }
        true
    }

    /// Consult the table for `board`, which must satisfy [`Self::matches`]
    /// and have White to move. Returns the proven optimal move and its
    /// proven mate distance in plies, or `None` if this exact position was
    /// never reached during generation (recorded as a draw/unknown).
    #[must_use]
    pub fn consult(&self, board: &crate::board::Board) -> Option<(Move, u8)> {
        if board.side_to_move() != Color::White {
            return None;
        }
        let white_king = board.king_offset(Color::White);
        let black_king = board.king_offset(Color::Black);
        let extra = find_piece(board, Color::White, self.extra_piece)?;

        let sym = canonicalizing_symmetry(black_king);
        let index = table_index(sym.apply_offset(black_king), sym.apply_offset(white_king), sym.apply_offset(extra));
        let entry = unpack(self.entries[index])?;

        let inverse = sym.inverse();
        let source = match entry.piece {
            MovingPiece::King => white_king,
            MovingPiece::Extra => extra,
        };
        let dest = inverse.apply_offset(entry.dest);

        let legal = board.generate_legal_moves();
        let mv = legal.iter().find(|&&mv| mv.source() == source && board.move_destination(mv) == dest).copied()?;
        Some((mv, entry.plies_to_mate))
    }
}

fn find_piece(board: &crate::board::Board, color: Color, kind: PieceKind) -> Option<Offset> {
    for y in 2..=9 {
        for x in 2..=9 {
            let offset = Offset::new(x, y);
            if board.piece_at(offset) == Piece::Occupied(color, kind) {
                return Some(offset);
            }
        }
    }
    None
}

pub(crate) fn pack_entry(entry: EndgameMove) -> u16 {
    pack(entry)
}

pub(crate) fn unpack_entry(word: u16) -> Option<EndgameMove> {
    unpack(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_square_canonicalizes_into_the_triangle() {
        for y in 0..8 {
            for x in 0..8 {
                let sq = Offset::from_file_rank(x, y);
                let sym = canonicalizing_symmetry(sq);
                let canon = sym.apply_offset(sq);
                assert!(in_triangle(canon.file(), canon.rank()), "{x},{y} -> {canon:?}");
            }
        }
    }

    #[test]
    fn symmetry_inverse_round_trips() {
        for &sym in &ALL_SYMMETRIES {
            let sq = Offset::from_file_rank(2, 5);
            let back = sym.inverse().apply_offset(sym.apply_offset(sq));
            assert_eq!(back, sq);
        }
    }

    #[test]
    fn pack_unpack_round_trips() {
        let entry = EndgameMove { plies_to_mate: 7, piece: MovingPiece::Extra, dest: Offset::from_file_rank(3, 4) };
        let word = pack_entry(entry);
        let back = unpack_entry(word).unwrap();
        assert_eq!(back.plies_to_mate, 7);
        assert_eq!(back.piece, MovingPiece::Extra);
        assert_eq!(back.dest, Offset::from_file_rank(3, 4));
    }

    #[test]
    fn zero_word_is_no_entry() {
        assert!(unpack_entry(0).is_none());
    }
}
