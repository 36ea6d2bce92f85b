//! Pre-compiled opening book: a read-only tree of replies, looked up by
//! replaying the game's move history against it.
//!
//! Wire format matches the original engine's `opening.cpp`/`OpeningData`
//! layout exactly (see spec §6): a flat array of 32-bit words. A node is a
//! branch count `n` followed by `n` branches; each branch is `{size,
//! moveWord, reply-subtree}`. `moveWord` packs the source offset in bits
//! 8-14, the destination offset in bits 0-6, and a "bad move" (avoidable)
//! flag at bit 0x10000. `branchSize` is the branch's own total word count
//! (header plus subtree), so a lookup that doesn't match a branch can skip
//! straight past it without descending.

use rand::Rng;

use crate::board::Board;
use crate::error::BookError;
use crate::types::{Move, Offset, PieceKind};

const BAD_MOVE_BIT: u32 = 0x1_0000;
const OFFSET_MASK: u32 = 0x7F;

fn decode_move_word(word: u32) -> (Offset, Offset, bool) {
    let source = Offset(((word >> 8) & OFFSET_MASK) as u8);
    let dest = Offset((word & OFFSET_MASK) as u8);
    let bad = word & BAD_MOVE_BIT != 0;
    (source, dest, bad)
}

fn encode_move_word(source: Offset, dest: Offset, bad: bool) -> u32 {
    let mut word = (u32::from(source.0) << 8) | u32::from(dest.0);
    if bad {
        word |= BAD_MOVE_BIT;
    }
    word
}

/// A loaded, read-only opening tree.
pub struct OpeningBook {
    words: Vec<u32>,
}

impl OpeningBook {
    /// Parse the binary word array straight from file bytes (little-endian
    /// `u32`s, per §6).
    pub fn load_from_bytes(bytes: &[u8]) -> Result<OpeningBook, BookError> {
        if bytes.len() % 4 != 0 {
            return Err(BookError::Truncated);
        }
        let words = bytes.chunks_exact(4).map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect();
        Ok(OpeningBook { words })
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<OpeningBook, BookError> {
        let bytes = std::fs::read(path).map_err(|e| BookError::Io(e.to_string()))?;
        Self::load_from_bytes(&bytes)
    }

    /// Compile a book from whitespace-delimited long-algebraic game texts,
    /// one game (a sequence of moves from the initial position) per line.
    /// A move token may carry a trailing `?` marking it "book-avoidable"
    /// (§4.7); such moves are never offered by [`OpeningBook::reply_to`]
    /// but remain in the tree so later moves in the same line are still
    /// reachable.
    pub fn compile_from_text(text: &str) -> Result<OpeningBook, BookError> {
        let mut root = TreeNode::default();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut board = Board::new();
            let mut node = &mut root;
            for raw_token in line.split_whitespace() {
                let (token, bad) = match raw_token.strip_suffix('?') {
                    Some(stripped) => (stripped, true),
                    None => (raw_token, false),
                };
                let mv = board.parse_long_algebraic(token).map_err(|e| {
                    BookError::Io(format!("line {}: {e}", lineno + 1))
                })?;
                let source = mv.source();
                let dest = board.move_destination(mv);
                node = node.branch_mut(source, dest, bad);
                board.make_move(mv);
            }
        }
        let mut words = Vec::new();
        root.serialize(&mut words);
        Ok(OpeningBook { words })
    }

    /// Serialize back to the binary word format, e.g. after recompiling
    /// from an updated text source.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.words.len() * 4);
        for word in &self.words {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out
    }

    fn find_branch(&self, node_index: usize, source: Offset, dest: Offset) -> Option<usize> {
        let branch_count = *self.words.get(node_index)? as usize;
        let mut branch_index = node_index + 1;
        for _ in 0..branch_count {
            let branch_size = *self.words.get(branch_index)? as usize;
            let move_word = *self.words.get(branch_index + 1)?;
            let (bsource, bdest, _bad) = decode_move_word(move_word);
            if bsource == source && bdest == dest {
                return Some(branch_index + 2);
            }
            branch_index += branch_size;
        }
        None
    }

    /// Replay `board`'s move history against the tree, returning the node
    /// index reached, or `None` if the game has left the book.
    fn find_continuation(&self, board: &Board) -> Option<usize> {
        let mut replay = Board::new();
        let mut index = 0;
        for &mv in board.history() {
            let source = mv.source();
            let dest = replay.move_destination(mv);
            index = self.find_branch(index, source, dest)?;
            replay.make_move(mv);
        }
        Some(index)
    }

    /// All non-"bad" replies recorded at `node_index`.
    fn non_bad_replies(&self, node_index: usize) -> Vec<(Offset, Offset)> {
        let mut out = Vec::new();
        let Some(&branch_count) = self.words.get(node_index) else { return out };
        let mut branch_index = node_index + 1;
        for _ in 0..branch_count as usize {
            let Some(&branch_size) = self.words.get(branch_index) else { break };
            let Some(&move_word) = self.words.get(branch_index + 1) else { break };
            let (source, dest, bad) = decode_move_word(move_word);
            if !bad {
                out.push((source, dest));
            }
            branch_index += branch_size as usize;
        }
        out
    }

    /// Look up a reply to `board`'s current position: replay the move
    /// history to find the book node, filter out avoidable replies, and
    /// pick uniformly at random among what remains. Disabled for edited
    /// positions per §4.7 (there is no history to replay against the
    /// book's from-the-initial-position tree).
    pub fn reply_to(&self, board: &Board, rng: &mut impl Rng) -> Option<Move> {
        if board.is_edited() {
            return None;
        }
        let node_index = self.find_continuation(board)?;
        let replies = self.non_bad_replies(node_index);
        if replies.is_empty() {
            return None;
        }
        let (source, dest) = replies[rng.gen_range(0..replies.len())];
        let legal = board.generate_legal_moves();
        let mut fallback = None;
        for &mv in legal.iter() {
            if mv.source() != source || board.move_destination(mv) != dest {
                continue;
            }
            if mv.promotion_kind().is_none() || mv.promotion_kind() == Some(PieceKind::Queen) {
                return Some(mv);
            }
            fallback.get_or_insert(mv);
        }
        fallback
    }
}

/// A handful of well-known opening lines, compiled in behind the
/// `embedded_book` feature so a host binary has a sensible opening
/// repertoire with no external file to ship.
#[cfg(feature = "embedded_book")]
const DEFAULT_BOOK_TEXT: &str = "\
e2e4 e7e5 g1f3 b8c6 f1b5\n\
e2e4 e7e5 g1f3 b8c6 f1c4\n\
e2e4 c7c5 g1f3 d7d6\n\
e2e4 e7e6 d2d4 d7d5\n\
e2e4 c7c6 d2d4 d7d5\n\
d2d4 d7d5 c2c4 e7e6\n\
d2d4 g8f6 c2c4 e7e6 b1c3\n\
d2d4 g8f6 c2c4 g7g6\n\
g1f3 d7d5 c2c4 e7e6\n\
c2c4 e7e5 b1c3 g8f6\n\
";

#[cfg(feature = "embedded_book")]
#[must_use]
pub fn embedded() -> OpeningBook {
    OpeningBook::compile_from_text(DEFAULT_BOOK_TEXT)
        .unwrap_or_else(|e| crate::error::fatal(&format!("embedded opening book text malformed: {e}")))
}

#[derive(Default)]
struct TreeNode {
    branches: Vec<(Offset, Offset, bool, TreeNode)>,
}

impl TreeNode {
    fn branch_mut(&mut self, source: Offset, dest: Offset, bad: bool) -> &mut TreeNode {
        let pos = self.branches.iter().position(|(s, d, _, _)| *s == source && *d == dest);
        let idx = match pos {
            Some(i) => {
                if bad {
                    self.branches[i].2 = true;
                }
                i
            }
            None => {
                self.branches.push((source, dest, bad, TreeNode::default()));
                self.branches.len() - 1
            }
        };
        &mut self.branches[idx].3
    }

    fn serialize(&self, out: &mut Vec<u32>) {
        out.push(self.branches.len() as u32);
        for (source, dest, bad, child) in &self.branches {
            let branch_start = out.len();
            out.push(0);
            out.push(encode_move_word(*source, *dest, *bad));
            child.serialize(out);
            let branch_size = (out.len() - branch_start) as u32;
            out[branch_start] = branch_size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn replies_from_the_initial_position() {
        let book = OpeningBook::compile_from_text("e2e4 e7e5 g1f3\nd2d4 d7d5\n").unwrap();
        let board = Board::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mv = book.reply_to(&board, &mut rng).unwrap();
        let algebraic = board.move_to_long_algebraic(mv);
        assert!(algebraic == "e2e4" || algebraic == "d2d4");
    }

    #[test]
    fn avoidable_moves_are_never_offered() {
        let book = OpeningBook::compile_from_text("e2e4?\n").unwrap();
        let board = Board::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(book.reply_to(&board, &mut rng).is_none());
    }

    #[test]
    fn follows_history_to_a_deeper_node() {
        let book = OpeningBook::compile_from_text("e2e4 e7e5 g1f3\ne2e4 e7e5 b1c3\n").unwrap();
        let mut board = Board::new();
        for token in ["e2e4", "e7e5"] {
            let mv = board.parse_long_algebraic(token).unwrap();
            board.make_move(mv);
        }
        let mut rng = StdRng::seed_from_u64(2);
        let mv = book.reply_to(&board, &mut rng).unwrap();
        let algebraic = board.move_to_long_algebraic(mv);
        assert!(algebraic == "g1f3" || algebraic == "b1c3");
    }

    #[test]
    fn out_of_book_position_returns_none() {
        let book = OpeningBook::compile_from_text("e2e4 e7e5\n").unwrap();
        let mut board = Board::new();
        let mv = board.parse_long_algebraic("d2d4").unwrap();
        board.make_move(mv);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(book.reply_to(&board, &mut rng).is_none());
    }

    #[test]
    #[cfg(feature = "embedded_book")]
    fn embedded_book_compiles_and_replies_to_the_initial_position() {
        let book = embedded();
        let board = Board::new();
        let mut rng = StdRng::seed_from_u64(5);
        assert!(book.reply_to(&board, &mut rng).is_some());
    }

    #[test]
    fn byte_round_trip_preserves_lookup() {
        let book = OpeningBook::compile_from_text("e2e4 e7e5 g1f3\n").unwrap();
        let reloaded = OpeningBook::load_from_bytes(&book.to_bytes()).unwrap();
        let board = Board::new();
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(book.reply_to(&board, &mut rng).map(|m| m.source()), reloaded.reply_to(&board, &mut rng).map(|m| m.source()));
    }
}
