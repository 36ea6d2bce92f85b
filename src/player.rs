//! The `Player` facade: picks a move for the side to move, trying each
//! source in order before falling back to the next (§4.9).
//!
//! 1. Opening book, if loaded and the board has an unbroken history.
//! 2. Endgame tablebase, if loaded and the material matches exactly.
//! 3. Search.
//!
//! Statistics for whichever source actually ran are reported to an
//! [`Observer`], mirroring the teacher's `SearchLogger` (see
//! `board/search/log.rs`) rather than inventing a new reporting shape.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::Board;
use crate::endgame::EndgameTable;
use crate::eval::gene::Gene;
use crate::opening_book::OpeningBook;
use crate::search::{Budget, Search, SearchResult};
use crate::types::{Move, PieceKind};

/// One reported line of statistics: which source answered, how many
/// search nodes it cost (zero for book/endgame lookups, which never
/// visit a node), and to what depth the answer is proven.
#[derive(Debug, Clone)]
pub struct PlayerStats {
    pub source: MoveSource,
    pub nodes: u64,
    pub depth: u32,
}

/// Which of the three sources in §4.9 produced the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    Endgame,
    Search,
}

/// Observer callback for per-move statistics, analogous to the teacher's
/// `SearchLogger::info`. The default no-op keeps a `Player` usable without
/// a UI attached.
pub trait Observer {
    fn report(&mut self, stats: &PlayerStats);
}

/// An observer that discards everything; the default for headless use
/// (tests, benches).
pub struct NullObserver;

impl Observer for NullObserver {
    fn report(&mut self, _stats: &PlayerStats) {}
}

/// What the player chose and, when it came from search, the full result
/// (score, best path, whether the budget cut it short).
pub enum Choice {
    Book(Move),
    Endgame { mv: Move, plies_to_mate: u8 },
    Search(SearchResult),
}

impl Choice {
    #[must_use]
    pub fn best_move(&self) -> Option<Move> {
        match self {
            Choice::Book(mv) => Some(*mv),
            Choice::Endgame { mv, .. } => Some(*mv),
            Choice::Search(result) => result.best_move,
        }
    }
}

/// Owns the engine's long-lived state: the search driver (and its
/// transposition table), the gene vector, an optional opening book, zero
/// or more loaded endgame tables, and the RNG used for book/root
/// randomisation.
pub struct Player {
    search: Search,
    gene: Gene,
    book: Option<OpeningBook>,
    endgame_tables: Vec<EndgameTable>,
    randomize: bool,
    rng: StdRng,
}

impl Player {
    #[must_use]
    pub fn new(gene: Gene, tt_bytes: usize, randomize: bool, rng_seed: Option<u64>) -> Player {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Player { search: Search::new(tt_bytes), gene, book: None, endgame_tables: Vec::new(), randomize, rng }
    }

    pub fn set_book(&mut self, book: Option<OpeningBook>) {
        self.book = book;
    }

    pub fn add_endgame_table(&mut self, table: EndgameTable) {
        self.endgame_tables.push(table);
    }

    #[must_use]
    pub fn abort_handle(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        self.search.abort_handle()
    }

    fn endgame_table_for(&self, board: &Board) -> Option<&EndgameTable> {
        self.endgame_tables.iter().find(|table| table.matches(board))
    }

    /// Choose a move for `board`'s side to move, trying book then endgame
    /// then search, and reporting whichever source answered to
    /// `observer`.
    pub fn choose_move(&mut self, board: &mut Board, budget: Budget, observer: &mut dyn Observer) -> Choice {
        if let Some(book) = &self.book {
            if let Some(mv) = book.reply_to(board, &mut self.rng) {
                let stats = PlayerStats { source: MoveSource::Book, nodes: 0, depth: 0 };
                observer.report(&stats);
                return Choice::Book(mv);
            }
        }

        if board.side_to_move() == crate::types::Color::White {
            if let Some(table) = self.endgame_table_for(board) {
                if let Some((mv, plies_to_mate)) = table.consult(board) {
                    let stats = PlayerStats { source: MoveSource::Endgame, nodes: 0, depth: u32::from(plies_to_mate) };
                    observer.report(&stats);
                    return Choice::Endgame { mv, plies_to_mate };
                }
            }
        }

        let result = self.search.search_root(board, &self.gene, budget, self.randomize, &mut self.rng);
        let stats = PlayerStats { source: MoveSource::Search, nodes: result.nodes, depth: result.depth_completed };
        observer.report(&stats);
        Choice::Search(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::eval::gene::Gene;

    struct CollectingObserver {
        reports: Vec<PlayerStats>,
    }

    impl Observer for CollectingObserver {
        fn report(&mut self, stats: &PlayerStats) {
            self.reports.push(stats.clone());
        }
    }

    #[test]
    fn falls_through_to_search_with_no_book_or_endgame() {
        let mut player = Player::new(Gene::defaults(), 1 << 16, false, Some(1));
        let mut board = Board::new();
        let mut observer = CollectingObserver { reports: Vec::new() };
        let choice = player.choose_move(&mut board, Budget::Depth(2), &mut observer);
        assert!(choice.best_move().is_some());
        assert_eq!(observer.reports.len(), 1);
        assert_eq!(observer.reports[0].source, MoveSource::Search);
    }

    #[test]
    fn endgame_table_is_consulted_before_search() {
        let mut player = Player::new(Gene::defaults(), 1 << 16, false, Some(1));
        player.add_endgame_table(crate::endgame::generate::generate(PieceKind::Queen));
        let mut board = Board::try_from_fen("7k/8/8/8/8/8/8/K6Q w - - 0 1").unwrap();
        let mut observer = CollectingObserver { reports: Vec::new() };
        let choice = player.choose_move(&mut board, Budget::Depth(2), &mut observer);
        assert!(choice.best_move().is_some());
        assert_eq!(observer.reports[0].source, MoveSource::Endgame);
    }

    #[test]
    fn book_reply_is_preferred_over_search() {
        let mut player = Player::new(Gene::defaults(), 1 << 16, false, Some(1));
        let book = OpeningBook::compile_from_text("e2e4\n").unwrap();
        player.set_book(Some(book));
        let mut board = Board::new();
        let mut observer = CollectingObserver { reports: Vec::new() };
        let choice = player.choose_move(&mut board, Budget::Depth(2), &mut observer);
        let mv = choice.best_move().unwrap();
        assert_eq!(board.move_to_long_algebraic(mv), "e2e4");
        assert_eq!(observer.reports[0].source, MoveSource::Book);
    }
}
