//! Two-table transposition cache, one table per side to move (mirroring
//! the fact that a position's best reply depends on who moves next even
//! when the raw hash collides).

use crate::types::Move;

/// A cached search result for one position.
#[derive(Clone, Copy, Debug)]
pub struct TranspositionEntry {
    pub hash: u32,
    pub depth: u32,
    /// Distance from the search root this entry was created at, used to
    /// translate mate scores back to "plies from here" on lookup.
    pub birth_ply: u32,
    pub score: i32,
    pub alpha: i32,
    pub beta: i32,
    pub best_move: Move,
    generation: u32,
}

impl TranspositionEntry {
    /// True iff `score` is an exact value rather than a bound: the stored
    /// window strictly contained the score when it was written.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.score > self.alpha && self.score < self.beta
    }
}

struct Slot {
    entry: Option<TranspositionEntry>,
}

/// One side's table: a direct-mapped array of slots indexed by `hash % len`.
struct Table {
    slots: Vec<Slot>,
}

impl Table {
    fn new(entries: usize) -> Table {
        let entries = entries.max(1);
        Table { slots: (0..entries).map(|_| Slot { entry: None }).collect() }
    }

    fn index(&self, hash: u32) -> usize {
        hash as usize % self.slots.len()
    }

    fn probe(&self, hash: u32) -> Option<&TranspositionEntry> {
        self.slots[self.index(hash)].entry.as_ref().filter(|e| e.hash == hash)
    }

    fn store(&mut self, entry: TranspositionEntry, generation: u32) {
        let idx = self.index(entry.hash);
        let replace = match &self.slots[idx].entry {
            None => true,
            Some(existing) => existing.generation != generation || entry.depth >= existing.depth,
        };
        if replace {
            self.slots[idx].entry = Some(entry);
        }
    }
}

/// Two direct-mapped caches (white-to-move, black-to-move), sized by total
/// byte budget at construction.
pub struct TranspositionTable {
    white: Table,
    black: Table,
    generation: u32,
}

const BYTES_PER_ENTRY: usize = std::mem::size_of::<TranspositionEntry>() + std::mem::size_of::<Option<()>>();

impl TranspositionTable {
    /// Size the table from a total byte budget, split evenly between the
    /// two per-side tables.
    #[must_use]
    pub fn with_byte_budget(bytes: usize) -> TranspositionTable {
        let entries_per_side = (bytes / 2 / BYTES_PER_ENTRY).max(1);
        TranspositionTable {
            white: Table::new(entries_per_side),
            black: Table::new(entries_per_side),
            generation: 0,
        }
    }

    fn table_for(&self, white_to_move: bool) -> &Table {
        if white_to_move {
            &self.white
        } else {
            &self.black
        }
    }

    fn table_for_mut(&mut self, white_to_move: bool) -> &mut Table {
        if white_to_move {
            &mut self.white
        } else {
            &mut self.black
        }
    }

    /// Mark every existing entry stale as of a new search: the next
    /// `store` into a slot last written at an older generation always
    /// replaces it, regardless of depth.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[must_use]
    pub fn probe(&self, white_to_move: bool, hash: u32) -> Option<&TranspositionEntry> {
        self.table_for(white_to_move).probe(hash)
    }

    /// Store a search result. Replaces the slot if it is empty, stale
    /// (from a prior search), or the incoming search went at least as
    /// deep as what is already there.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &mut self,
        white_to_move: bool,
        hash: u32,
        depth: u32,
        birth_ply: u32,
        score: i32,
        alpha: i32,
        beta: i32,
        best_move: Move,
    ) {
        let generation = self.generation;
        self.table_for_mut(white_to_move).store(
            TranspositionEntry { hash, depth, birth_ply, score, alpha, beta, best_move, generation },
            generation,
        );
    }
}

/// A table behind a lock, for a caller that wants to share one
/// transposition cache across more than one search (e.g. a future
/// pondering thread alongside the main search). The default single
/// search path in [`crate::search::Search`] owns its table by value and
/// never goes through this wrapper.
pub struct SharedTable(parking_lot::Mutex<TranspositionTable>);

impl SharedTable {
    #[must_use]
    pub fn with_byte_budget(bytes: usize) -> SharedTable {
        SharedTable(parking_lot::Mutex::new(TranspositionTable::with_byte_budget(bytes)))
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, TranspositionTable> {
        self.0.lock()
    }
}
