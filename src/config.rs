//! Engine configuration: gene file path, transposition table size, opening
//! book and endgame table locations, and the randomisation/RNG-seed pair
//! that determines whether two runs are bit-for-bit reproducible.
//!
//! The library never reads the environment or argv itself -- it takes an
//! [`EngineConfig`] value. Only `bin/main.rs` knows about CLI args and env
//! vars, mirroring the teacher's `engine::time::TimeConfig`: a plain struct
//! with a `Default` impl and builder-style setters, not a global.

use std::path::PathBuf;

/// Default transposition table size, in bytes, when not otherwise
/// configured: 32 MiB split evenly between the two per-side tables.
pub const DEFAULT_TT_BYTES: usize = 32 * 1024 * 1024;

/// Tunable knobs for one engine instance. Cloned cheaply; construct one
/// per [`crate::player::Player`] / [`crate::command::Session`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Path to a `key=value` gene file. `None` means defaults.
    pub gene_path: Option<PathBuf>,
    /// Transposition table budget, in bytes.
    pub tt_bytes: usize,
    /// Path to a compiled opening book binary. `None` disables the book.
    pub book_path: Option<PathBuf>,
    /// Directory to search for `*.egm` endgame table files. `None`
    /// disables endgame consultation.
    pub endgame_dir: Option<PathBuf>,
    /// Whether the root move list is shuffled before each search
    /// (non-deterministic play) or left in generation order.
    pub randomize: bool,
    /// Explicit RNG seed; `None` seeds from entropy. Set this to get
    /// reproducible play with `randomize` on.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            gene_path: None,
            tt_bytes: DEFAULT_TT_BYTES,
            book_path: None,
            endgame_dir: None,
            randomize: false,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_gene_path(mut self, path: impl Into<PathBuf>) -> EngineConfig {
        self.gene_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_tt_bytes(mut self, bytes: usize) -> EngineConfig {
        self.tt_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_book_path(mut self, path: impl Into<PathBuf>) -> EngineConfig {
        self.book_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_endgame_dir(mut self, path: impl Into<PathBuf>) -> EngineConfig {
        self.endgame_dir = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_randomize(mut self, randomize: bool) -> EngineConfig {
        self.randomize = randomize;
        self
    }

    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> EngineConfig {
        self.rng_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_book_or_endgame_paths() {
        let cfg = EngineConfig::default();
        assert!(cfg.book_path.is_none());
        assert!(cfg.endgame_dir.is_none());
        assert!(!cfg.randomize);
    }

    #[test]
    fn builder_setters_chain() {
        let cfg = EngineConfig::default().with_tt_bytes(1 << 20).with_randomize(true).with_rng_seed(7);
        assert_eq!(cfg.tt_bytes, 1 << 20);
        assert!(cfg.randomize);
        assert_eq!(cfg.rng_seed, Some(7));
    }
}
