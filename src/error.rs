//! Error types for every recoverable boundary: FEN/PGN/long-move parsing,
//! the gene file, the opening book, and endgame table I/O.
//!
//! Invariant violations (missing king, corrupt board state) are not
//! represented here — they are fatal, see [`crate::fatal`].

use std::fmt;

/// Error type for FEN parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    TooFewParts { found: usize },
    InvalidPiece { char: char },
    InvalidCastling { char: char },
    InvalidSideToMove { found: String },
    InvalidEnPassant { found: String },
    InvalidRank { rank: usize },
    TooManyFiles { rank: usize, files: usize },
    WrongKingCount { color: &'static str, found: usize },
    TooManyPieces { piece: char, found: usize, max: usize },
    CastlingRightsMismatch { flag: char },
    OpponentInCheck,
    PawnOnBackRank,
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN must have at least 4 parts, found {found}")
            }
            FenError::InvalidPiece { char } => write!(f, "invalid piece character '{char}' in FEN"),
            FenError::InvalidCastling { char } => {
                write!(f, "invalid castling character '{char}' in FEN")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidEnPassant { found } => write!(f, "invalid en passant square '{found}'"),
            FenError::InvalidRank { rank } => write!(f, "invalid rank index {rank} in FEN"),
            FenError::TooManyFiles { rank, files } => {
                write!(f, "too many files ({files}) in rank {rank}")
            }
            FenError::WrongKingCount { color, found } => {
                write!(f, "{color} must have exactly one king, found {found}")
            }
            FenError::TooManyPieces { piece, found, max } => {
                write!(f, "too many '{piece}' pieces: found {found}, max {max}")
            }
            FenError::CastlingRightsMismatch { flag } => {
                write!(f, "castling right '{flag}' claimed but king/rook not home")
            }
            FenError::OpponentInCheck => {
                write!(f, "side not on move is in check, position is illegal")
            }
            FenError::PawnOnBackRank => write!(f, "pawn on rank 1 or 8"),
        }
    }
}
impl std::error::Error for FenError {}

/// Error type for long-algebraic move parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    InvalidLength { len: usize },
    InvalidSquare { notation: String },
    InvalidPromotion { char: char },
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "move must be 4-5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "invalid square notation in '{notation}'")
            }
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "invalid promotion piece '{char}'")
            }
            MoveParseError::IllegalMove { notation } => write!(f, "illegal move '{notation}'"),
        }
    }
}
impl std::error::Error for MoveParseError {}

/// Error type for PGN (SAN) parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    Empty,
    NoMatchingMove { san: String },
    AmbiguousMove { san: String },
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanError::Empty => write!(f, "empty PGN move string"),
            SanError::NoMatchingMove { san } => write!(f, "no legal move matches '{san}'"),
            SanError::AmbiguousMove { san } => write!(f, "ambiguous PGN move '{san}'"),
        }
    }
}
impl std::error::Error for SanError {}

/// Error type for gene (heuristic constant) file loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneError {
    Io(String),
}

impl fmt::Display for GeneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneError::Io(msg) => write!(f, "gene file error: {msg}"),
        }
    }
}
impl std::error::Error for GeneError {}

/// Error type for opening book loading/lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    Io(String),
    Truncated,
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::Io(msg) => write!(f, "opening book error: {msg}"),
            BookError::Truncated => write!(f, "opening book file truncated"),
        }
    }
}
impl std::error::Error for BookError {}

/// Error type for endgame table file I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndgameError {
    Io(String),
    BadSignature,
    BadEntrySize { found: usize },
}

impl fmt::Display for EndgameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndgameError::Io(msg) => write!(f, "endgame table error: {msg}"),
            EndgameError::BadSignature => write!(f, "endgame table missing 'egdb' signature"),
            EndgameError::BadEntrySize { found } => {
                write!(f, "endgame table entry size must be 2 or 4, found {found}")
            }
        }
    }
}
impl std::error::Error for EndgameError {}

/// Error type for the command-channel facade (§6). Every variant maps to
/// exactly one of the uppercase protocol tokens; `Display` prints that
/// token so callers can forward it to the wire without a second match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownCommand,
    CannotParse,
    BadArgs,
    BadFormat,
    BadMove(String),
    BadNumTurns,
    BadThinkTime,
    ThinkError,
    GameOver,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand => write!(f, "UNKNOWN_COMMAND"),
            CommandError::CannotParse => write!(f, "CANNOT_PARSE"),
            CommandError::BadArgs => write!(f, "BAD_ARGS"),
            CommandError::BadFormat => write!(f, "BAD_FORMAT"),
            CommandError::BadMove(token) => write!(f, "BAD_MOVE {token}"),
            CommandError::BadNumTurns => write!(f, "BAD_NUM_TURNS"),
            CommandError::BadThinkTime => write!(f, "BAD_THINK_TIME"),
            CommandError::ThinkError => write!(f, "THINK_ERROR"),
            CommandError::GameOver => write!(f, "GAME_OVER"),
        }
    }
}
impl std::error::Error for CommandError {}

/// Fatal, unrecoverable invariant violation (missing king, corrupt board).
/// Mirrors the original engine's single `ChessFatal` function: log and
/// abort the process. No core routine ever catches its own fatal.
#[cold]
#[inline(never)]
pub fn fatal(message: &str) -> ! {
    #[cfg(feature = "logging")]
    log::error!("fatal: {message}");
    #[cfg(not(feature = "logging"))]
    eprintln!("fatal: {message}");
    std::process::abort();
}
