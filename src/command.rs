//! The command-channel facade (§6): one line in, one line out. Built as a
//! plain function over a [`Session`] rather than anything process- or
//! socket-shaped, so `bin/main.rs`, a test harness, or a future UI
//! collaborator can all drive it directly.
//!
//! Every recoverable error becomes one of the uppercase tokens in §6;
//! invariant violations still go through [`crate::error::fatal`] and are
//! never caught here.

use std::time::Duration;

use crate::board::Board;
use crate::error::CommandError;
use crate::eval::gene::Gene;
use crate::player::{NullObserver, Player};
use crate::search::Budget;
use crate::types::{Move, UnmakeInfo};

/// Which notation a `legal`/`history` response (or a `move`/`test`
/// argument) is read or written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Algebraic,
    Pgn,
}

impl Format {
    fn parse(token: &str) -> Result<Format, CommandError> {
        match token {
            "alg" => Ok(Format::Algebraic),
            "pgn" => Ok(Format::Pgn),
            _ => Err(CommandError::BadFormat),
        }
    }
}

/// One open game: the live board, the undo stack needed to reverse
/// `make_move` (the board only remembers the move list, not how to
/// unwind it), and the engine used to answer `think`.
pub struct Session {
    board: Board,
    undo_stack: Vec<(Move, UnmakeInfo)>,
    player: Player,
    exit_requested: bool,
}

impl Session {
    #[must_use]
    pub fn new(gene: Gene, tt_bytes: usize) -> Session {
        Session { board: Board::new(), undo_stack: Vec::new(), player: Player::new(gene, tt_bytes, false, None), exit_requested: false }
    }

    /// Replace the current [`Player`], e.g. to attach a book/endgame
    /// tables or a seeded RNG built by `bin/main.rs` from an
    /// [`crate::config::EngineConfig`].
    pub fn set_player(&mut self, player: Player) {
        self.player = player;
    }

    #[must_use]
    pub fn should_exit(&self) -> bool {
        self.exit_requested
    }

    /// Parse one line of input and produce one line of output. Never
    /// panics on malformed input; the only way out of this function
    /// other than a response string is a fatal invariant violation
    /// elsewhere in the engine.
    pub fn execute(&mut self, line: &str) -> String {
        let mut tokens = line.split_whitespace();
        let Some(verb) = tokens.next() else {
            return CommandError::CannotParse.to_string();
        };
        let args: Vec<&str> = tokens.collect();

        let result = match verb {
            "new" => self.cmd_new(&args),
            "status" => self.cmd_status(&args),
            "legal" => self.cmd_legal(&args),
            "test" => self.cmd_test(&args),
            "move" => self.cmd_move(&args),
            "think" => self.cmd_think(&args),
            "undo" => self.cmd_undo(&args),
            "history" => self.cmd_history(&args),
            "exit" => self.cmd_exit(&args),
            _ => Err(CommandError::UnknownCommand),
        };

        match result {
            Ok(response) => response,
            Err(err) => err.to_string(),
        }
    }

    fn cmd_new(&mut self, args: &[&str]) -> Result<String, CommandError> {
        if !args.is_empty() {
            return Err(CommandError::BadArgs);
        }
        self.board = Board::new();
        self.undo_stack.clear();
        Ok("OK".to_string())
    }

    fn cmd_status(&mut self, args: &[&str]) -> Result<String, CommandError> {
        if !args.is_empty() {
            return Err(CommandError::BadArgs);
        }
        Ok(format!("{} {}", self.game_result(), self.board.to_fen()))
    }

    fn game_result(&self) -> &'static str {
        if !self.board.game_is_over() {
            return "*";
        }
        if self.board.is_definite_draw() {
            return "1/2-1/2";
        }
        match self.board.side_to_move() {
            crate::types::Color::White => "0-1",
            crate::types::Color::Black => "1-0",
        }
    }

    fn cmd_legal(&mut self, args: &[&str]) -> Result<String, CommandError> {
        let format = match args {
            [] => Format::Algebraic,
            [fmt] => Format::parse(fmt)?,
            _ => return Err(CommandError::BadArgs),
        };
        let moves = self.board.generate_legal_moves();
        let rendered: Vec<String> = moves.iter().map(|&mv| self.render_move(mv, format)).collect();
        Ok(format!("OK {} {}", rendered.len(), rendered.join(" ")).trim_end().to_string())
    }

    fn cmd_test(&mut self, args: &[&str]) -> Result<String, CommandError> {
        let [token] = args else { return Err(CommandError::BadArgs) };
        match self.parse_any_move(token) {
            Ok(mv) => {
                let alg = self.board.move_to_long_algebraic(mv);
                let pgn = self.board.move_to_san(mv);
                Ok(format!("OK {alg} {pgn}"))
            }
            Err(_) => Ok("ILLEGAL".to_string()),
        }
    }

    /// Apply every move in order; on the first one that fails to parse,
    /// undo everything already applied and report which token failed.
    fn cmd_move(&mut self, args: &[&str]) -> Result<String, CommandError> {
        if args.is_empty() {
            return Err(CommandError::BadArgs);
        }
        let mut applied = Vec::with_capacity(args.len());
        for &token in args {
            match self.parse_any_move(token) {
                Ok(mv) => {
                    let info = self.board.make_move(mv);
                    applied.push((mv, info));
                }
                Err(_) => {
                    for (mv, info) in applied.into_iter().rev() {
                        self.board.unmake_move(mv, info);
                    }
                    return Err(CommandError::BadMove(token.to_string()));
                }
            }
        }
        let count = applied.len();
        self.undo_stack.extend(applied);
        Ok(format!("OK {count}"))
    }

    fn cmd_think(&mut self, args: &[&str]) -> Result<String, CommandError> {
        let [ms_token] = args else { return Err(CommandError::BadArgs) };
        let ms: u64 = ms_token.parse().map_err(|_| CommandError::BadThinkTime)?;
        if ms == 0 {
            return Err(CommandError::BadThinkTime);
        }
        if self.board.game_is_over() {
            return Err(CommandError::GameOver);
        }

        let budget = Budget::Time(Duration::from_millis(ms));
        let mut observer = NullObserver;
        let choice = self.player.choose_move(&mut self.board, budget, &mut observer);
        let Some(mv) = choice.best_move() else {
            return Err(CommandError::ThinkError);
        };

        let alg = self.board.move_to_long_algebraic(mv);
        let pgn = self.board.move_to_san(mv);
        let info = self.board.make_move(mv);
        self.undo_stack.push((mv, info));
        Ok(format!("OK {alg} {pgn}"))
    }

    fn cmd_undo(&mut self, args: &[&str]) -> Result<String, CommandError> {
        let [n_token] = args else { return Err(CommandError::BadArgs) };
        let n: usize = n_token.parse().map_err(|_| CommandError::BadNumTurns)?;
        if n > self.undo_stack.len() {
            return Err(CommandError::BadNumTurns);
        }
        for _ in 0..n {
            let (mv, info) = self.undo_stack.pop().expect("length checked above");
            self.board.unmake_move(mv, info);
        }
        Ok("OK".to_string())
    }

    fn cmd_history(&mut self, args: &[&str]) -> Result<String, CommandError> {
        let format = match args {
            [] => Format::Algebraic,
            [fmt] => Format::parse(fmt)?,
            _ => return Err(CommandError::BadArgs),
        };
        let moves: Vec<Move> = self.board.history().to_vec();
        let mut replay = match self.board.initial_fen() {
            Some(fen) => Board::try_from_fen(fen).unwrap_or_else(|_| Board::new()),
            None => Board::new(),
        };
        let mut rendered = Vec::with_capacity(moves.len());
        for mv in moves {
            rendered.push(render_move_on(&replay, mv, format));
            replay.make_move(mv);
        }
        Ok(format!("OK {} {}", rendered.len(), rendered.join(" ")).trim_end().to_string())
    }

    fn cmd_exit(&mut self, args: &[&str]) -> Result<String, CommandError> {
        if !args.is_empty() {
            return Err(CommandError::BadArgs);
        }
        self.exit_requested = true;
        Ok("OK".to_string())
    }

    fn render_move(&self, mv: Move, format: Format) -> String {
        render_move_on(&self.board, mv, format)
    }

    fn parse_any_move(&self, token: &str) -> Result<Move, CommandError> {
        if let Ok(mv) = self.board.parse_long_algebraic(token) {
            return Ok(mv);
        }
        self.board.parse_san(token).map_err(|_| CommandError::BadMove(token.to_string()))
    }
}

fn render_move_on(board: &Board, mv: Move, format: Format) -> String {
    match format {
        Format::Algebraic => board.move_to_long_algebraic(mv),
        Format::Pgn => board.move_to_san(mv),
    }
}
