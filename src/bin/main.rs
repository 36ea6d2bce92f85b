//! Host binary: reads command lines from stdin, writes one response line
//! per command to stdout, per the command-channel protocol (spec §6).
//!
//! `--gene <path>`, `--book <path>`, `--endgame-dir <path>`, `--tt-mb <n>`,
//! `--seed <n>` configure the engine before the loop starts; all are
//! optional. Exit code 0 on normal termination (an `exit` command or EOF),
//! non-zero on a startup/usage error.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chenard_engine::command::Session;
use chenard_engine::config::EngineConfig;
use chenard_engine::eval::gene::Gene;
use chenard_engine::opening_book::OpeningBook;
use chenard_engine::player::Player;
use chenard_engine::types::PieceKind;

fn parse_args(args: &[String]) -> Result<EngineConfig, String> {
    let mut config = EngineConfig::default();
    let mut i = 0;
    while i < args.len() {
        let flag = &args[i];
        let mut next = || {
            i += 1;
            args.get(i).cloned().ok_or_else(|| format!("{flag} requires an argument"))
        };
        match flag.as_str() {
            "--gene" => config = config.with_gene_path(PathBuf::from(next()?)),
            "--book" => config = config.with_book_path(PathBuf::from(next()?)),
            "--endgame-dir" => config = config.with_endgame_dir(PathBuf::from(next()?)),
            "--tt-mb" => {
                let mb: usize = next()?.parse().map_err(|_| "--tt-mb expects an integer".to_string())?;
                config = config.with_tt_bytes(mb * 1024 * 1024);
            }
            "--seed" => {
                let seed: u64 = next()?.parse().map_err(|_| "--seed expects an integer".to_string())?;
                config = config.with_rng_seed(seed).with_randomize(true);
            }
            other => return Err(format!("unrecognized argument '{other}'")),
        }
        i += 1;
    }
    Ok(config)
}

/// Extra non-pawn pieces to try loading an endgame table for, if
/// `--endgame-dir` is given. Generation itself stays an offline step
/// (`endgame::generate::generate`); the host only loads `.egm` files that
/// already exist.
const ENDGAME_PIECE_SET: [PieceKind; 4] =
    [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop, PieceKind::Knight];

fn load_gene(config: &EngineConfig) -> Gene {
    match &config.gene_path {
        Some(path) => Gene::load_from_file(path).unwrap_or_else(|e| {
            chenard_engine::error::fatal(&format!("failed to load gene file {}: {e}", path.display()))
        }),
        None => Gene::defaults(),
    }
}

fn build_player(config: &EngineConfig, gene: Gene) -> Player {
    let mut player = Player::new(gene, config.tt_bytes, config.randomize, config.rng_seed);

    let book = match &config.book_path {
        Some(path) => match OpeningBook::load_from_file(path) {
            Ok(book) => Some(book),
            Err(e) => {
                eprintln!("warning: failed to load opening book {}: {e}", path.display());
                None
            }
        },
        #[cfg(feature = "embedded_book")]
        None => Some(chenard_engine::opening_book::embedded()),
        #[cfg(not(feature = "embedded_book"))]
        None => None,
    };
    player.set_book(book);

    if let Some(dir) = &config.endgame_dir {
        for &kind in &ENDGAME_PIECE_SET {
            let path = dir.join(format!("w{}.egm", kind.to_char()));
            if !path.exists() {
                continue;
            }
            match chenard_engine::endgame::EndgameTable::load(&path, kind) {
                Ok(table) => player.add_endgame_table(table),
                Err(e) => eprintln!("warning: failed to load endgame table {}: {e}", path.display()),
            }
        }
    }

    player
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("usage error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let gene = load_gene(&config);
    let mut session = Session::new(gene.clone(), config.tt_bytes);
    session.set_player(build_player(&config, gene));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let response = session.execute(&line);
        if writeln!(out, "{response}").is_err() {
            break;
        }
        let _ = out.flush();
        if session.should_exit() {
            break;
        }
    }

    ExitCode::SUCCESS
}
