// SPDX-License-Identifier: MIT
//
// n-man: view man page sources in the terminal.
//
// This is the binary that wires the two library crates together:
//
//   n-troff → macro trie, document scanner, title lexer, raw/gzip loading
//   n-term  → terminal control, surfaces, diff renderer, event loop
//
// Each file on the command line gets its own PagerSession, viewed to
// completion before the next one starts:
//
//   args → Cli → MacroTrie (once) → EventLoop::start
//        → for each file: load → scan → display → run → teardown
//        → EventLoop::stop → diagnostics → exit status
//
// The terminal is always handed back before anything is printed to stderr.

mod cli;
mod pager;

use std::env;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use thiserror::Error;

use n_term::event_loop::EventLoop;
use n_troff::{MacroTrie, TrieError};

use crate::cli::Cli;
use crate::pager::{PagerConfig, PagerError};

// ─── Startup errors ──────────────────────────────────────────────────────────

/// Failures before the first page is shown. All of them end the process.
#[derive(Debug, Error)]
enum StartupError {
    #[error("can't open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: io::Error },

    #[error("can't install logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("bad macro table: {0}")]
    MacroTable(#[from] TrieError),

    #[error("failed to initialize terminal: {0}")]
    Terminal(#[from] io::Error),
}

// ─── Logging ─────────────────────────────────────────────────────────────────

/// Install `env_logger`. Off by default; `RUST_LOG` is honored, then
/// `-v`/`--log` override it. With `--log` the output goes to that file,
/// since stderr is underneath the pager's screen.
fn init_logging(cli: &Cli) -> Result<(), StartupError> {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Off).parse_default_env();
    if let Some(level) = cli.level_filter() {
        builder.filter_level(level);
    }
    if let Some(path) = &cli.log_file {
        let file = File::create(path).map_err(|source| StartupError::LogFile {
            path: path.clone(),
            source,
        })?;
        builder
            .target(Target::Pipe(Box::new(file)))
            .write_style(WriteStyle::Never);
    }
    builder.try_init()?;
    Ok(())
}

// ─── File queue ──────────────────────────────────────────────────────────────

/// A page that could not be viewed to completion.
#[derive(Debug)]
struct Failure {
    path: PathBuf,
    error: PagerError,
}

/// View `files` in order. Stops at the first file that fails.
fn view_all(
    event_loop: &mut EventLoop,
    trie: &MacroTrie,
    files: &[PathBuf],
    config: PagerConfig,
) -> Result<usize, Failure> {
    for (done, path) in files.iter().enumerate() {
        if let Err(error) = pager::view_file(event_loop, trie, path, config) {
            log::error!("{}: {error}", path.display());
            return Err(Failure {
                path: path.clone(),
                error,
            });
        }
        log::debug!("{} of {} done", done + 1, files.len());
    }
    Ok(files.len())
}

/// Print what went wrong, after the terminal has been restored. Returns
/// whether the run was clean: every page quit and the terminal restored.
fn report(viewed: &Result<usize, Failure>, stopped: &io::Result<()>) -> bool {
    let mut clean = true;
    if let Err(failure) = viewed {
        eprintln!("{}", diagnostic(&failure.path, &failure.error));
        clean = false;
    }
    if let Err(e) = stopped {
        eprintln!("n-man: failed to restore terminal: {e}");
        clean = false;
    }
    clean
}

fn diagnostic(path: &Path, error: &PagerError) -> String {
    format!("n-man: {}: {error}", path.display())
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = match Cli::try_parse_args(env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match start(&cli) {
        Ok((trie, mut event_loop)) => {
            let viewed = view_all(&mut event_loop, &trie, &cli.files, PagerConfig::default());
            let stopped = event_loop.stop();
            if report(&viewed, &stopped) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("n-man: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Everything that must succeed before the first page: logger, macro
/// trie, then the terminal.
fn start(cli: &Cli) -> Result<(MacroTrie, EventLoop), StartupError> {
    init_logging(cli)?;
    let trie = MacroTrie::standard()?;
    let mut event_loop = EventLoop::new()?;
    if let Err(e) = event_loop.start() {
        let _ = event_loop.stop();
        return Err(e.into());
    }
    log::info!(
        "terminal {}x{}, {} file(s)",
        event_loop.size().cols,
        event_loop.size().rows,
        cli.files.len()
    );
    Ok((trie, event_loop))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
