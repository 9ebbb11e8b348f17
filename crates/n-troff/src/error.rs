// SPDX-License-Identifier: MIT
//
// Error types for man page loading and parsing.
//
// One enum per stage, so callers can tell an unreadable file from a
// malformed title line without string matching. Parse diagnostics carry
// the raw offending text; a user looking at the message should be able
// to grep the source for it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while building the macro trie from a static table.
///
/// Only a corrupt table can produce this. It is fatal to the process,
/// not to a single file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    /// A symbol contains a byte outside 7-bit ASCII.
    #[error("illegal symbol: {symbol}")]
    IllegalSymbol { symbol: &'static str },

    /// Two table entries resolve to the same trie path.
    #[error("duplicate command: {symbol} {existing}")]
    DuplicateSymbol {
        symbol: &'static str,
        existing: &'static str,
    },
}

/// Failure while splitting a `.TH` line into fields.
///
/// Every variant carries the full staged line for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("couldn't extract title [{line}]")]
    MissingTitle { line: String },

    #[error("unterminated title [{line}]")]
    UnterminatedTitle { line: String },

    #[error("couldn't extract section [{line}]")]
    MissingSection { line: String },

    #[error("unterminated section [{line}]")]
    UnterminatedSection { line: String },
}

impl LexError {
    /// The raw title line that failed to lex.
    #[must_use]
    pub fn line(&self) -> &str {
        match self {
            Self::MissingTitle { line }
            | Self::UnterminatedTitle { line }
            | Self::MissingSection { line }
            | Self::UnterminatedSection { line } => line,
        }
    }
}

/// Structural failure while scanning a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A second `.TH` line appeared after a title was recorded.
    #[error("found a second title (was {previous})")]
    DuplicateTitle { previous: String },

    /// A `.TH` line with nothing after the macro.
    #[error("bogus empty title")]
    EmptyTitle,

    /// The `.TH` arguments could not be split into fields.
    #[error(transparent)]
    Title(#[from] LexError),

    /// The whole buffer was scanned without finding a `.TH` line.
    #[error("no title found")]
    NoTitle,
}

/// Failure while acquiring the raw bytes of a document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Smaller than the minimal gzip envelope (10-byte header + 8-byte trailer).
    #[error("file too short ({len} bytes)")]
    TooShort { len: usize },

    /// The gzip stream is corrupt.
    #[error("couldn't inflate: {0}")]
    Inflate(#[source] io::Error),

    /// The gzip trailer disagrees with what actually inflated.
    #[error("inflated {actual} bytes, trailer declared {declared}")]
    LengthMismatch { declared: u32, actual: usize },
}

// ─── Tests ───────────────────────────────────────────────────────────────────
