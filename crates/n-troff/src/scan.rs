// SPDX-License-Identifier: MIT
//
// Document scanner: one pass over the raw page, line by line.
//
// Lines starting with `.` are classified through the macro trie. The `.TH`
// line is staged into the document root and lexed into title and section;
// everything else is skipped until body layout exists. A line ends at `\n`,
// at a NUL, or at the end of the buffer.

use crate::document::{Document, NodeLevel, PageNode};
use crate::error::ParseError;
use crate::is_space;
use crate::macros::LineType;
use crate::title::lex_title;
use crate::trie::MacroTrie;

/// Scan `bytes` and extract the document metadata.
///
/// # Errors
///
/// - [`ParseError::DuplicateTitle`] on a second `.TH` line.
/// - [`ParseError::EmptyTitle`] if a `.TH` line has no arguments.
/// - [`ParseError::Title`] if the arguments don't lex.
/// - [`ParseError::NoTitle`] if no `.TH` line exists.
pub fn scan(trie: &MacroTrie, bytes: &[u8]) -> Result<Document, ParseError> {
    let mut doc = Document::new();

    for (lineno, line) in bytes.split(|&b| b == b'\n' || b == 0).enumerate() {
        let Some(classified) = trie.classify(line) else {
            continue;
        };
        let token = classified.token;
        log::trace!("line {}: .{} ({})", lineno + 1, token.symbol, token.family);

        if token.line != LineType::TH {
            continue;
        }
        if let Some(previous) = doc.title() {
            return Err(ParseError::DuplicateTitle {
                previous: previous.to_string(),
            });
        }

        let args = &line[classified.end..];
        if args.iter().all(|&b| is_space(b)) {
            return Err(ParseError::EmptyTitle);
        }

        let staged = String::from_utf8_lossy(args).into_owned();
        let fields = lex_title(&staged)?;
        doc.root = Some(PageNode::new(NodeLevel::Section, staged));
        doc.set_title(fields.title);
        doc.set_section(fields.section);
        log::debug!("line {}: title {}", lineno + 1, doc.heading());
    }

    if doc.title().is_none() {
        return Err(ParseError::NoTitle);
    }
    Ok(doc)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
