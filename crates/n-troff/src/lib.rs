// SPDX-License-Identifier: MIT
//
// n-troff: man page source handling for n-man.
//
// Loads a page from disk (plain or gzip), classifies its command lines
// against the man(7) macro table, and extracts the title line. Nothing in
// here touches the terminal.
//
// The pipeline:
//
//   RawDocument::open  →  scan(&MacroTrie, bytes)  →  Document
//
// The `MacroTrie` is immutable once built and is meant to be built once per
// process and shared by reference between documents.

pub mod document;
pub mod error;
pub mod macros;
pub mod scan;
pub mod source;
pub mod title;
pub mod trie;

pub use document::{Document, NodeLevel, PageNode};
pub use error::{LexError, LoadError, ParseError, TrieError};
pub use macros::{LineType, MacroFamily, MacroToken};
pub use scan::scan;
pub use source::RawDocument;
pub use trie::MacroTrie;

/// C-locale `isspace`: space, `\t`, `\n`, `\v`, `\f`, `\r`.
#[inline]
pub(crate) const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_space_matches_c_locale() {
        for b in [b' ', b'\t', b'\n', 0x0B, 0x0C, b'\r'] {
            assert!(is_space(b), "{b:#04x}");
        }
        for b in [0u8, b'a', b'"', b'.', 0x7F, 0xA0, 0xFF] {
            assert!(!is_space(b), "{b:#04x}");
        }
    }

    #[test]
    fn load_then_scan() {
        let raw = RawDocument::from_bytes(b".TH grep 1 2024 \"GNU grep\"\n".to_vec()).unwrap();
        let trie = MacroTrie::standard().unwrap();
        let doc = scan(&trie, raw.bytes()).unwrap();
        assert_eq!(doc.heading().to_string(), "grep(1)");
    }
}
