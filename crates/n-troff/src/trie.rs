// SPDX-License-Identifier: MIT
//
// Macro trie: classifies `.XX` command lines in O(token length).
//
// The trie is rooted at an implicit leading period. Each node has one child
// slot per 7-bit ASCII value, so following a byte is a single array index.
// Bytes >= 0x80 have no slot and can never match: the macro table is pure
// ASCII, and a man page line with a high byte in its command position is
// simply not a macro we know.
//
// A 128-slot node is 1 KB. The full man(7) table needs a few dozen nodes,
// so the whole trie fits in well under 64 KB and is built once per process.

use crate::error::TrieError;
use crate::is_space;
use crate::macros::{MACROS, MacroToken};

/// One child slot per 7-bit value.
const ALPHABET: usize = 0x80;

struct Node {
    next: [Option<Box<Node>>; ALPHABET],
    token: Option<&'static MacroToken>,
}

impl Node {
    fn boxed() -> Box<Self> {
        Box::new(Self {
            next: [const { None }; ALPHABET],
            token: None,
        })
    }
}

/// A successful classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    /// The recognized macro.
    pub token: &'static MacroToken,
    /// Byte offset just past the command token (the leading `.` included),
    /// i.e. where the macro's arguments start.
    pub end: usize,
}

/// Prefix tree over the macro table.
pub struct MacroTrie {
    root: Box<Node>,
    nodes: usize,
}

impl MacroTrie {
    /// Build a trie from a static macro table.
    ///
    /// Entries with an empty symbol are skipped.
    ///
    /// # Errors
    ///
    /// [`TrieError::IllegalSymbol`] if a symbol contains a byte >= 0x80,
    /// [`TrieError::DuplicateSymbol`] if two entries share a path. Every
    /// node allocated so far is released before returning.
    pub fn build(table: &'static [MacroToken]) -> Result<Self, TrieError> {
        let mut root = Node::boxed();
        let mut nodes = 1;

        for token in table {
            if token.symbol.is_empty() {
                continue;
            }
            let mut node: &mut Node = &mut root;
            for &b in token.symbol.as_bytes() {
                let Some(slot) = node.next.get_mut(usize::from(b)) else {
                    log::error!("illegal symbol: {}", token.symbol);
                    return Err(TrieError::IllegalSymbol {
                        symbol: token.symbol,
                    });
                };
                node = slot
                    .get_or_insert_with(|| {
                        nodes += 1;
                        Node::boxed()
                    })
                    .as_mut();
            }
            if let Some(existing) = node.token {
                log::error!("duplicate command: {} {}", token.symbol, existing.symbol);
                return Err(TrieError::DuplicateSymbol {
                    symbol: token.symbol,
                    existing: existing.symbol,
                });
            }
            node.token = Some(token);
        }

        log::debug!("macro trie: {} entries, {nodes} nodes", table.len());
        Ok(Self { root, nodes })
    }

    /// Build the trie for the built-in man(7) table.
    ///
    /// # Errors
    ///
    /// Only if [`MACROS`] itself is corrupt.
    pub fn standard() -> Result<Self, TrieError> {
        Self::build(MACROS)
    }

    /// Number of allocated nodes, root included.
    #[inline]
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes
    }

    /// Classify the command at the start of `line`.
    ///
    /// `line` must begin with `.`. The command token runs until whitespace,
    /// a NUL, or the end of `line`. Matching is exact and case-sensitive;
    /// an unknown byte, a byte >= 0x80, or a path that is only a prefix of
    /// some macro all yield `None`.
    #[must_use]
    pub fn classify(&self, line: &[u8]) -> Option<Classified> {
        let (&first, rest) = line.split_first()?;
        if first != b'.' {
            return None;
        }

        let mut node: &Node = &self.root;
        let mut end = 1;
        for &b in rest {
            if b == 0 || is_space(b) {
                break;
            }
            node = node.next.get(usize::from(b))?.as_deref()?;
            end += 1;
        }

        node.token.map(|token| Classified { token, end })
    }
}

impl std::fmt::Debug for MacroTrie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MacroTrie({} nodes)", self.nodes)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::{LineType, MacroFamily};

    fn trie() -> MacroTrie {
        MacroTrie::standard().unwrap()
    }

    fn classify_str(t: &MacroTrie, line: &str) -> Option<LineType> {
        t.classify(line.as_bytes()).map(|c| c.token.line)
    }

    // ── Build ───────────────────────────────────────────────────

    #[test]
    fn standard_table_builds() {
        let t = trie();
        assert!(t.node_count() > MACROS.len());
    }

    #[test]
    fn duplicate_symbol_fails() {
        static DUP: &[MacroToken] = &[
            MacroToken {
                symbol: "SH",
                line: LineType::SH,
                family: MacroFamily::Structure,
            },
            MacroToken {
                symbol: "SH",
                line: LineType::SS,
                family: MacroFamily::Structure,
            },
        ];
        let err = MacroTrie::build(DUP).unwrap_err();
        assert_eq!(
            err,
            TrieError::DuplicateSymbol {
                symbol: "SH",
                existing: "SH",
            }
        );
    }

    #[test]
    fn high_byte_symbol_fails() {
        static BAD: &[MacroToken] = &[MacroToken {
            symbol: "é",
            line: LineType::B,
            family: MacroFamily::Font,
        }];
        assert_eq!(
            MacroTrie::build(BAD).unwrap_err(),
            TrieError::IllegalSymbol { symbol: "é" }
        );
    }

    #[test]
    fn empty_symbol_is_skipped() {
        static WITH_EMPTY: &[MacroToken] = &[
            MacroToken {
                symbol: "",
                line: LineType::Comment,
                family: MacroFamily::Comment,
            },
            MacroToken {
                symbol: "B",
                line: LineType::B,
                family: MacroFamily::Font,
            },
        ];
        let t = MacroTrie::build(WITH_EMPTY).unwrap();
        assert_eq!(t.node_count(), 2);
        assert_eq!(classify_str(&t, ".B"), Some(LineType::B));
        assert_eq!(classify_str(&t, "."), None);
    }

    #[test]
    fn prefix_sharing_allocates_once() {
        static SHARED: &[MacroToken] = &[
            MacroToken {
                symbol: "SH",
                line: LineType::SH,
                family: MacroFamily::Structure,
            },
            MacroToken {
                symbol: "SS",
                line: LineType::SS,
                family: MacroFamily::Structure,
            },
        ];
        // root + S + H + S
        assert_eq!(MacroTrie::build(SHARED).unwrap().node_count(), 4);
    }

    // ── Classify ────────────────────────────────────────────────

    #[test]
    fn every_table_entry_classifies() {
        let t = trie();
        for token in MACROS {
            let line = format!(".{}", token.symbol);
            let c = t.classify(line.as_bytes()).unwrap();
            assert_eq!(c.token, token);
            assert_eq!(c.end, line.len());
        }
    }

    #[test]
    fn appended_letter_is_unknown() {
        let t = trie();
        for token in MACROS {
            let line = format!(".{}X", token.symbol);
            assert_eq!(classify_str(&t, &line), None, "{line}");
        }
    }

    #[test]
    fn prefix_only_is_unknown() {
        // `S` is on the path to SH/SS/SM/SB/SY but is not a macro itself.
        assert_eq!(classify_str(&trie(), ".S"), None);
    }

    #[test]
    fn single_letter_macros() {
        let t = trie();
        assert_eq!(classify_str(&t, ".B bold"), Some(LineType::B));
        assert_eq!(classify_str(&t, ".I"), Some(LineType::I));
        assert_eq!(classify_str(&t, ".P"), Some(LineType::P));
    }

    #[test]
    fn stops_at_whitespace() {
        let t = trie();
        let c = t.classify(b".TH ls 1").unwrap();
        assert_eq!(c.token.line, LineType::TH);
        assert_eq!(c.end, 3);

        let c = t.classify(b".SH\tNAME").unwrap();
        assert_eq!(c.token.line, LineType::SH);
        assert_eq!(c.end, 3);

        let c = t.classify(b".PP\nnext line").unwrap();
        assert_eq!(c.token.line, LineType::PP);
    }

    #[test]
    fn comment_macro() {
        let c = trie().classify(b".\\\" a comment").unwrap();
        assert_eq!(c.token.family, MacroFamily::Comment);
        assert_eq!(c.end, 3);
    }

    #[test]
    fn case_sensitive() {
        assert_eq!(classify_str(&trie(), ".th foo 1"), None);
    }

    #[test]
    fn requires_leading_period() {
        let t = trie();
        assert_eq!(classify_str(&t, "TH foo 1"), None);
        assert_eq!(classify_str(&t, "'TH foo 1"), None);
        assert_eq!(t.classify(b""), None);
    }

    #[test]
    fn high_byte_is_unknown() {
        assert_eq!(trie().classify(b".\xC3\xA9"), None);
        assert_eq!(trie().classify(b".S\xFF"), None);
    }

    #[test]
    fn bare_period_is_unknown() {
        assert_eq!(classify_str(&trie(), "."), None);
        assert_eq!(classify_str(&trie(), ". TH"), None);
    }

    #[test]
    fn debug_shows_node_count() {
        let t = trie();
        assert_eq!(format!("{t:?}"), format!("MacroTrie({} nodes)", t.node_count()));
    }
}
