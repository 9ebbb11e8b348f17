// SPDX-License-Identifier: MIT
//
// The man(7) macro table.
//
// Every command line in a man page starts with `.` followed by a one- or
// two-character macro name. We only need to know *which* macro a line
// names and what family it belongs to; actually executing the macros is
// not our business. The table is fixed at compile time and validated once
// when the trie is built (see `trie.rs`).

use std::fmt;

// ─── Line Types ──────────────────────────────────────────────────────────────

/// Identity of a recognized macro line.
///
/// Variants are spelled exactly like the macros they name.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineType {
    /// `.\"`: comment.
    Comment,
    // ── Font changes ────────────────────────────────────────────
    B,
    BI,
    BR,
    I,
    IB,
    IR,
    RB,
    RI,
    SB,
    SM,
    // ── Document structure ──────────────────────────────────────
    EE,
    EX,
    RE,
    RS,
    SH,
    SS,
    /// Title declaration: title, section, and optional footer/header text.
    TH,
    // ── Paragraphs ──────────────────────────────────────────────
    IP,
    LP,
    P,
    PP,
    TP,
    TQ,
    // ── Hyperlinks ──────────────────────────────────────────────
    ME,
    MT,
    UE,
    UR,
    // ── Synopsis ────────────────────────────────────────────────
    OP,
    SY,
    YS,
}

/// Semantic family a macro belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroFamily {
    Comment,
    Font,
    Structure,
    Paragraph,
    Hyperlink,
    Synopsis,
}

impl fmt::Display for MacroFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Comment => "comment",
            Self::Font => "font",
            Self::Structure => "structure",
            Self::Paragraph => "paragraph",
            Self::Hyperlink => "hyperlink",
            Self::Synopsis => "synopsis",
        };
        f.write_str(name)
    }
}

// ─── Macro Tokens ────────────────────────────────────────────────────────────

/// One entry of the static macro table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroToken {
    /// The bytes following the leading `.` (without it).
    pub symbol: &'static str,
    /// Unique line identity.
    pub line: LineType,
    /// Semantic family.
    pub family: MacroFamily,
}

impl MacroToken {
    const fn new(symbol: &'static str, line: LineType, family: MacroFamily) -> Self {
        Self {
            symbol,
            line,
            family,
        }
    }
}

macro_rules! macro_table {
    ($($family:ident: [$($name:ident)*])*) => {
        &[
            MacroToken::new("\\\"", LineType::Comment, MacroFamily::Comment),
            $($(MacroToken::new(stringify!($name), LineType::$name, MacroFamily::$family),)*)*
        ]
    };
}

/// Every macro the classifier recognizes.
pub static MACROS: &[MacroToken] = macro_table! {
    Font: [B BI BR I IB IR RB RI SB SM]
    Structure: [EE EX RE RS SH SS TH]
    Paragraph: [IP LP P PP TP TQ]
    Hyperlink: [ME MT UE UR]
    Synopsis: [OP SY YS]
};

/// Look up a macro by its exact symbol (without the leading `.`).
#[cfg(test)]
pub(crate) fn find(symbol: &str) -> Option<&'static MacroToken> {
    MACROS.iter().find(|t| t.symbol == symbol)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_starts_with_comment() {
        assert_eq!(MACROS[0].line, LineType::Comment);
        assert_eq!(MACROS[0].symbol, "\\\"");
    }

    #[test]
    fn table_has_every_family() {
        let families: HashSet<_> = MACROS.iter().map(|t| t.family).collect();
        assert_eq!(families.len(), 6);
    }

    #[test]
    fn symbols_are_unique() {
        let symbols: HashSet<_> = MACROS.iter().map(|t| t.symbol).collect();
        assert_eq!(symbols.len(), MACROS.len());
    }

    #[test]
    fn line_types_are_unique() {
        let lines: HashSet<_> = MACROS.iter().map(|t| t.line).collect();
        assert_eq!(lines.len(), MACROS.len());
    }

    #[test]
    fn symbols_are_short_ascii() {
        for t in MACROS {
            assert!(!t.symbol.is_empty() && t.symbol.len() <= 2, "{}", t.symbol);
            assert!(t.symbol.is_ascii(), "{}", t.symbol);
        }
    }

    #[test]
    fn find_title_macro() {
        let th = find("TH").unwrap();
        assert_eq!(th.line, LineType::TH);
        assert_eq!(th.family, MacroFamily::Structure);
    }

    #[test]
    fn find_is_case_sensitive() {
        assert!(find("th").is_none());
    }

    #[test]
    fn small_font_macros_are_fonts() {
        for sym in ["RB", "RI", "SB", "SM"] {
            assert_eq!(find(sym).unwrap().family, MacroFamily::Font);
        }
    }

    #[test]
    fn family_display() {
        assert_eq!(MacroFamily::Hyperlink.to_string(), "hyperlink");
    }
}
