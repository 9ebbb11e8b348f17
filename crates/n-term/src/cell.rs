// SPDX-License-Identifier: MIT
//
// Cells and styles.
//
// Every screen position is a `Cell`: a codepoint plus the style it is drawn
// with. Surfaces, the composed frame, and the diff renderer all trade in
// cells, so they stay small and `Copy`.
//
// Wide characters (CJK, some emoji) take two columns. The first cell holds
// the codepoint and the second is a continuation cell with `ch == 0`; the
// renderer never prints a continuation, it only uses its colors.

use crate::color::CellColor;

// ─── Attributes ──────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes, one bit per SGR rendition we emit.
    ///
    /// ```
    /// use n_term::cell::Attr;
    ///
    /// let title = Attr::BOLD | Attr::ITALIC;
    /// assert!(title.contains(Attr::BOLD));
    /// assert!(!title.contains(Attr::UNDERLINE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD      = 1 << 0;
        /// SGR 2.
        const DIM       = 1 << 1;
        /// SGR 3.
        const ITALIC    = 1 << 2;
        /// SGR 4.
        const UNDERLINE = 1 << 3;
        /// SGR 7.
        const INVERSE   = 1 << 4;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Colors and attributes, without a character.
///
/// A surface keeps a current `Style` that is stamped onto every cell it
/// writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl Style {
    /// Default colors, no attributes.
    pub const PLAIN: Self = Self {
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: CellColor) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: CellColor) -> Self {
        Self { bg, ..self }
    }

    #[cfg(test)]
    pub(crate) const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

const CONTINUATION: u32 = 0;
const SPACE: u32 = b' ' as u32;

/// One terminal position.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Codepoint to print. `0` marks a continuation cell.
    pub ch: u32,
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl Cell {
    /// A space in the terminal's default colors.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// `ch` in the terminal's default colors.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self::styled(ch, Style::PLAIN)
    }

    /// `ch` drawn with `style`.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, style: Style) -> Self {
        Self {
            ch: ch as u32,
            fg: style.fg,
            bg: style.bg,
            attrs: style.attrs,
        }
    }

    /// The second column of a wide character drawn with `style`.
    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self {
            ch: CONTINUATION,
            fg: style.fg,
            bg: style.bg,
            attrs: style.attrs,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The printable character, or `None` for a continuation cell.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }

    /// This cell's colors and attributes.
    #[inline]
    #[must_use]
    pub const fn style(self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            attrs: self.attrs,
        }
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return f.write_str("Cell(continuation)");
        }
        let ch = char::from_u32(self.ch).unwrap_or('?');
        write!(f, "Cell({ch:?}")?;
        if !self.fg.is_default() {
            write!(f, ", fg={:?}", self.fg)?;
        }
        if !self.bg.is_default() {
            write!(f, ", bg={:?}", self.bg)?;
        }
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        f.write_str(")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
