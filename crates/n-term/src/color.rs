// SPDX-License-Identifier: MIT
//
// Cell colors.
//
// A pager has no use for blending or palette math: every color it shows is
// either a fixed 24-bit value, a palette index, or "whatever the terminal
// uses by default". That is exactly what the renderer needs to diff and
// encode, so it is the only color type we carry.

use std::fmt;

/// Compact color stored in every [`Cell`](crate::cell::Cell).
///
/// Four bytes, `Copy`, and cheap to compare in the diff loop.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),

    /// ANSI 256-color palette index.
    Ansi256(u8),

    /// The terminal's own default color.
    #[default]
    Default,
}

impl CellColor {
    /// Build an RGB color from a packed `0xRRGGBB` value.
    ///
    /// ```
    /// use n_term::color::CellColor;
    ///
    /// assert_eq!(CellColor::hex(0x26_62_41), CellColor::Rgb(0x26, 0x62, 0x41));
    /// ```
    #[allow(clippy::cast_possible_truncation)]
    #[inline]
    #[must_use]
    pub const fn hex(rgb: u32) -> Self {
        Self::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// `self`, or `fallback` when `self` is the terminal default.
    #[inline]
    #[must_use]
    pub const fn or(self, fallback: Self) -> Self {
        match self {
            Self::Default => fallback,
            other => other,
        }
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Ansi256(idx) => write!(f, "ansi({idx})"),
            Self::Default => f.write_str("default"),
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
