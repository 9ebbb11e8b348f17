// SPDX-License-Identifier: MIT
//
// ANSI escape sequence encoding.
//
// Stateless writers for every sequence the backend emits. Deciding *when* to
// emit is the `CellWriter`'s job; this module only knows the bytes.
//
// Positions are 0-indexed here and converted to the terminal's 1-indexed
// coordinates on the way out.

use std::io::{self, Write};

use crate::cell::Attr;
use crate::color::CellColor;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// CUP: move the cursor to column `x`, row `y`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// DECTCEM reset.
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// DECTCEM set.
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// ED 2: erase the whole display.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// SGR 0: drop every attribute and color.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Private mode 1049: switch to the alternate screen.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Leave the alternate screen, bringing back the shell's content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

/// Private mode 2026: hold output until [`end_sync`].
///
/// Terminals that don't know the mode ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// Base SGR codes for one color plane: (normal, bright, extended, default).
struct Plane {
    normal: u16,
    bright: u16,
    extended: u8,
    default: &'static [u8],
}

const FG: Plane = Plane {
    normal: 30,
    bright: 90,
    extended: 38,
    default: b"\x1b[39m",
};

const BG: Plane = Plane {
    normal: 40,
    bright: 100,
    extended: 48,
    default: b"\x1b[49m",
};

fn color(w: &mut impl Write, plane: &Plane, color: CellColor) -> io::Result<()> {
    match color {
        CellColor::Default => w.write_all(plane.default),
        CellColor::Ansi256(idx @ 0..=7) => write!(w, "\x1b[{}m", plane.normal + u16::from(idx)),
        CellColor::Ansi256(idx @ 8..=15) => {
            write!(w, "\x1b[{}m", plane.bright + u16::from(idx - 8))
        }
        CellColor::Ansi256(idx) => write!(w, "\x1b[{};5;{idx}m", plane.extended),
        CellColor::Rgb(r, g, b) => write!(w, "\x1b[{};2;{r};{g};{b}m", plane.extended),
    }
}

/// Set the foreground color.
///
/// Palette indices below 16 use the short 30–37 / 90–97 forms.
pub fn fg(w: &mut impl Write, c: CellColor) -> io::Result<()> {
    color(w, &FG, c)
}

/// Set the background color.
pub fn bg(w: &mut impl Write, c: CellColor) -> io::Result<()> {
    color(w, &BG, c)
}

// ─── Attributes ──────────────────────────────────────────────────────────────

const ATTR_CODES: [(Attr, &str); 5] = [
    (Attr::BOLD, "1"),
    (Attr::DIM, "2"),
    (Attr::ITALIC, "3"),
    (Attr::UNDERLINE, "4"),
    (Attr::INVERSE, "7"),
];

/// Turn on every attribute in `attr` with one SGR sequence.
///
/// Writes nothing for an empty set. Attributes are only ever added here;
/// clearing them takes a [`reset`].
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }
    w.write_all(b"\x1b[")?;
    let mut sep = "";
    for (flag, code) in ATTR_CODES {
        if attr.contains(flag) {
            write!(w, "{sep}{code}")?;
            sep = ";";
        }
    }
    w.write_all(b"m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cursor_is_one_indexed() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 10, 20)), "\x1b[21;11H");
    }

    #[test]
    fn cursor_does_not_overflow() {
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, u16::MAX)), "\x1b[65536;65536H");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
    }

    #[test]
    fn screen_sequences() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[2J");
        assert_eq!(emit(|w| reset(w)), "\x1b[0m");
        assert_eq!(emit(|w| enter_alt_screen(w)), "\x1b[?1049h");
        assert_eq!(emit(|w| exit_alt_screen(w)), "\x1b[?1049l");
        assert_eq!(emit(|w| begin_sync(w)), "\x1b[?2026h");
        assert_eq!(emit(|w| end_sync(w)), "\x1b[?2026l");
    }

    // ── Colors ──────────────────────────────────────────────────

    #[test]
    fn default_colors() {
        assert_eq!(emit(|w| fg(w, CellColor::Default)), "\x1b[39m");
        assert_eq!(emit(|w| bg(w, CellColor::Default)), "\x1b[49m");
    }

    #[test]
    fn standard_palette() {
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(0))), "\x1b[30m");
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(7))), "\x1b[37m");
        assert_eq!(emit(|w| bg(w, CellColor::Ansi256(1))), "\x1b[41m");
    }

    #[test]
    fn bright_palette() {
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(8))), "\x1b[90m");
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(15))), "\x1b[97m");
        assert_eq!(emit(|w| bg(w, CellColor::Ansi256(9))), "\x1b[101m");
    }

    #[test]
    fn extended_palette() {
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(16))), "\x1b[38;5;16m");
        assert_eq!(emit(|w| bg(w, CellColor::Ansi256(255))), "\x1b[48;5;255m");
    }

    #[test]
    fn truecolor() {
        assert_eq!(
            emit(|w| fg(w, CellColor::hex(0xff_ff_ff))),
            "\x1b[38;2;255;255;255m"
        );
        assert_eq!(
            emit(|w| bg(w, CellColor::hex(0x26_62_41))),
            "\x1b[48;2;38;98;65m"
        );
    }

    // ── Attributes ──────────────────────────────────────────────

    #[test]
    fn no_attrs_writes_nothing() {
        assert_eq!(emit(|w| attrs(w, Attr::empty())), "");
    }

    #[test]
    fn single_attr() {
        assert_eq!(emit(|w| attrs(w, Attr::BOLD)), "\x1b[1m");
        assert_eq!(emit(|w| attrs(w, Attr::ITALIC)), "\x1b[3m");
        assert_eq!(emit(|w| attrs(w, Attr::INVERSE)), "\x1b[7m");
    }

    #[test]
    fn combined_attrs_in_code_order() {
        assert_eq!(
            emit(|w| attrs(w, Attr::ITALIC | Attr::BOLD | Attr::UNDERLINE)),
            "\x1b[1;3;4m"
        );
        assert_eq!(emit(|w| attrs(w, Attr::all())), "\x1b[1;2;3;4;7m");
    }
}
