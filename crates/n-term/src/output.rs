// SPDX-License-Identifier: MIT
//
// Frame output: one byte buffer and one stateful cell encoder.
//
// `OutputBuffer` collects a whole frame of escape sequences so the terminal
// receives it in a single write. `CellWriter` remembers where the terminal
// cursor is and which pen (colors + attributes) is active, and only emits
// what differs for the next cell.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Cell, Style};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

const DEFAULT_CAPACITY: usize = 16 * 1024;

/// In-memory sink for one frame's worth of terminal output.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append `ch` as UTF-8.
    #[inline]
    pub fn push_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Drop the contents, keep the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write everything to `w`, flush it, and empty the buffer.
    ///
    /// # Errors
    ///
    /// Whatever `w` reports.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        w.write_all(&self.buf)?;
        w.flush()?;
        self.buf.clear();
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    /// No-op: the bytes only leave through [`OutputBuffer::flush_to`].
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Encodes cells while tracking terminal state.
///
/// - The cursor move is skipped when the cell sits right where the
///   terminal cursor already is after the previous character.
/// - Attributes can only be cleared with SGR 0, which also clears colors,
///   so removing any attribute resets the whole pen.
/// - Colors are emitted only when they change.
/// - A continuation cell directly after its wide character prints nothing.
#[derive(Debug, Default)]
pub struct CellWriter {
    /// Where the terminal cursor sits after the last printed character.
    cursor: Option<(u16, u16)>,
    /// The active pen, `None` when unknown.
    pen: Option<Style>,
}

impl CellWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: None,
            pen: None,
        }
    }

    /// Forget everything known about the terminal.
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// Emit whatever is needed to show `cell` at `(x, y)`.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        if cell.is_continuation() && self.cursor == Some((x.saturating_add(1), y)) {
            // The wide character before it already covered this column.
            return;
        }
        if self.cursor != Some((x, y)) {
            ansi::cursor_to(out, x, y).ok();
        }
        self.apply_pen(out, cell.style());

        let advance = match cell.character() {
            None => {
                out.push_char(' ');
                1
            }
            Some(ch) => {
                out.push_char(ch);
                crate::buffer::char_width(ch).max(1)
            }
        };
        #[allow(clippy::cast_possible_truncation)]
        let next = x.saturating_add(advance as u16);
        self.cursor = Some((next, y));
    }

    fn apply_pen(&mut self, out: &mut OutputBuffer, want: Style) {
        let have = match self.pen {
            Some(have) if have.attrs.difference(want.attrs).is_empty() => have,
            _ => {
                ansi::reset(out).ok();
                Style::PLAIN
            }
        };
        ansi::attrs(out, want.attrs.difference(have.attrs)).ok();
        if have.fg != want.fg {
            ansi::fg(out, want.fg).ok();
        }
        if have.bg != want.bg {
            ansi::bg(out, want.bg).ok();
        }
        self.pen = Some(want);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
