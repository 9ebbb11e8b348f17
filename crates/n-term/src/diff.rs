// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// The composed frame is compared against the one shown last time and only
// the cells that changed are encoded. A pager frame rarely changes at all
// between renders (a resize or a refresh is the usual trigger), so most
// renders come down to the sync markers and a reset.
//
//   1. The screen composes its surfaces into a FrameBuffer.
//   2. `DiffRenderer::render` diffs it against the stored previous frame.
//   3. `CellWriter` encodes the changed cells into an `OutputBuffer`.
//   4. `DiffRenderer::flush` hands the whole frame to the terminal at once.
//
// Unchanged rows are skipped with one slice comparison. The frame is wrapped
// in synchronized-output markers so a terminal that supports them never
// shows a half-drawn frame.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What one render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame and were encoded.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame.
    pub cells_skipped: usize,
    /// Bytes of output produced.
    pub bytes_written: usize,
    /// Whether the pass cleared the screen and drew everything.
    pub full_redraw: bool,
}

impl RenderStats {
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Emits escape sequences only for cells that changed since the last frame.
///
/// ```no_run
/// use n_term::buffer::FrameBuffer;
/// use n_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(80, 24);
/// let stats = renderer.render(&frame);
/// renderer.flush()?;
/// assert!(stats.full_redraw);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// A renderer with no previous frame; the first render draws everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame and encode the changes.
    ///
    /// The bytes stay buffered until [`flush`](Self::flush) or
    /// [`flush_to`](Self::flush_to).
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let mut stats = RenderStats::default();
        if current.width() == 0 || current.height() == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        let previous = self
            .previous
            .take()
            .filter(|prev| prev.width() == current.width() && prev.height() == current.height());
        stats.full_redraw = previous.is_none();
        if stats.full_redraw {
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..current.height() {
            let Some(row) = current.row(y) else { break };
            let old = previous.as_ref().and_then(|prev| prev.row(y));
            if old == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }
            self.render_row(y, row, old, &mut stats);
        }

        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();
        stats.bytes_written = self.output.len();

        self.previous = previous;
        self.store_frame(current);
        stats
    }

    fn render_row(
        &mut self,
        y: u16,
        row: &[crate::cell::Cell],
        old: Option<&[crate::cell::Cell]>,
        stats: &mut RenderStats,
    ) {
        let mut last_drawn: Option<usize> = None;
        for (x, cell) in row.iter().enumerate() {
            let changed = old.and_then(|old| old.get(x)) != Some(cell);
            if !changed {
                stats.cells_skipped += 1;
                continue;
            }
            // A changed continuation needs its wide character in front of it,
            // otherwise the writer would blank the right half.
            if cell.is_continuation() && x > 0 && last_drawn != Some(x - 1) {
                self.draw(x - 1, y, &row[x - 1]);
                stats.cells_rendered += 1;
                stats.cells_skipped = stats.cells_skipped.saturating_sub(1);
            }
            self.draw(x, y, cell);
            last_drawn = Some(x);
            stats.cells_rendered += 1;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw(&mut self, x: usize, y: u16, cell: &crate::cell::Cell) {
        self.writer.render_cell(&mut self.output, x as u16, y, cell);
    }

    /// The encoded bytes of the last render.
    #[cfg(test)]
    pub(crate) fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write the last render to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_to(&mut io::stdout().lock())
    }

    /// Write the last render to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Forget the previous frame so the next render clears and redraws.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev)
                if prev.width() == current.width() && prev.height() == current.height() =>
            {
                prev.copy_from(current);
            }
            _ => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Attr, Cell, Style};
    use crate::color::CellColor;
    use pretty_assertions::assert_eq;

    fn render_frame(renderer: &mut DiffRenderer, frame: &FrameBuffer) -> (RenderStats, String) {
        let stats = renderer.render(frame);
        let output = String::from_utf8(renderer.output_bytes().to_vec()).unwrap();
        (stats, output)
    }

    // ── First render ────────────────────────────────────────────

    #[test]
    fn first_render_draws_everything() {
        let mut renderer = DiffRenderer::new();
        let frame = FrameBuffer::new(10, 5);
        let (stats, output) = render_frame(&mut renderer, &frame);
        assert!(stats.full_redraw);
        assert_eq!(stats.cells_rendered, 50);
        assert_eq!(stats.cells_skipped, 0);
        assert!(output.contains("\x1b[2J"));
    }

    #[test]
    fn frame_is_wrapped_in_sync_and_reset() {
        let mut renderer = DiffRenderer::new();
        let (_, output) = render_frame(&mut renderer, &FrameBuffer::new(4, 2));
        assert!(output.starts_with("\x1b[?2026h"));
        assert!(output.ends_with("\x1b[0m\x1b[?2026l"));
    }

    // ── Steady state ────────────────────────────────────────────

    #[test]
    fn identical_frame_emits_no_cells() {
        let mut renderer = DiffRenderer::new();
        let frame = FrameBuffer::new(10, 5);
        renderer.render(&frame);

        let (stats, output) = render_frame(&mut renderer, &frame);
        assert!(!stats.full_redraw);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 50);
        assert_eq!(output, "\x1b[?2026h\x1b[0m\x1b[?2026l");
    }

    #[test]
    fn single_change_is_positioned() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(10, 5);
        renderer.render(&frame);

        frame.set(7, 4, Cell::new('Z'));
        let (stats, output) = render_frame(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.cells_skipped, 49);
        assert!(output.contains("\x1b[5;8H\x1b[0mZ"));
    }

    #[test]
    fn changed_row_renders_only_changed_cells() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(20, 3);
        renderer.render(&frame);

        frame.paint_text(0, 1, "man", Style::PLAIN);
        let (stats, output) = render_frame(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 3);
        assert_eq!(stats.cells_skipped, 57);
        assert!(output.contains("man"));
    }

    #[test]
    fn revert_is_a_change_too() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(10, 5);
        renderer.render(&frame);

        frame.set(0, 0, Cell::new('!'));
        assert_eq!(renderer.render(&frame).cells_rendered, 1);
        frame.set(0, 0, Cell::EMPTY);
        assert_eq!(renderer.render(&frame).cells_rendered, 1);
        assert_eq!(renderer.render(&frame).cells_rendered, 0);
    }

    #[test]
    fn styled_cell_emits_pen() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(10, 1);
        renderer.render(&frame);

        let style = Style::PLAIN
            .with_fg(CellColor::hex(0xff_ff_ff))
            .with_bg(CellColor::hex(0x26_62_41))
            .with_attrs(Attr::BOLD);
        frame.set(0, 0, Cell::styled('g', style));
        let (_, output) = render_frame(&mut renderer, &frame);
        assert!(output.contains("\x1b[1m\x1b[38;2;255;255;255m\x1b[48;2;38;98;65mg"));
    }

    // ── Wide characters ─────────────────────────────────────────

    #[test]
    fn continuation_change_redraws_owner() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(4, 1);
        frame.set(0, 0, Cell::new('中'));
        frame.set(1, 0, Cell::continuation(Style::PLAIN));
        renderer.render(&frame);

        let green = Style::PLAIN.with_bg(CellColor::hex(0x26_62_41));
        frame.set(1, 0, Cell::continuation(green));
        let (stats, output) = render_frame(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 2);
        assert_eq!(stats.total_cells(), 4);
        assert!(output.contains('中'));
    }

    // ── Resize and refresh ──────────────────────────────────────

    #[test]
    fn size_change_redraws_everything() {
        let mut renderer = DiffRenderer::new();
        renderer.render(&FrameBuffer::new(10, 5));

        let (stats, output) = render_frame(&mut renderer, &FrameBuffer::new(20, 10));
        assert!(stats.full_redraw);
        assert_eq!(stats.cells_rendered, 200);
        assert!(output.contains("\x1b[2J"));
    }

    #[test]
    fn force_redraw_redraws_everything() {
        let mut renderer = DiffRenderer::new();
        let frame = FrameBuffer::new(10, 5);
        renderer.render(&frame);
        assert_eq!(renderer.render(&frame).cells_rendered, 0);

        renderer.force_redraw();
        let (stats, output) = render_frame(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 50);
        assert!(output.contains("\x1b[2J"));
    }

    #[test]
    fn zero_size_frame_is_silent() {
        let mut renderer = DiffRenderer::new();
        let stats = renderer.render(&FrameBuffer::new(0, 0));
        assert_eq!(stats, RenderStats::default());
        assert!(renderer.output_bytes().is_empty());
    }

    #[test]
    fn flush_to_drains_output() {
        let mut renderer = DiffRenderer::new();
        renderer.render(&FrameBuffer::new(2, 1));
        let mut sink = Vec::new();
        renderer.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(renderer.output_bytes().is_empty());
    }
}
