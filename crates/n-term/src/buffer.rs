// SPDX-License-Identifier: MIT
//
// FrameBuffer: a flat grid of cells.
//
// Used twice over: every surface paints into its own `FrameBuffer`, and the
// screen composes all surfaces into one more `FrameBuffer` that the diff
// renderer compares against the previous frame.
//
// Cells are stored row-major in a single `Vec`, so a row is a contiguous
// slice and the renderer's row comparison is one slice equality.
//
// Wide characters take two cells (owner + continuation). Every write breaks
// any wide character it lands on so no half of one is ever left behind.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Style};

// ─── ClipRect ────────────────────────────────────────────────────────────────

/// A rectangle in screen space.
///
/// Signed origin so a region that hangs off the top or left edge can still
/// be described and intersected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl ClipRect {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge, exclusive.
    #[inline]
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge, exclusive.
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y + self.height as i32
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    #[must_use]
    pub fn contains(self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Overlap of two rectangles, or `None` if they are disjoint.
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        // Both spans are positive and no wider than one of the inputs.
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        Some(Self {
            x: x1,
            y: y1,
            width: (x2 - x1) as u16,
            height: (y2 - y1) as u16,
        })
    }
}

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// A `width × height` grid of [`Cell`]s.
///
/// ```
/// use n_term::buffer::FrameBuffer;
/// use n_term::cell::Cell;
///
/// let mut buf = FrameBuffer::new(80, 24);
/// buf.set(5, 3, Cell::new('X'));
/// assert_eq!(buf.get(5, 3).and_then(|c| c.character()), Some('X'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// A buffer of empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::filled(width, height, Cell::EMPTY)
    }

    /// A buffer with every position set to `fill`.
    #[must_use]
    pub fn filled(width: u16, height: u16, fill: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole buffer as a rectangle at the origin.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> ClipRect {
        ClipRect::new(0, 0, self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    /// Row `y` as a slice.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// Every cell, row-major.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The characters of row `y`, continuation cells skipped.
    #[cfg(test)]
    pub(crate) fn row_text(&self, y: u16) -> String {
        self.row(y)
            .unwrap_or_default()
            .iter()
            .filter_map(|c| c.character())
            .collect()
    }

    // ─── Whole-buffer operations ─────────────────────────────────────────

    /// Set every cell to `cell`.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Change dimensions, discarding all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Change dimensions, keeping the overlapping top-left region.
    ///
    /// New positions are set to `fill`. A wide character cut in half by
    /// the new right edge becomes `fill` too.
    pub fn resize_keep(&mut self, width: u16, height: u16, fill: Cell) {
        if width == self.width && height == self.height {
            return;
        }
        let mut next = Self::filled(width, height, fill);
        let keep_w = width.min(self.width);
        for y in 0..height.min(self.height) {
            let src = self.index(0, y);
            let dst = next.index(0, y);
            let n = usize::from(keep_w);
            next.cells[dst..dst + n].copy_from_slice(&self.cells[src..src + n]);
            if keep_w > 0 && keep_w < self.width && self.cells[src + n].is_continuation() {
                next.cells[dst + n - 1] = fill;
            }
        }
        *self = next;
    }

    /// Overwrite this buffer with `other`, reusing the allocation when the
    /// dimensions already match.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            self.clone_from(other);
        }
    }

    // ─── Cell writes ─────────────────────────────────────────────────────

    /// Write one cell, breaking any wide character it overlaps.
    ///
    /// Writing a continuation cell leaves the cell to its left alone: that
    /// is the owner the caller just wrote.
    ///
    /// Returns `false` (and writes nothing) when out of bounds.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.break_wide_at(x, y, !cell.is_continuation());
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Clear the orphaned halves of any wide character touching `(x, y)`.
    fn break_wide_at(&mut self, x: u16, y: u16, owner: bool) {
        let idx = self.index(x, y);
        if owner && x > 0 && self.cells[idx].is_continuation() {
            self.cells[idx - 1].ch = u32::from(b' ');
        }
        if x + 1 < self.width && self.cells[idx + 1].is_continuation() {
            let style = self.cells[idx + 1].style();
            self.cells[idx + 1] = Cell::styled(' ', style);
        }
    }

    /// Paint `text` left to right from `(x, y)` in `style`.
    ///
    /// Zero-width and control characters are skipped. A wide character
    /// that would straddle the right edge is replaced by a space. Painting
    /// stops at the right edge; nothing wraps.
    ///
    /// Returns the number of columns consumed.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            match ch.width() {
                None | Some(0) => {}
                Some(1) => {
                    self.set(col, y, Cell::styled(ch, style));
                    col += 1;
                }
                Some(_) => {
                    if col + 1 >= self.width {
                        self.set(col, y, Cell::styled(' ', style));
                        col += 1;
                        break;
                    }
                    self.set(col, y, Cell::styled(ch, style));
                    self.set(col + 1, y, Cell::continuation(style));
                    col += 2;
                }
            }
        }
        col - x
    }

    /// Copy `src` into this buffer with its top-left at `(x, y)`, clipped
    /// to this buffer's bounds.
    ///
    /// A wide character split by the clip edge is drawn as a space in its
    /// own style.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn blit(&mut self, src: &Self, x: i32, y: i32) {
        let placed = ClipRect::new(x, y, src.width, src.height);
        let Some(visible) = placed.intersect(self.bounds()) else {
            return;
        };
        // `visible` lies inside both buffers, so every coordinate below is
        // non-negative and fits in u16.
        for dy in visible.y..visible.bottom() {
            let sy = (dy - y) as u16;
            for dx in visible.x..visible.right() {
                let sx = (dx - x) as u16;
                let mut cell = src.cells[src.index(sx, sy)];
                let first = dx == visible.x;
                let last = dx + 1 == visible.right();
                let split = (cell.is_continuation() && first)
                    || (!cell.is_continuation()
                        && last
                        && sx + 1 < src.width
                        && src.cells[src.index(sx + 1, sy)].is_continuation());
                if split {
                    cell = Cell::styled(' ', cell.style());
                }
                self.set(dx as u16, dy as u16, cell);
            }
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text width ──────────────────────────────────────────────────────────────

/// Terminal columns taken by `ch`: 0 for control and combining characters,
/// 2 for wide ones, 1 otherwise.
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Terminal columns taken by `s`.
///
/// ```
/// use n_term::buffer::string_width;
///
/// assert_eq!(string_width("ls(1)"), 5);
/// assert_eq!(string_width("中文"), 4);
/// ```
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
