// SPDX-License-Identifier: MIT
//
// Surfaces: independently placed drawing regions composed into one frame.
//
// A `Surface` owns its own cell grid, a position on the screen, a cursor, a
// current style and a base cell. Text written to a surface is clipped to
// it; surfaces never wrap. The `Screen` holds the root geometry and every
// surface in creation order, which is also the paint order: later surfaces
// cover earlier ones where they overlap.
//
// Resizes are not callbacks. `Screen::set_size` records the new root
// geometry and hands back one `Event::Resize` per surface that asked to be
// notified; the application lays those surfaces out again when it handles
// the events.

use crate::buffer::{FrameBuffer, string_width};
use crate::cell::{Attr, Cell, Style};
use crate::color::CellColor;
use crate::input::{Event, ResizeEvent};
use crate::terminal::Size;

// ─── Identity and options ────────────────────────────────────────────────────

/// Handle to a surface on a [`Screen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(u32);

/// Horizontal placement for [`Surface::put_str_aligned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Geometry and behavior of a new surface. Coordinates are screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceOptions {
    pub y: u16,
    pub x: u16,
    pub rows: u16,
    pub cols: u16,
    /// Deliver an [`Event::Resize`] for this surface when the screen
    /// changes size.
    pub notify_resize: bool,
}

// ─── Surface ─────────────────────────────────────────────────────────────────

pub struct Surface {
    plane: FrameBuffer,
    /// (y, x) of the top-left cell on the screen.
    origin: (u16, u16),
    /// (y, x) of the next write. x equals the width once a row is full.
    cursor: (u16, u16),
    style: Style,
    base: Cell,
    notify_resize: bool,
}

impl Surface {
    fn new(opts: &SurfaceOptions) -> Self {
        Self {
            plane: FrameBuffer::new(opts.cols, opts.rows),
            origin: (opts.y, opts.x),
            cursor: (0, 0),
            style: Style::PLAIN,
            base: Cell::EMPTY,
            notify_resize: opts.notify_resize,
        }
    }

    // ── Geometry ────────────────────────────────────────────────

    #[must_use]
    pub const fn dim(&self) -> Size {
        Size::new(self.plane.height(), self.plane.width())
    }

    /// (y, x) on the screen.
    #[must_use]
    pub const fn origin(&self) -> (u16, u16) {
        self.origin
    }

    /// (y, x) of the next write. x equals the width once the row is full,
    /// and writes there are dropped.
    #[must_use]
    pub const fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    #[must_use]
    pub const fn notifies_resize(&self) -> bool {
        self.notify_resize
    }

    /// The surface's cells.
    #[must_use]
    pub const fn plane(&self) -> &FrameBuffer {
        &self.plane
    }

    /// Change the extent, keeping what still fits. New cells take the base
    /// cell; the cursor is pulled back with it.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.plane.resize_keep(cols, rows, self.base);
        self.cursor = (
            self.cursor.0.min(rows.saturating_sub(1)),
            self.cursor.1.min(cols),
        );
    }

    /// Place the top-left corner at (y, x) on the screen.
    pub fn move_to(&mut self, y: u16, x: u16) {
        self.origin = (y, x);
    }

    /// Move the cursor. Returns `false`, leaving it alone, if (y, x) is
    /// outside the surface.
    pub fn cursor_move(&mut self, y: u16, x: u16) -> bool {
        if !self.plane.in_bounds(x, y) {
            return false;
        }
        self.cursor = (y, x);
        true
    }

    // ── Style ───────────────────────────────────────────────────

    /// Replace the current attributes.
    pub fn set_styles(&mut self, attrs: Attr) {
        self.style.attrs = attrs;
    }

    pub fn set_fg(&mut self, fg: CellColor) {
        self.style.fg = fg;
    }

    pub fn set_bg(&mut self, bg: CellColor) {
        self.style.bg = bg;
    }

    #[must_use]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// The cell [`erase`](Self::erase) and [`resize`](Self::resize) fill
    /// with. Its colors also stand in for default colors in the current
    /// style.
    pub fn set_base(&mut self, base: Cell) {
        self.base = base;
    }

    #[must_use]
    pub const fn base(&self) -> Cell {
        self.base
    }

    /// The style text is actually written in.
    const fn pen(&self) -> Style {
        Style {
            fg: self.style.fg.or(self.base.fg),
            bg: self.style.bg.or(self.base.bg),
            attrs: self.style.attrs,
        }
    }

    // ── Output ──────────────────────────────────────────────────

    /// Fill with the base cell and home the cursor.
    pub fn erase(&mut self) {
        self.plane.fill(self.base);
        self.cursor = (0, 0);
    }

    /// Write one character at the cursor. Returns the columns used.
    pub fn put_char(&mut self, ch: char) -> u16 {
        let mut enc = [0u8; 4];
        self.put_str(ch.encode_utf8(&mut enc))
    }

    /// Write `text` at the cursor and advance it. Output stops at the
    /// right edge, where the cursor then rests. Returns the columns used.
    pub fn put_str(&mut self, text: &str) -> u16 {
        let (y, x) = self.cursor;
        let used = self.plane.paint_text(x, y, text, self.pen());
        self.cursor.1 = x + used;
        used
    }

    /// [`put_str`](Self::put_str) at (y, x); writes nothing if (y, x) is
    /// outside the surface.
    pub fn put_str_at(&mut self, y: u16, x: u16, text: &str) -> u16 {
        if !self.cursor_move(y, x) {
            return 0;
        }
        self.put_str(text)
    }

    /// Write `text` on row `y`, placed by `align`. Text wider than the
    /// surface starts at column 0 and is clipped.
    pub fn put_str_aligned(&mut self, y: u16, align: Align, text: &str) -> u16 {
        let cols = self.plane.width();
        let width = u16::try_from(string_width(text)).unwrap_or(u16::MAX).min(cols);
        let x = match align {
            Align::Left => 0,
            Align::Center => (cols - width) / 2,
            Align::Right => cols - width,
        };
        self.put_str_at(y, x, text)
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dim = self.dim();
        write!(
            f,
            "Surface({}x{} at {},{})",
            dim.cols, dim.rows, self.origin.0, self.origin.1
        )
    }
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Root geometry plus the surfaces drawn on it.
#[derive(Debug)]
pub struct Screen {
    size: Size,
    surfaces: Vec<(SurfaceId, Surface)>,
    next_id: u32,
}

impl Screen {
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            surfaces: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Add a surface on top of the existing ones.
    pub fn create(&mut self, opts: &SurfaceOptions) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.push((id, Surface::new(opts)));
        id
    }

    /// Remove a surface. Returns `false` for an unknown id.
    pub fn destroy(&mut self, id: SurfaceId) -> bool {
        let before = self.surfaces.len();
        self.surfaces.retain(|(sid, _)| *sid != id);
        self.surfaces.len() != before
    }

    #[must_use]
    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces
            .iter()
            .find_map(|(sid, s)| (*sid == id).then_some(s))
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces
            .iter_mut()
            .find_map(|(sid, s)| (*sid == id).then_some(s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Record a new root size and return a resize event for each surface
    /// that wants one, in creation order.
    pub fn set_size(&mut self, size: Size) -> Vec<Event> {
        self.size = size;
        self.surfaces
            .iter()
            .filter(|(_, s)| s.notify_resize)
            .map(|(id, _)| {
                Event::Resize(ResizeEvent {
                    surface: *id,
                    parent: size,
                })
            })
            .collect()
    }

    /// Paint every surface into `frame`, bottom to top, clipped to the
    /// frame. Uncovered cells are blank.
    pub fn compose(&self, frame: &mut FrameBuffer) {
        frame.fill(Cell::EMPTY);
        for (_, surface) in &self.surfaces {
            let (y, x) = surface.origin;
            frame.blit(&surface.plane, i32::from(x), i32::from(y));
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
