// SPDX-License-Identifier: MIT
//
// Pager: one viewing session per man page.
//
//   Loading ──▶ Parsed ──▶ Displayed ──▶ Closed
//      │           │           │
//      └───────────┴───────────┴──────▶ Failed
//
// The screen is split in two surfaces that both follow terminal resizes:
//
//   ┌──────────────────────────────┐
//   │ ls(1)                   ls(1)│  page: rows - 1
//   │                              │
//   ├──────────────────────────────┤
//   │ ls(1)                  (q)uit│  bar: last row
//   └──────────────────────────────┘
//
// Each surface gets its own resize event and re-lays itself out from the
// parent size carried in that event, so the two never depend on which one
// was handled first.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use n_term::cell::{Attr, Cell, Style};
use n_term::color::CellColor;
use n_term::event_loop::{Action, App, EventLoop};
use n_term::input::{Event, KeyEvent, ResizeEvent};
use n_term::surface::{Align, Screen, Surface, SurfaceId, SurfaceOptions};
use n_term::terminal::Size;
use n_troff::{Document, LoadError, MacroTrie, ParseError, RawDocument};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerConfig {
    pub bar_fg: CellColor,
    pub bar_bg: CellColor,
    /// Right-aligned on the bar.
    pub usage: &'static str,
    pub quit_key: char,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            bar_fg: CellColor::hex(0xff_ff_ff),
            bar_bg: CellColor::hex(0x26_62_41),
            usage: "(q)uit",
            quit_key: 'q',
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PagerError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Backend(#[from] io::Error),

    #[error("surface {0:?} no longer exists")]
    MissingSurface(SurfaceId),

    #[error("page has not been loaded")]
    NotLoaded,
}

// ─── Layout ──────────────────────────────────────────────────────────────────

/// Where the page and the bar go for a given parent size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    page: SurfaceOptions,
    bar: SurfaceOptions,
}

impl Layout {
    const fn for_parent(parent: Size) -> Self {
        let page_rows = parent.rows.saturating_sub(1);
        Self {
            page: SurfaceOptions {
                y: 0,
                x: 0,
                rows: page_rows,
                cols: parent.cols,
                notify_resize: true,
            },
            bar: SurfaceOptions {
                y: page_rows,
                x: 0,
                rows: if parent.rows == 0 { 0 } else { 1 },
                cols: parent.cols,
                notify_resize: true,
            },
        }
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Loading,
    Parsed,
    Displayed,
    Closed,
    Failed,
}

/// Everything one man page needs while it is on screen.
pub struct PagerSession<'t> {
    path: PathBuf,
    trie: &'t MacroTrie,
    config: PagerConfig,
    state: State,
    raw: Option<RawDocument>,
    document: Option<Document>,
    page: Option<SurfaceId>,
    bar: Option<SurfaceId>,
}

impl<'t> PagerSession<'t> {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, trie: &'t MacroTrie, config: PagerConfig) -> Self {
        Self {
            path: path.into(),
            trie,
            config,
            state: State::Loading,
            raw: None,
            document: None,
            page: None,
            bar: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub const fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The page and bar surface ids, once displayed.
    #[must_use]
    pub const fn surfaces(&self) -> Option<(SurfaceId, SurfaceId)> {
        match (self.page, self.bar) {
            (Some(page), Some(bar)) => Some((page, bar)),
            _ => None,
        }
    }

    /// Read the file and extract its metadata: Loading → Parsed.
    ///
    /// # Errors
    ///
    /// [`PagerError::Load`] if the bytes can't be acquired,
    /// [`PagerError::Parse`] if the title can't be extracted. Either moves
    /// the session to [`State::Failed`].
    pub fn load(&mut self) -> Result<(), PagerError> {
        debug_assert_eq!(self.state, State::Loading);
        let result = self.try_load();
        if result.is_err() {
            self.state = State::Failed;
        }
        result
    }

    fn try_load(&mut self) -> Result<(), PagerError> {
        let raw = self.raw.insert(RawDocument::open(&self.path)?);
        log::debug!("{}: {raw:?}", self.path.display());
        let document = n_troff::scan(self.trie, raw.bytes())?;
        log::info!("{}: {}", self.path.display(), document.heading());
        self.document = Some(document);
        self.state = State::Parsed;
        Ok(())
    }

    /// Create and draw the page and bar surfaces: Parsed → Displayed.
    ///
    /// # Errors
    ///
    /// [`PagerError::NotLoaded`] without a parsed document,
    /// [`PagerError::MissingSurface`] if a surface vanished right after
    /// being created. Either moves the session to [`State::Failed`].
    pub fn display(&mut self, screen: &mut Screen) -> Result<(), PagerError> {
        debug_assert_eq!(self.state, State::Parsed);
        let result = self.try_display(screen);
        if result.is_err() {
            self.state = State::Failed;
        }
        result
    }

    fn try_display(&mut self, screen: &mut Screen) -> Result<(), PagerError> {
        let Some(document) = self.document.as_ref() else {
            return Err(PagerError::NotLoaded);
        };
        let layout = Layout::for_parent(screen.size());

        let page = screen.create(&layout.page);
        self.page = Some(page);
        draw_page(surface(screen, page)?, document);

        let bar = screen.create(&layout.bar);
        self.bar = Some(bar);
        let surface = surface(screen, bar)?;
        let fill = Style::PLAIN
            .with_fg(self.config.bar_fg)
            .with_bg(self.config.bar_bg);
        surface.set_base(Cell::styled(' ', fill));
        surface.set_fg(self.config.bar_fg);
        surface.set_bg(self.config.bar_bg);
        draw_bar(surface, document, &self.config);

        self.state = State::Displayed;
        Ok(())
    }

    /// Re-lay out whichever surface `event` names against its new parent.
    fn relayout(&self, screen: &mut Screen, event: ResizeEvent) -> Result<(), PagerError> {
        let Some(document) = self.document.as_ref() else {
            return Ok(());
        };
        let layout = Layout::for_parent(event.parent);
        let (opts, page) = if Some(event.surface) == self.page {
            (layout.page, true)
        } else if Some(event.surface) == self.bar {
            (layout.bar, false)
        } else {
            return Ok(());
        };

        let surface = surface(screen, event.surface)?;
        surface.resize(opts.rows, opts.cols);
        if page {
            draw_page(surface, document);
        } else {
            draw_bar(surface, document, &self.config);
        }
        surface.move_to(opts.y, opts.x);
        Ok(())
    }

    fn on_key(&mut self, key: &KeyEvent) -> Action {
        if key.is_ctrl('l') {
            Action::Refresh
        } else if key.is_char(self.config.quit_key) {
            self.state = State::Closed;
            Action::Quit
        } else {
            Action::Continue
        }
    }

    /// Release the surfaces, then the raw bytes, then the document. Safe
    /// to call in any state and more than once; anything never acquired
    /// is skipped.
    ///
    /// A session that was not quit by the user ends up [`State::Failed`].
    pub fn teardown(&mut self, screen: &mut Screen) {
        for id in [self.page.take(), self.bar.take()].into_iter().flatten() {
            screen.destroy(id);
        }
        self.raw = None;
        self.document = None;
        if self.state != State::Closed {
            self.state = State::Failed;
        }
    }
}

impl App for PagerSession<'_> {
    type Error = PagerError;

    fn on_event(&mut self, event: &Event, screen: &mut Screen) -> Result<Action, PagerError> {
        if self.state != State::Displayed {
            return Ok(Action::Continue);
        }
        match event {
            Event::Key(key) => Ok(self.on_key(key)),
            Event::Resize(resize) => {
                self.relayout(screen, *resize)?;
                Ok(Action::Continue)
            }
        }
    }
}

fn surface(screen: &mut Screen, id: SurfaceId) -> Result<&mut Surface, PagerError> {
    screen.get_mut(id).ok_or(PagerError::MissingSurface(id))
}

// ─── Drawing ─────────────────────────────────────────────────────────────────

/// `title(section)` at both ends of the first row.
fn draw_page(surface: &mut Surface, document: &Document) {
    let heading = document.heading().to_string();
    surface.erase();
    surface.put_str_aligned(0, Align::Left, &heading);
    surface.put_str_aligned(0, Align::Right, &heading);
}

/// Bold title and section, usage text in italics on the right.
fn draw_bar(surface: &mut Surface, document: &Document, config: &PagerConfig) {
    surface.erase();
    surface.set_styles(Attr::BOLD);
    surface.put_str(document.title().unwrap_or_default());
    surface.set_styles(Attr::empty());
    surface.put_char('(');
    surface.set_styles(Attr::BOLD);
    surface.put_str(document.section().unwrap_or_default());
    surface.set_styles(Attr::empty());
    surface.put_char(')');
    surface.set_styles(Attr::ITALIC);
    surface.put_str_aligned(0, Align::Right, config.usage);
    surface.set_styles(Attr::empty());
}

// ─── Driver ──────────────────────────────────────────────────────────────────

/// Load, display and run one page, then tear it down whatever happened.
///
/// Returns `Ok` only when the user quit the page.
///
/// # Errors
///
/// The first load, parse, or backend error. Input ending before a quit is
/// a [`PagerError::Backend`] with [`io::ErrorKind::UnexpectedEof`].
pub fn view_file(
    event_loop: &mut EventLoop,
    trie: &MacroTrie,
    path: &Path,
    config: PagerConfig,
) -> Result<(), PagerError> {
    log::info!("viewing {}", path.display());
    let mut session = PagerSession::new(path, trie, config);
    let result = session
        .load()
        .and_then(|()| session.display(event_loop.screen_mut()))
        .and_then(|()| event_loop.run(&mut session));
    session.teardown(event_loop.screen_mut());
    event_loop.discard_input();
    log::debug!("{}: session ended {:?}", path.display(), session.state());
    result
}

// ─── Tests ───────────────────────────────────────────────────────────────────
