// SPDX-License-Identifier: MIT
//
// Event loop: the one place the application blocks.
//
// Stdin bytes and resize notices both arrive over the reader thread's
// channel. Bytes go through the parser and come out as key events; a resize
// refreshes the terminal size, resizes the frame, schedules a full redraw
// and turns into one `Event::Resize` per surface that asked for it. Events
// are queued and handed out one at a time by `next_event`, so a resize that
// touches two surfaces is handled as two separate events, each against the
// same fresh geometry.
//
// # Escape timeout
//
// A lone ESC could be the Escape key or the start of a sequence. While the
// parser holds such bytes, the loop waits at most `escape_timeout_ms` for
// more input before flushing them as literal keys. Otherwise it blocks
// without a timeout.

use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{Event, Parser};
use crate::reader::{Input, StdinReader};
use crate::surface::Screen;
use crate::terminal::{Size, Terminal};

// ─── App ─────────────────────────────────────────────────────────────────────

/// What the loop does after the application handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Render what changed and wait for the next event.
    Continue,
    /// Redraw the whole screen from scratch, without querying the size.
    Refresh,
    /// Leave [`EventLoop::run`].
    Quit,
}

/// An application driven by [`EventLoop::run`].
///
/// Surfaces live on the [`Screen`]; the application keeps their ids and
/// draws into them while handling events. The loop composes and renders
/// after every event.
pub trait App {
    type Error: From<io::Error>;

    /// Handle one key or resize event.
    ///
    /// # Errors
    ///
    /// Any error ends [`EventLoop::run`] with that error.
    fn on_event(&mut self, event: &Event, screen: &mut Screen) -> Result<Action, Self::Error>;
}

// ─── LoopConfig ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// How long a pending ESC waits for the rest of a sequence.
    pub escape_timeout_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            escape_timeout_ms: 25,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Terminal, screen, renderer and input, wired together.
///
/// ```no_run
/// use std::io;
///
/// use n_term::event_loop::{Action, App, EventLoop};
/// use n_term::input::Event;
/// use n_term::surface::Screen;
///
/// struct Quitter;
///
/// impl App for Quitter {
///     type Error = io::Error;
///
///     fn on_event(&mut self, event: &Event, _screen: &mut Screen) -> io::Result<Action> {
///         Ok(match event {
///             Event::Key(key) if key.is_char('q') => Action::Quit,
///             _ => Action::Continue,
///         })
///     }
/// }
///
/// let mut event_loop = EventLoop::new()?;
/// event_loop.start()?;
/// let result = event_loop.run(&mut Quitter);
/// event_loop.stop()?;
/// result?;
/// # Ok::<(), io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
    frame: FrameBuffer,
    screen: Screen,
    reader: Option<StdinReader>,
    input: Option<Receiver<Input>>,
    pending: VecDeque<Event>,
    config: LoopConfig,
}

impl EventLoop {
    /// # Errors
    ///
    /// Returns an error if the terminal handle cannot be created.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// # Errors
    ///
    /// Returns an error if the terminal handle cannot be created.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        let terminal = Terminal::new()?;
        let size = terminal.size();
        Ok(Self {
            terminal,
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
            frame: FrameBuffer::new(size.cols, size.rows),
            screen: Screen::new(size),
            reader: None,
            input: None,
            pending: VecDeque::new(),
            config,
        })
    }

    /// Take over the terminal and start reading input. No-op when already
    /// started.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched or the reader
    /// thread cannot be spawned.
    pub fn start(&mut self) -> io::Result<()> {
        if self.reader.is_some() {
            return Ok(());
        }
        self.terminal.enter()?;
        let (reader, rx) = StdinReader::spawn()?;
        self.reader = Some(reader);
        self.input = Some(rx);
        self.renderer.force_redraw();
        Ok(())
    }

    /// Stop reading input and give the terminal back.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal could not be restored cleanly.
    pub fn stop(&mut self) -> io::Result<()> {
        if let Some(mut reader) = self.reader.take() {
            reader.stop();
        }
        self.input = None;
        self.pending.clear();
        self.terminal.leave()
    }

    /// Drop every key typed but not yet handled, so the next [`run`]
    /// starts clean. Resizes are kept.
    ///
    /// [`run`]: Self::run
    pub fn discard_input(&mut self) {
        let mut resized = false;
        if let Some(rx) = self.input.as_ref() {
            while let Ok(input) = rx.try_recv() {
                resized |= input == Input::Resize;
            }
        }
        let dropped = self.parser.flush().len();
        self.pending.retain(|event| matches!(event, Event::Resize(_)));
        if dropped > 0 || resized {
            log::debug!("discarded input ({dropped} partial keys, resized: {resized})");
        }
        if resized {
            self.feed(Input::Resize);
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    pub const fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Compose the screen and write what changed.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn render(&mut self) -> io::Result<()> {
        self.screen.compose(&mut self.frame);
        let stats = self.renderer.render(&self.frame);
        log::trace!(
            "rendered {}/{} cells, {} bytes",
            stats.cells_rendered,
            stats.total_cells(),
            stats.bytes_written
        );
        self.renderer.flush()
    }

    /// Clear the terminal and draw everything again with the geometry
    /// already known.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn refresh(&mut self) -> io::Result<()> {
        self.renderer.force_redraw();
        self.render()
    }

    /// Block until the next event.
    ///
    /// # Errors
    ///
    /// `NotConnected` before [`start`](Self::start); `UnexpectedEof` once
    /// input has ended.
    pub fn next_event(&mut self) -> io::Result<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }
            let rx = self.input.as_ref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotConnected, "event loop not started")
            })?;

            let received = if self.parser.has_pending() {
                rx.recv_timeout(Duration::from_millis(self.config.escape_timeout_ms))
            } else {
                rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
            };
            match received {
                Ok(input) => self.feed(input),
                Err(RecvTimeoutError::Disconnected) if !self.parser.has_pending() => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "terminal input closed",
                    ));
                }
                Err(_) => {
                    let flushed = self.parser.flush();
                    self.pending.extend(flushed);
                }
            }
        }
    }

    fn feed(&mut self, input: Input) {
        match input {
            Input::Bytes(bytes) => {
                let events = self.parser.advance(&bytes);
                self.pending.extend(events);
            }
            Input::Resize => {
                let size = self.terminal.refresh_size();
                log::debug!("terminal resized to {}x{}", size.cols, size.rows);
                self.frame.resize(size.cols, size.rows);
                self.renderer.force_redraw();
                let events = self.screen.set_size(size);
                self.pending.extend(events);
            }
        }
    }

    /// Render, then hand events to `app` until it quits.
    ///
    /// # Errors
    ///
    /// The first error from `app`, rendering, or [`next_event`](Self::next_event).
    pub fn run<A: App>(&mut self, app: &mut A) -> Result<(), A::Error> {
        self.render()?;
        loop {
            let event = self.next_event()?;
            match app.on_event(&event, &mut self.screen)? {
                Action::Continue => self.render()?,
                Action::Refresh => self.refresh()?,
                Action::Quit => return Ok(()),
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent, Modifiers, ResizeEvent};
    use crate::surface::SurfaceOptions;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;

    /// An event loop fed from a test channel instead of stdin.
    fn wired() -> (EventLoop, mpsc::Sender<Input>) {
        let mut event_loop = EventLoop::new().unwrap();
        let (tx, rx) = mpsc::channel();
        event_loop.input = Some(rx);
        (event_loop, tx)
    }

    fn key(ch: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch), Modifiers::empty()))
    }

    #[test]
    fn default_config() {
        assert_eq!(LoopConfig::default().escape_timeout_ms, 25);
    }

    #[test]
    fn screen_matches_terminal_size() {
        let event_loop = EventLoop::new().unwrap();
        assert_eq!(event_loop.screen().size(), event_loop.size());
        assert!(event_loop.screen().is_empty());
    }

    #[test]
    fn next_event_before_start_fails() {
        let mut event_loop = EventLoop::new().unwrap();
        let err = event_loop.next_event().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn bytes_become_key_events_in_order() {
        let (mut event_loop, tx) = wired();
        tx.send(Input::Bytes(b"ab".to_vec())).unwrap();
        tx.send(Input::Bytes(b"\x0c".to_vec())).unwrap();
        assert_eq!(event_loop.next_event().unwrap(), key('a'));
        assert_eq!(event_loop.next_event().unwrap(), key('b'));
        assert_eq!(
            event_loop.next_event().unwrap(),
            Event::Key(KeyEvent::new(KeyCode::Char('l'), Modifiers::CTRL))
        );
    }

    #[test]
    fn closed_input_is_unexpected_eof() {
        let (mut event_loop, tx) = wired();
        tx.send(Input::Bytes(b"q".to_vec())).unwrap();
        drop(tx);
        assert_eq!(event_loop.next_event().unwrap(), key('q'));
        let err = event_loop.next_event().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn lone_escape_times_out_into_key() {
        let (mut event_loop, tx) = wired();
        tx.send(Input::Bytes(b"\x1b".to_vec())).unwrap();
        assert_eq!(
            event_loop.next_event().unwrap(),
            Event::Key(KeyEvent::new(KeyCode::Escape, Modifiers::empty()))
        );
        drop(tx);
    }

    #[test]
    fn resize_fans_out_to_subscribed_surfaces() {
        let (mut event_loop, tx) = wired();
        let screen = event_loop.screen_mut();
        let page = screen.create(&SurfaceOptions {
            rows: 1,
            cols: 1,
            notify_resize: true,
            ..SurfaceOptions::default()
        });
        screen.create(&SurfaceOptions::default());
        let bar = screen.create(&SurfaceOptions {
            notify_resize: true,
            ..SurfaceOptions::default()
        });

        tx.send(Input::Resize).unwrap();
        let size = event_loop.size();
        assert_eq!(
            event_loop.next_event().unwrap(),
            Event::Resize(ResizeEvent {
                surface: page,
                parent: size
            })
        );
        assert_eq!(
            event_loop.next_event().unwrap(),
            Event::Resize(ResizeEvent {
                surface: bar,
                parent: size
            })
        );
        assert_eq!(event_loop.frame.width(), size.cols);
        assert_eq!(event_loop.frame.height(), size.rows);
    }

    #[test]
    fn discard_input_drops_keys_but_keeps_resizes() {
        let (mut event_loop, tx) = wired();
        let page = event_loop.screen_mut().create(&SurfaceOptions {
            notify_resize: true,
            ..SurfaceOptions::default()
        });

        tx.send(Input::Bytes(b"q".to_vec())).unwrap();
        assert_eq!(event_loop.next_event().unwrap(), key('q'));

        // Typed ahead of the next page: a second quit, half an escape
        // sequence, and a resize in between.
        tx.send(Input::Bytes(b"qx".to_vec())).unwrap();
        tx.send(Input::Resize).unwrap();
        tx.send(Input::Bytes(b"\x1b[".to_vec())).unwrap();
        event_loop.discard_input();

        let size = event_loop.size();
        assert_eq!(
            event_loop.next_event().unwrap(),
            Event::Resize(ResizeEvent {
                surface: page,
                parent: size
            })
        );
        tx.send(Input::Bytes(b"a".to_vec())).unwrap();
        assert_eq!(event_loop.next_event().unwrap(), key('a'));
    }

    #[test]
    fn discard_input_with_nothing_queued() {
        let (mut event_loop, _tx) = wired();
        event_loop.discard_input();
        assert!(event_loop.pending.is_empty());
        assert!(!event_loop.parser.has_pending());
    }

    #[test]
    fn stop_without_start_is_fine() {
        let mut event_loop = EventLoop::new().unwrap();
        event_loop.stop().unwrap();
        event_loop.stop().unwrap();
    }

    struct CountUntilQuit {
        seen: usize,
    }

    impl App for CountUntilQuit {
        type Error = io::Error;

        fn on_event(&mut self, event: &Event, _screen: &mut Screen) -> io::Result<Action> {
            self.seen += 1;
            Ok(match event {
                Event::Key(k) if k.is_char('q') => Action::Quit,
                Event::Key(k) if k.is_ctrl('l') => Action::Refresh,
                _ => Action::Continue,
            })
        }
    }

    #[test]
    fn run_dispatches_until_quit() {
        let (mut event_loop, tx) = wired();
        tx.send(Input::Bytes(b"x\x0cqz".to_vec())).unwrap();
        let mut app = CountUntilQuit { seen: 0 };
        event_loop.run(&mut app).unwrap();
        assert_eq!(app.seen, 3);
        assert_eq!(event_loop.next_event().unwrap(), key('z'));
    }

    #[test]
    fn run_without_quit_ends_in_eof() {
        let (mut event_loop, tx) = wired();
        tx.send(Input::Bytes(b"x".to_vec())).unwrap();
        drop(tx);
        let mut app = CountUntilQuit { seen: 0 };
        let err = event_loop.run(&mut app).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(app.seen, 1);
    }
}
