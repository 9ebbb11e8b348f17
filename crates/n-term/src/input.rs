// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events:
//
// - ASCII and UTF-8 characters
// - C0 controls as Ctrl+letter (Ctrl+L arrives as 0x0C)
// - ESC followed by a character as Alt+character
// - CSI sequences for arrows, editing keys and function keys, with the
//   xterm `1 + bitmask` modifier parameter
// - SS3 sequences (`ESC O A`, `ESC O P`, ...)
//
// Sequences can span `read()` calls, so unparsed bytes stay buffered. A lone
// ESC is ambiguous until more bytes arrive or the caller gives up waiting
// and calls [`Parser::flush`].
//
// `Event` also carries the resize notifications the event loop generates;
// the parser itself never produces those.

use bitflags::bitflags;

use crate::surface::SurfaceId;
use crate::terminal::Size;

// ─── Events ──────────────────────────────────────────────────────────────────

/// Something the application has to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// A surface that asked for resize notifications must re-lay itself out
    /// against its parent's new size.
    Resize(ResizeEvent),
}

/// Addressed resize notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub surface: SurfaceId,
    /// The parent's dimensions after the resize.
    pub parent: Size,
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// `ch` with neither Ctrl nor Alt held. Shift is ignored.
    #[must_use]
    pub fn is_char(&self, ch: char) -> bool {
        self.code == KeyCode::Char(ch)
            && !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT)
    }

    /// Ctrl+`ch`, case-insensitive, Alt not held.
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        matches!(self.code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&ch))
            && self.modifiers.contains(Modifiers::CTRL)
            && !self.modifiers.contains(Modifiers::ALT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F20.
    F(u8),
}

bitflags! {
    /// Modifier keys, in xterm's CSI bit order (`param = 1 + bits`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

/// Incremental byte-to-event parser.
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed bytes and return every complete event.
    ///
    /// An incomplete trailing sequence is kept for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }
        self.buf.drain(..pos);
        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Give up waiting: a pending ESC becomes the Escape key, whatever
    /// follows it is parsed on its own, and a truncated UTF-8 sequence is
    /// dropped.
    pub fn flush(&mut self) -> Vec<Event> {
        let pending = std::mem::take(&mut self.buf);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < pending.len() {
            if pending[pos] == 0x1B {
                events.push(press(KeyCode::Escape));
                pos += 1;
                continue;
            }
            match try_parse(&pending[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => pos += 1,
                Parsed::Skip(n) => pos += n,
            }
        }
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

enum Parsed {
    /// An event and the number of bytes it used.
    Event(Event, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognized, drop this many bytes (always at least one).
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Incomplete;
    };

    match first {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Event(ctrl_key('@'), 1),
        0x08 | 0x7F => Parsed::Event(press(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(press(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(press(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Event(ctrl_key(char::from(b + b'a' - 1)), 1),
        b @ 0x1C..=0x1F => Parsed::Event(ctrl_key(char::from(b + b'@')), 1),
        b @ 0x20..=0x7E => Parsed::Event(press(KeyCode::Char(char::from(b))), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key_with(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Event(key_with(KeyCode::Char(char::from(b)), Modifiers::ALT), 2),
        b @ 0x01..=0x1A => Parsed::Event(
            key_with(
                KeyCode::Char(char::from(b + b'a' - 1)),
                Modifiers::ALT | Modifiers::CTRL,
            ),
            2,
        ),
        // Not a sequence we know: a plain Escape, then start over.
        _ => Parsed::Event(press(KeyCode::Escape), 1),
    }
}

/// `ESC [ params final`, parameters in 0x30..=0x3F, intermediates in
/// 0x20..=0x2F, final in 0x40..=0x7E.
fn parse_csi(buf: &[u8]) -> Parsed {
    let mut end = 2;
    loop {
        match buf.get(end) {
            None => return Parsed::Incomplete,
            Some(0x40..=0x7E) => break,
            Some(0x20..=0x3F) => end += 1,
            Some(_) => return Parsed::Skip(end + 1),
        }
    }

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = if final_byte == b'~' {
        params.first().and_then(|&n| tilde_key(n))
    } else if final_byte == b'Z' {
        return Parsed::Event(key_with(KeyCode::Tab, Modifiers::SHIFT), consumed);
    } else {
        letter_key(final_byte)
    };

    code.map_or(Parsed::Skip(consumed), |code| {
        Parsed::Event(key_with(code, modifiers), consumed)
    })
}

/// `ESC O letter`.
fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&letter) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    letter_key(letter).map_or(Parsed::Skip(3), |code| Parsed::Event(press(code), 3))
}

/// Keys named by a CSI or SS3 final letter.
const fn letter_key(letter: u8) -> Option<KeyCode> {
    Some(match letter {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return None,
    })
}

/// Keys named by the first parameter of a `~`-terminated CSI sequence.
#[allow(clippy::cast_possible_truncation)]
const fn tilde_key(n: u16) -> Option<KeyCode> {
    Some(match n {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((n - 10) as u8),
        17..=21 => KeyCode::F((n - 11) as u8),
        23..=26 => KeyCode::F((n - 12) as u8),
        28 | 29 => KeyCode::F((n - 13) as u8),
        31..=34 => KeyCode::F((n - 14) as u8),
        _ => return None,
    })
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    let available = buf.len().min(len);
    if buf[1..available].iter().any(|&b| b & 0xC0 != 0x80) {
        return Parsed::Skip(1);
    }
    if buf.len() < len {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(len), |ch| Parsed::Event(press(KeyCode::Char(ch)), len))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

const fn press(code: KeyCode) -> Event {
    key_with(code, Modifiers::empty())
}

const fn ctrl_key(ch: char) -> Event {
    key_with(KeyCode::Char(ch), Modifiers::CTRL)
}

const fn key_with(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

/// Semicolon-separated decimal parameters. Colon sub-parameters and
/// private markers are ignored; a missing value reads as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// xterm modifier parameter: `1 + bitmask`, 0 and 1 meaning none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1) as u8)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
