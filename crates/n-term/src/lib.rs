// SPDX-License-Identifier: MIT
//
// n-term: terminal rendering engine for n-man.
//
// The pipeline, bottom up:
//
//   cell / color     what one screen position holds
//   buffer           a grid of cells with clipping and wide-char handling
//   surface          independently placed grids, composed into one frame
//   ansi / output    escape sequences and the stateful cell encoder
//   diff             emits only the cells that changed since last frame
//   terminal         raw mode, alternate screen, size, panic-safe restore
//   reader / input   stdin thread and key parser
//   event_loop       blocks for the next key or resize and renders
//
// No TUI framework underneath: escape sequences and termios are driven
// directly.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod diff;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod surface;
pub mod terminal;
