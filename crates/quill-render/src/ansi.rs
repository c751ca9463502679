#![forbid(unsafe_code)]

//! ANSI escape sequence generation helpers.
//!
//! Pure byte-generation functions for the handful of VT sequences a frame
//! needs. No state tracking here; the [`screen`](crate::screen) module
//! decides when a sequence is worth emitting.
//!
//! # Sequence Reference
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | CSI | `ESC [ ? 25 l/h` | Hide / show cursor |
//! | CSI | `ESC [ H` | Cursor home |
//! | CSI | `ESC [ row ; col H` | CUP (Cursor Position, 1-indexed) |
//! | CSI | `ESC [ K` | EL (Erase to end of line) |
//! | CSI | `ESC [ 2 J` | ED (Erase display) |
//! | CSI | `ESC [ n m` | SGR (color / video attributes) |

use std::io::{self, Write};

/// Hide the cursor: `CSI ? 25 l`
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";

/// Show the cursor: `CSI ? 25 h`
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

/// Move the cursor to the top-left corner: `CSI H`
pub const CURSOR_HOME: &[u8] = b"\x1b[H";

/// Erase from the cursor to the end of the line: `CSI K`
pub const ERASE_LINE_TAIL: &[u8] = b"\x1b[K";

/// Erase the whole display: `CSI 2 J`
pub const ERASE_DISPLAY: &[u8] = b"\x1b[2J";

/// Reset all SGR attributes: `CSI m`
pub const SGR_RESET: &[u8] = b"\x1b[m";

/// Inverted video: `CSI 7 m`
pub const SGR_INVERT: &[u8] = b"\x1b[7m";

/// Default foreground color: `CSI 39 m`
pub const FG_DEFAULT: &[u8] = b"\x1b[39m";

/// Write a 1-indexed cursor position: `CSI row ; col H`
#[inline]
pub fn cursor_goto<W: Write>(w: &mut W, row: usize, col: usize) -> io::Result<()> {
    write!(w, "\x1b[{row};{col}H")
}

/// Write an SGR foreground color code: `CSI code m`
#[inline]
pub fn fg_color<W: Write>(w: &mut W, code: u8) -> io::Result<()> {
    write!(w, "\x1b[{code}m")
}
