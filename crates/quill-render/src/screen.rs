#![forbid(unsafe_code)]

//! Full-frame renderer.
//!
//! [`Screen::refresh`] rebuilds the entire terminal frame from the row
//! store and viewport state on every call: there is no diffing, the frame
//! is cheap to recompute and a single buffered write keeps the terminal
//! from ever observing a partially drawn state.
//!
//! Frame layout, top to bottom: the text window (`rows - 2` lines, tilde
//! fill past the end of the document), an inverted-video status bar, and a
//! one-line message bar.

use std::io::{self, Write};

use quill_text::row::{Highlight, Row};

use crate::ansi;
use crate::scroll::Viewport;

/// Version string shown in the welcome banner.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a single frame needs from the editor session.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// All document rows.
    pub rows: &'a [Row],
    /// Current scroll offsets.
    pub viewport: Viewport,
    /// Cursor row index.
    pub cursor_row: usize,
    /// Cursor column in render space.
    pub render_col: usize,
    /// Display name of the file, if any.
    pub file_name: Option<&'a str>,
    /// Whether unsaved changes exist (status bar `(modified)` marker).
    pub dirty: bool,
    /// Status message, already TTL-filtered by the caller.
    pub message: Option<&'a str>,
}

/// Terminal frame renderer over an output collaborator.
#[derive(Debug)]
pub struct Screen<W: Write> {
    out: W,
    text_rows: usize,
    cols: usize,
}

impl<W: Write> Screen<W> {
    /// Create a renderer for a `cols` x `rows` terminal. Two rows are
    /// reserved for the status and message bars.
    pub fn new(out: W, cols: usize, rows: usize) -> Self {
        Self {
            out,
            text_rows: rows.saturating_sub(2),
            cols,
        }
    }

    /// Rows available to the text window.
    #[must_use]
    pub fn text_rows(&self) -> usize {
        self.text_rows
    }

    /// Terminal width in columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Render one complete frame and write it out atomically.
    pub fn refresh(&mut self, view: &FrameView<'_>) -> io::Result<()> {
        let mut buf = Vec::with_capacity(self.text_rows * self.cols);

        buf.extend_from_slice(ansi::CURSOR_HIDE);
        buf.extend_from_slice(ansi::CURSOR_HOME);

        self.draw_rows(&mut buf, view)?;
        self.draw_status_bar(&mut buf, view);
        self.draw_message_bar(&mut buf, view);

        // The viewport contract puts the cursor inside the window; saturate
        // rather than panic if a caller hands an unscrolled view.
        ansi::cursor_goto(
            &mut buf,
            view.cursor_row.saturating_sub(view.viewport.row_off) + 1,
            view.render_col.saturating_sub(view.viewport.col_off) + 1,
        )?;
        buf.extend_from_slice(ansi::CURSOR_SHOW);

        self.out.write_all(&buf)?;
        self.out.flush()
    }

    /// Erase the display and home the cursor (used on exit).
    pub fn clear(&mut self) -> io::Result<()> {
        self.out.write_all(ansi::ERASE_DISPLAY)?;
        self.out.write_all(ansi::CURSOR_HOME)?;
        self.out.flush()
    }

    fn draw_rows(&self, buf: &mut Vec<u8>, view: &FrameView<'_>) -> io::Result<()> {
        for y in 0..self.text_rows {
            let file_row = y + view.viewport.row_off;
            if file_row >= view.rows.len() {
                if view.rows.is_empty() && y == self.text_rows / 3 {
                    self.draw_welcome(buf);
                } else {
                    buf.push(b'~');
                }
            } else {
                self.draw_text_row(buf, &view.rows[file_row], view.viewport.col_off)?;
            }
            buf.extend_from_slice(ansi::ERASE_LINE_TAIL);
            buf.extend_from_slice(b"\r\n");
        }
        Ok(())
    }

    /// Emit the visible slice of one row, switching the color sequence only
    /// where the highlight tag changes.
    fn draw_text_row(&self, buf: &mut Vec<u8>, row: &Row, col_off: usize) -> io::Result<()> {
        let render = row.render().as_bytes();
        let start = col_off.min(render.len());
        let end = (start + self.cols).min(render.len());

        let mut current: Option<u8> = None;
        for i in start..end {
            let color = color_for(row.highlight()[i]);
            if color != current {
                match color {
                    Some(code) => ansi::fg_color(buf, code)?,
                    None => buf.extend_from_slice(ansi::FG_DEFAULT),
                }
                current = color;
            }
            buf.push(render[i]);
        }
        if current.is_some() {
            buf.extend_from_slice(ansi::FG_DEFAULT);
        }
        Ok(())
    }

    fn draw_welcome(&self, buf: &mut Vec<u8>) {
        let mut banner = format!("quill editor -- version {VERSION}");
        banner.truncate(self.cols);
        let mut pad = (self.cols - banner.len()) / 2;
        if pad > 0 {
            buf.push(b'~');
            pad -= 1;
        }
        buf.extend(std::iter::repeat_n(b' ', pad));
        buf.extend_from_slice(banner.as_bytes());
    }

    fn draw_status_bar(&self, buf: &mut Vec<u8>, view: &FrameView<'_>) {
        buf.extend_from_slice(ansi::SGR_INVERT);

        let name = view.file_name.unwrap_or("[No Name]");
        let name: String = name.chars().take(20).collect();
        let mut left = format!(
            "{name} - {} lines{}",
            view.rows.len(),
            if view.dirty { " (modified)" } else { "" }
        );
        left.truncate(self.cols);
        let right = format!("{}/{}", view.cursor_row + 1, view.rows.len());

        buf.extend_from_slice(left.as_bytes());
        let mut len = left.len();
        while len < self.cols {
            if self.cols - len == right.len() {
                buf.extend_from_slice(right.as_bytes());
                break;
            }
            buf.push(b' ');
            len += 1;
        }

        buf.extend_from_slice(ansi::SGR_RESET);
        buf.extend_from_slice(b"\r\n");
    }

    fn draw_message_bar(&self, buf: &mut Vec<u8>, view: &FrameView<'_>) {
        buf.extend_from_slice(ansi::ERASE_LINE_TAIL);
        if let Some(msg) = view.message {
            let mut msg = msg.to_string();
            msg.truncate(self.cols);
            buf.extend_from_slice(msg.as_bytes());
        }
    }
}

/// SGR foreground code for a highlight class; `None` is the default color.
const fn color_for(tag: Highlight) -> Option<u8> {
    match tag {
        Highlight::Normal => None,
        Highlight::Number => Some(31),
        Highlight::Match => Some(34),
    }
}
