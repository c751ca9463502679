#![forbid(unsafe_code)]

//! Editor session: cursor, dispatch loop, prompt sub-flows, and file I/O.
//!
//! [`Editor`] ties the row store, viewport, and screen together and runs
//! the read-decode-dispatch-render loop. It is generic over the event
//! source and the output writer, so tests drive it with a scripted event
//! sequence and a byte-vector screen instead of a terminal.
//!
//! Save-As and incremental search share one modal prompt loop; search
//! plugs in via a per-keystroke callback that moves the cursor and overlays
//! the match highlight, restoring the previous overlay first so marks never
//! accumulate.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use quill_core::event::{Event, KeyCode, KeyEvent};
use quill_render::screen::{FrameView, Screen};
use quill_render::scroll::Viewport;
use quill_text::buffer::TextBuffer;
use quill_text::row::{Highlight, Row};
use quill_text::search::{self, Direction, FindState};

/// Extra Ctrl-Q presses required to discard unsaved changes.
const QUIT_CONFIRMS: usize = 1;

/// Status messages disappear after this long.
const MESSAGE_TTL: Duration = Duration::from_secs(5);

const HELP_HINT: &str = "HELP: Ctrl-S = save | Ctrl-F = find | Ctrl-Q = quit";

/// What the dispatch loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Cursor movement directions for single-step moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Up,
    Down,
    Left,
    Right,
}

/// Keys the prompt callback distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKey {
    Enter,
    Escape,
    Right,
    Left,
    Up,
    Down,
    Other,
}

impl From<KeyEvent> for PromptKey {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Enter => Self::Enter,
            KeyCode::Escape => Self::Escape,
            KeyCode::Right => Self::Right,
            KeyCode::Left => Self::Left,
            KeyCode::Up => Self::Up,
            KeyCode::Down => Self::Down,
            _ => Self::Other,
        }
    }
}

/// Incremental-search state kept across prompt keystrokes.
#[derive(Debug, Default)]
struct FindContext {
    state: FindState,
    /// Highlight baseline of the row carrying the current overlay.
    saved_hl: Option<(usize, Vec<Highlight>)>,
}

/// The editor session. One per process run.
pub struct Editor<I, W>
where
    I: Iterator<Item = io::Result<Event>>,
    W: Write,
{
    input: I,
    screen: Screen<W>,
    buffer: TextBuffer,
    /// Cursor column in chars space.
    cx: usize,
    /// Cursor row; may equal `buffer.len()` (the append point).
    cy: usize,
    viewport: Viewport,
    file_name: Option<PathBuf>,
    status: Option<(String, Instant)>,
    quit_times: usize,
    find: FindContext,
}

impl<I, W> Editor<I, W>
where
    I: Iterator<Item = io::Result<Event>>,
    W: Write,
{
    /// Create an empty session for a `cols` x `rows` terminal.
    pub fn new(input: I, out: W, cols: usize, rows: usize) -> Self {
        Self {
            input,
            screen: Screen::new(out, cols, rows),
            buffer: TextBuffer::new(),
            cx: 0,
            cy: 0,
            viewport: Viewport::default(),
            file_name: None,
            status: None,
            quit_times: QUIT_CONFIRMS,
            find: FindContext::default(),
        }
    }

    /// Cursor position as `(column, row)` in chars space.
    #[must_use]
    pub fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    /// Load a file, replacing the buffer. Unreadable files are fatal for
    /// the caller; there is no create-on-missing fallback here.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> io::Result<()> {
        let path = path.into();
        let text = fs::read_to_string(&path)?;
        self.buffer = TextBuffer::from_lines(text.lines().map(str::to_string));
        tracing::info!(path = %path.display(), rows = self.buffer.len(), "opened");
        self.file_name = Some(path);
        Ok(())
    }

    /// The read-decode-dispatch-render loop. Returns when the user quits
    /// or the input collaborator ends.
    pub fn run(&mut self) -> io::Result<()> {
        self.set_status(HELP_HINT);
        loop {
            self.refresh()?;
            let Some(event) = self.input.next() else {
                break;
            };
            if self.process_event(event?)? == Flow::Quit {
                break;
            }
        }
        self.screen.clear()
    }

    // ====================================================================
    // Dispatch
    // ====================================================================

    fn process_event(&mut self, event: Event) -> io::Result<Flow> {
        let Event::Key(key) = event else {
            // Tick: nothing to dispatch, the caller re-renders
            return Ok(Flow::Continue);
        };

        if key == KeyEvent::ctrl('q') {
            if self.buffer.is_dirty() && self.quit_times > 0 {
                self.set_status(format!(
                    "WARNING! File has unsaved changes. \
                     Press Ctrl-Q {} more time to quit.",
                    self.quit_times
                ));
                self.quit_times -= 1;
                return Ok(Flow::Continue);
            }
            tracing::info!("quit");
            return Ok(Flow::Quit);
        }
        // Any non-quit command restarts the confirmation sequence
        self.quit_times = QUIT_CONFIRMS;

        match key.code {
            KeyCode::Char(c) if key.is_ctrl() => match c {
                's' => self.save()?,
                'f' => self.find()?,
                _ => {}
            },
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Tab => self.insert_char('\t'),
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Delete => {
                self.move_cursor(Move::Right);
                self.delete_char();
            }
            KeyCode::Up => self.move_cursor(Move::Up),
            KeyCode::Down => self.move_cursor(Move::Down),
            KeyCode::Left => self.move_cursor(Move::Left),
            KeyCode::Right => self.move_cursor(Move::Right),
            KeyCode::Home => self.cx = 0,
            KeyCode::End => self.cx = self.row_len(self.cy),
            KeyCode::PageUp => self.page_move(Move::Up),
            KeyCode::PageDown => self.page_move(Move::Down),
            KeyCode::Escape => {}
        }
        Ok(Flow::Continue)
    }

    // ====================================================================
    // Cursor movement
    // ====================================================================

    fn row_len(&self, at: usize) -> usize {
        self.buffer.row(at).map_or(0, Row::len)
    }

    fn move_cursor(&mut self, mv: Move) {
        match mv {
            Move::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    // Wrap to the end of the previous line
                    self.cy -= 1;
                    self.cx = self.row_len(self.cy);
                }
            }
            Move::Right => {
                if self.cx < self.row_len(self.cy) {
                    self.cx += 1;
                } else if self.cy < self.buffer.len() {
                    // Wrap to the start of the next line
                    self.cy += 1;
                    self.cx = 0;
                }
            }
            Move::Up => self.cy = self.cy.saturating_sub(1),
            Move::Down => {
                if self.cy < self.buffer.len() {
                    self.cy += 1;
                }
            }
        }
        self.cx = self.cx.min(self.row_len(self.cy));
    }

    /// Jump to the viewport edge, then take one screenful of single steps,
    /// reusing `move_cursor`'s clamping.
    fn page_move(&mut self, dir: Move) {
        let text_rows = self.screen.text_rows();
        match dir {
            Move::Up => self.cy = self.viewport.row_off,
            Move::Down => {
                self.cy =
                    (self.viewport.row_off + text_rows.saturating_sub(1)).min(self.buffer.len());
            }
            Move::Left | Move::Right => return,
        }
        for _ in 0..text_rows {
            self.move_cursor(dir);
        }
    }

    // ====================================================================
    // Editing
    // ====================================================================

    fn insert_char(&mut self, c: char) {
        if self.cy == self.buffer.len() {
            self.buffer.insert_row(self.cy, "");
        }
        self.buffer.insert_char(self.cy, self.cx, c);
        self.cx += c.len_utf8();
    }

    fn insert_newline(&mut self) {
        if self.cx == 0 {
            self.buffer.insert_row(self.cy, "");
        } else {
            self.buffer.split_row(self.cy, self.cx);
        }
        self.cy += 1;
        self.cx = 0;
    }

    /// Backspace: delete before the cursor; at column 0 merge this line
    /// into its predecessor.
    fn delete_char(&mut self) {
        if self.cy == self.buffer.len() {
            return;
        }
        if self.cx == 0 && self.cy == 0 {
            return;
        }
        if self.cx > 0 {
            self.buffer.delete_char(self.cy, self.cx - 1);
            self.cx -= 1;
        } else {
            let target = self.cy - 1;
            let new_cx = self.row_len(target);
            let tail = self
                .buffer
                .row(self.cy)
                .map_or_else(String::new, |r| r.chars().to_string());
            self.buffer.append_to_row(target, &tail);
            self.buffer.delete_row(self.cy);
            self.cy = target;
            self.cx = new_cx;
        }
    }

    // ====================================================================
    // Save / load
    // ====================================================================

    fn save(&mut self) -> io::Result<()> {
        let path = match self.file_name.clone() {
            Some(path) => path,
            None => match self.prompt("Save as (ESC to cancel)", |_, _, _| {})? {
                Some(name) => {
                    let path = PathBuf::from(name);
                    self.file_name = Some(path.clone());
                    path
                }
                None => {
                    self.set_status("Save aborted");
                    return Ok(());
                }
            },
        };

        let bytes = self.buffer.to_bytes();
        match fs::write(&path, &bytes) {
            Ok(()) => {
                self.buffer.mark_saved();
                tracing::info!(path = %path.display(), bytes = bytes.len(), "saved");
                self.set_status(format!("{} bytes written to disk", bytes.len()));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "save failed");
                self.set_status(format!("Can't save! I/O error: {e}"));
            }
        }
        Ok(())
    }

    // ====================================================================
    // Prompt sub-flow
    // ====================================================================

    /// Modal one-line input loop. Renders `<label>: <input>` in the message
    /// bar, appends printable bytes, drops the last byte on
    /// Backspace/Delete, aborts on Escape, commits non-empty input on
    /// Enter. The callback runs after every keystroke with the current
    /// input, including the final Enter/Escape.
    fn prompt<F>(&mut self, label: &str, mut callback: F) -> io::Result<Option<String>>
    where
        F: FnMut(&mut Self, &str, PromptKey),
    {
        let mut input = String::new();
        loop {
            self.set_status(format!("{label}: {input}"));
            self.refresh()?;

            let Some(event) = self.input.next() else {
                callback(self, &input, PromptKey::Escape);
                self.clear_status();
                return Ok(None);
            };
            let Event::Key(key) = event? else {
                continue;
            };

            match key.code {
                KeyCode::Escape => {
                    callback(self, &input, PromptKey::Escape);
                    self.clear_status();
                    return Ok(None);
                }
                KeyCode::Enter => {
                    if !input.is_empty() {
                        callback(self, &input, PromptKey::Enter);
                        self.clear_status();
                        return Ok(Some(input));
                    }
                }
                KeyCode::Backspace | KeyCode::Delete => {
                    input.pop();
                }
                KeyCode::Char(c) if !key.is_ctrl() => input.push(c),
                _ => {}
            }

            match key.code {
                KeyCode::Escape | KeyCode::Enter => {}
                _ => callback(self, &input, PromptKey::from(key)),
            }
        }
    }

    // ====================================================================
    // Search
    // ====================================================================

    /// Incremental search. Escape restores the pre-search cursor and
    /// viewport; Enter leaves the cursor on the last match.
    fn find(&mut self) -> io::Result<()> {
        let saved = (self.cx, self.cy, self.viewport);

        let query = self.prompt("Search (Use ESC/Arrows/Enter)", Self::find_callback)?;

        if query.is_none() {
            (self.cx, self.cy, self.viewport) = saved;
        }
        Ok(())
    }

    fn find_callback(&mut self, query: &str, key: PromptKey) {
        // Undo the previous overlay before anything else so highlight marks
        // never accumulate across keystrokes.
        if let Some((row, snapshot)) = self.find.saved_hl.take() {
            self.buffer.restore_highlight(row, snapshot);
        }

        match key {
            PromptKey::Enter | PromptKey::Escape => {
                self.find.state.reset();
                return;
            }
            PromptKey::Right | PromptKey::Down => {
                self.find.state.direction = Direction::Forward;
            }
            PromptKey::Left | PromptKey::Up => {
                self.find.state.direction = Direction::Backward;
            }
            PromptKey::Other => self.find.state.reset(),
        }

        let Some(m) = search::scan(self.buffer.rows(), query, &self.find.state) else {
            return;
        };
        self.find.state.last_match = Some(m.row);
        self.cy = m.row;
        if let Some(row) = self.buffer.row(m.row) {
            self.cx = row.cx_of(m.start);
        }
        // Past-the-end offset makes the next scroll snap the match row to
        // the top of the window
        self.viewport.row_off = self.buffer.len();

        if let Some(snapshot) = self.buffer.highlight_snapshot(m.row) {
            self.find.saved_hl = Some((m.row, snapshot));
            self.buffer.mark_match(m.row, m.start, query.len());
        }
    }

    // ====================================================================
    // Rendering
    // ====================================================================

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some((msg.into(), Instant::now()));
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// The status message, if it has not expired.
    fn current_message(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| at.elapsed() < MESSAGE_TTL)
            .map(|(msg, _)| msg.as_str())
    }

    fn refresh(&mut self) -> io::Result<()> {
        let rx = self.buffer.row(self.cy).map_or(0, |r| r.rx_of(self.cx));
        self.viewport
            .scroll_into_view(self.cy, rx, self.screen.text_rows(), self.screen.cols());

        let message = self.current_message().map(str::to_string);
        let name = self
            .file_name
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let view = FrameView {
            rows: self.buffer.rows(),
            viewport: self.viewport,
            cursor_row: self.cy,
            render_col: rx,
            file_name: name.as_deref(),
            dirty: self.buffer.is_dirty(),
            message: message.as_deref(),
        };
        self.screen.refresh(&view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::input::scripted;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code))
    }

    fn ch(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c)))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::ctrl(c))
    }

    fn editor_with(
        lines: &[&str],
        events: Vec<Event>,
    ) -> Editor<impl Iterator<Item = io::Result<Event>>, Vec<u8>> {
        let mut ed = Editor::new(scripted(events), Vec::new(), 80, 24);
        ed.buffer = TextBuffer::from_lines(lines.iter().copied());
        ed
    }

    fn row_chars<I, W>(ed: &Editor<I, W>, at: usize) -> &str
    where
        I: Iterator<Item = io::Result<Event>>,
        W: Write,
    {
        ed.buffer.row(at).unwrap().chars()
    }

    // ==========================================================
    // Editing
    // ==========================================================

    #[test]
    fn insert_into_second_column() {
        // Spec scenario: ["abc", "a1b2"], insert 'X' at (row 0, col 1)
        let mut ed = editor_with(&["abc", "a1b2"], vec![]);
        ed.process_event(key(KeyCode::Right)).unwrap();
        ed.process_event(ch('X')).unwrap();
        assert_eq!(row_chars(&ed, 0), "aXbc");
        assert_eq!(ed.cursor(), (2, 0));
        assert!(ed.buffer.is_dirty());
    }

    #[test]
    fn typing_on_the_append_row_creates_a_line() {
        let mut ed = editor_with(&[], vec![]);
        ed.process_event(ch('h')).unwrap();
        ed.process_event(ch('i')).unwrap();
        assert_eq!(ed.buffer.len(), 1);
        assert_eq!(row_chars(&ed, 0), "hi");
    }

    #[test]
    fn enter_splits_the_line_at_the_cursor() {
        let mut ed = editor_with(&["hello world"], vec![]);
        ed.cx = 5;
        ed.process_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(row_chars(&ed, 0), "hello");
        assert_eq!(row_chars(&ed, 1), " world");
        assert_eq!(ed.cursor(), (0, 1));
    }

    #[test]
    fn enter_at_column_zero_inserts_blank_line_above() {
        let mut ed = editor_with(&["abc"], vec![]);
        ed.process_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(row_chars(&ed, 0), "");
        assert_eq!(row_chars(&ed, 1), "abc");
        assert_eq!(ed.cursor(), (0, 1));
    }

    #[test]
    fn backspace_deletes_before_cursor() {
        let mut ed = editor_with(&["abc"], vec![]);
        ed.cx = 2;
        ed.process_event(key(KeyCode::Backspace)).unwrap();
        assert_eq!(row_chars(&ed, 0), "ac");
        assert_eq!(ed.cursor(), (1, 0));
    }

    #[test]
    fn backspace_at_column_zero_merges_lines() {
        let mut ed = editor_with(&["hello", " world"], vec![]);
        ed.cy = 1;
        ed.process_event(key(KeyCode::Backspace)).unwrap();
        assert_eq!(ed.buffer.len(), 1);
        assert_eq!(row_chars(&ed, 0), "hello world");
        // Cursor lands at the join point
        assert_eq!(ed.cursor(), (5, 0));
    }

    #[test]
    fn delete_at_end_of_line_merges_next_line_up() {
        let mut ed = editor_with(&["hello", " world"], vec![]);
        ed.cx = 5;
        ed.process_event(key(KeyCode::Delete)).unwrap();
        assert_eq!(ed.buffer.len(), 1);
        assert_eq!(row_chars(&ed, 0), "hello world");
    }

    #[test]
    fn backspace_on_empty_buffer_is_noop() {
        let mut ed = editor_with(&[], vec![]);
        ed.process_event(key(KeyCode::Backspace)).unwrap();
        assert!(ed.buffer.is_empty());
        assert!(!ed.buffer.is_dirty());
    }

    #[test]
    fn tab_key_inserts_a_tab() {
        let mut ed = editor_with(&[], vec![]);
        ed.process_event(key(KeyCode::Tab)).unwrap();
        assert_eq!(row_chars(&ed, 0), "\t");
        assert_eq!(ed.buffer.row(0).unwrap().render(), "        ");
    }

    #[test]
    fn insert_then_delete_restores_line() {
        let mut ed = editor_with(&["abc"], vec![]);
        ed.cx = 1;
        ed.process_event(ch('X')).unwrap();
        ed.process_event(key(KeyCode::Backspace)).unwrap();
        assert_eq!(row_chars(&ed, 0), "abc");
    }

    // ==========================================================
    // Movement
    // ==========================================================

    #[test]
    fn vertical_move_clamps_column() {
        let mut ed = editor_with(&["hello world", "ab"], vec![]);
        ed.process_event(key(KeyCode::End)).unwrap();
        assert_eq!(ed.cursor(), (11, 0));
        ed.process_event(key(KeyCode::Down)).unwrap();
        assert_eq!(ed.cursor(), (2, 1));
    }

    #[test]
    fn right_wraps_to_next_line() {
        let mut ed = editor_with(&["ab", "cd"], vec![]);
        ed.cx = 2;
        ed.process_event(key(KeyCode::Right)).unwrap();
        assert_eq!(ed.cursor(), (0, 1));
    }

    #[test]
    fn left_wraps_to_previous_line_end() {
        let mut ed = editor_with(&["ab", "cd"], vec![]);
        ed.cy = 1;
        ed.process_event(key(KeyCode::Left)).unwrap();
        assert_eq!(ed.cursor(), (2, 0));
    }

    #[test]
    fn cursor_stays_in_bounds_under_arbitrary_moves() {
        let mut ed = editor_with(&["hello world", "x", "", "abcdef"], vec![]);
        let moves = [
            KeyCode::End,
            KeyCode::Down,
            KeyCode::Down,
            KeyCode::End,
            KeyCode::Up,
            KeyCode::PageDown,
            KeyCode::Left,
            KeyCode::PageUp,
            KeyCode::Right,
            KeyCode::Down,
            KeyCode::Home,
            KeyCode::Up,
        ];
        for code in moves {
            ed.process_event(key(code)).unwrap();
            let (cx, cy) = ed.cursor();
            assert!(cy <= ed.buffer.len(), "cy out of range after {code:?}");
            assert!(cx <= ed.row_len(cy), "cx out of range after {code:?}");
        }
    }

    #[test]
    fn page_down_clamps_to_document_length() {
        let mut ed = editor_with(&["a", "b", "c"], vec![]);
        ed.process_event(key(KeyCode::PageDown)).unwrap();
        assert!(ed.cursor().1 <= ed.buffer.len());
        ed.process_event(key(KeyCode::PageUp)).unwrap();
        assert_eq!(ed.cursor().1, 0);
    }

    // ==========================================================
    // Quit confirmation
    // ==========================================================

    #[test]
    fn clean_buffer_quits_immediately() {
        let mut ed = editor_with(&["a"], vec![]);
        assert_eq!(ed.process_event(ctrl('q')).unwrap(), Flow::Quit);
    }

    #[test]
    fn dirty_buffer_needs_two_quit_presses() {
        let mut ed = editor_with(&["a"], vec![]);
        ed.process_event(ch('x')).unwrap();
        assert_eq!(ed.process_event(ctrl('q')).unwrap(), Flow::Continue);
        assert!(ed.current_message().unwrap().contains("WARNING"));
        assert_eq!(ed.process_event(ctrl('q')).unwrap(), Flow::Quit);
    }

    #[test]
    fn any_other_key_resets_quit_confirmation() {
        let mut ed = editor_with(&["a"], vec![]);
        ed.process_event(ch('x')).unwrap();
        assert_eq!(ed.process_event(ctrl('q')).unwrap(), Flow::Continue);
        ed.process_event(key(KeyCode::Right)).unwrap();
        // The counter restarted: two presses needed again
        assert_eq!(ed.process_event(ctrl('q')).unwrap(), Flow::Continue);
        assert_eq!(ed.process_event(ctrl('q')).unwrap(), Flow::Quit);
    }

    // ==========================================================
    // Save / load
    // ==========================================================

    #[test]
    fn save_writes_buffer_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut ed = editor_with(&["hello"], vec![]);
        ed.file_name = Some(path.clone());

        ed.process_event(ch('!')).unwrap();
        assert!(ed.buffer.is_dirty());
        ed.process_event(ctrl('s')).unwrap();

        assert!(!ed.buffer.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "!hello\n");
        assert!(ed.current_message().unwrap().contains("bytes written"));
    }

    #[test]
    fn save_failure_keeps_buffer_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut ed = editor_with(&["data"], vec![]);
        // A directory is not writable as a file
        ed.file_name = Some(dir.path().to_path_buf());

        ed.process_event(ch('x')).unwrap();
        ed.process_event(ctrl('s')).unwrap();

        assert!(ed.buffer.is_dirty());
        assert!(ed.current_message().unwrap().contains("Can't save!"));
        assert_eq!(row_chars(&ed, 0), "xdata");
    }

    #[test]
    fn save_as_prompts_for_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");

        let mut events = vec![ctrl('s')];
        events.extend(path.to_str().unwrap().chars().map(ch));
        events.push(key(KeyCode::Enter));
        events.push(ctrl('q'));

        let mut ed = editor_with(&["data"], events);
        ed.run().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "data\n");
        assert_eq!(ed.file_name.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn cancelled_save_as_aborts() {
        let events = vec![ctrl('s'), ch('x'), key(KeyCode::Escape), ctrl('q')];
        let mut ed = editor_with(&["data"], events);
        ed.run().unwrap();
        assert_eq!(ed.file_name, None);
    }

    #[test]
    fn open_and_to_bytes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, "alpha\nbeta\r\ngamma\n").unwrap();

        let mut ed = editor_with(&[], vec![]);
        ed.open(&path).unwrap();

        assert_eq!(ed.buffer.len(), 3);
        assert_eq!(row_chars(&ed, 1), "beta");
        assert!(!ed.buffer.is_dirty());
        // CRLF normalizes to LF on the way back out
        assert_eq!(ed.buffer.to_bytes(), b"alpha\nbeta\ngamma\n");
    }

    #[test]
    fn open_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ed = editor_with(&[], vec![]);
        assert!(ed.open(dir.path().join("absent.txt")).is_err());
    }

    // ==========================================================
    // Search
    // ==========================================================

    #[test]
    fn search_moves_cursor_and_marks_match() {
        // Spec scenario: ["hello world"], search "world"
        let mut ed = editor_with(&["hello world"], vec![]);
        ed.find_callback("world", PromptKey::Other);

        assert_eq!(ed.cursor(), (6, 0));
        let hl = ed.buffer.row(0).unwrap().highlight();
        let marked: Vec<usize> = (0..hl.len()).filter(|&i| hl[i] == Highlight::Match).collect();
        assert_eq!(marked, vec![6, 7, 8, 9, 10]);

        // The committing Enter restores the baseline
        ed.find_callback("world", PromptKey::Enter);
        let hl = ed.buffer.row(0).unwrap().highlight();
        assert!(hl.iter().all(|&t| t != Highlight::Match));
        assert_eq!(ed.cursor(), (6, 0));
    }

    #[test]
    fn overlays_never_accumulate() {
        let mut ed = editor_with(&["aba"], vec![]);
        ed.find_callback("a", PromptKey::Other);
        ed.find_callback("ab", PromptKey::Other);
        let hl = ed.buffer.row(0).unwrap().highlight();
        assert_eq!(
            hl.iter().filter(|&&t| t == Highlight::Match).count(),
            2,
            "only the current match is marked"
        );
    }

    #[test]
    fn committed_search_keeps_cursor_at_match() {
        let events = vec![
            ctrl('f'),
            ch('w'),
            ch('o'),
            ch('r'),
            ch('l'),
            ch('d'),
            key(KeyCode::Enter),
            ctrl('q'),
        ];
        let mut ed = editor_with(&["hello world"], events);
        ed.run().unwrap();
        assert_eq!(ed.cursor(), (6, 0));
    }

    #[test]
    fn cancelled_search_restores_cursor_and_viewport() {
        let events = vec![ctrl('f'), ch('b'), key(KeyCode::Escape), ctrl('q')];
        let mut ed = editor_with(&["alpha", "beta"], events);
        ed.run().unwrap();
        assert_eq!(ed.cursor(), (0, 0));
        assert_eq!(ed.viewport, Viewport::default());
    }

    #[test]
    fn arrow_during_search_advances_to_next_match() {
        let mut ed = editor_with(&["one x", "two x", "three x"], vec![]);
        ed.find_callback("x", PromptKey::Other);
        assert_eq!(ed.cursor().1, 0);
        ed.find_callback("x", PromptKey::Right);
        assert_eq!(ed.cursor().1, 1);
        ed.find_callback("x", PromptKey::Right);
        assert_eq!(ed.cursor().1, 2);
        // Backward returns to the previous match
        ed.find_callback("x", PromptKey::Left);
        assert_eq!(ed.cursor().1, 1);
        ed.find_callback("", PromptKey::Escape);
    }

    #[test]
    fn search_translates_render_columns_through_tabs() {
        // "x" sits after a tab: render offset 8, chars offset 1
        let mut ed = editor_with(&["\txy"], vec![]);
        ed.find_callback("x", PromptKey::Other);
        assert_eq!(ed.cursor(), (1, 0));
    }

    // ==========================================================
    // Status messages
    // ==========================================================

    #[test]
    fn status_message_expires_after_ttl() {
        let mut ed = editor_with(&[], vec![]);
        ed.set_status("fresh");
        assert_eq!(ed.current_message(), Some("fresh"));

        if let Some(past) = Instant::now().checked_sub(Duration::from_secs(6)) {
            ed.status = Some(("stale".to_string(), past));
            assert_eq!(ed.current_message(), None);
        }
    }

    #[test]
    fn run_quits_cleanly_on_tick_then_quit() {
        let mut ed = editor_with(&["a"], vec![Event::Tick, ctrl('q')]);
        ed.run().unwrap();
    }
}
