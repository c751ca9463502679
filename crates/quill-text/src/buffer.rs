#![forbid(unsafe_code)]

//! The row store: an ordered sequence of [`Row`]s plus the dirty counter.
//!
//! Every structural or character-level mutation bumps `dirty`; loading and
//! the search-highlight overlay do not. Out-of-range rows are silently
//! ignored, out-of-range columns are clamped where that preserves intent
//! (inserts) and ignored where it does not (deletes).

use crate::row::{Highlight, Row};

/// Ordered rows + mutation count since the last save.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rows: Vec<Row>,
    dirty: usize,
}

impl TextBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from already-loaded lines. Not a mutation: the result
    /// starts clean.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<Row> = lines.into_iter().map(Row::new).collect();
        tracing::debug!(rows = rows.len(), "buffer loaded");
        Self { rows, dirty: 0 }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the buffer has no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in file order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The row at `at`, if in range.
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// Mutations since the last successful save.
    #[must_use]
    pub fn dirty(&self) -> usize {
        self.dirty
    }

    /// Whether unsaved changes exist.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// Reset the dirty counter after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = 0;
    }

    /// Insert a new row at `at` (`0..=len`), shifting later rows down.
    /// No-op outside the valid range.
    pub fn insert_row(&mut self, at: usize, text: impl Into<String>) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(text));
        self.dirty += 1;
    }

    /// Delete the row at `at`, shifting later rows up. No-op out of range.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
    }

    /// Insert one character into a row; the column is clamped to the row
    /// length. No-op if the row does not exist.
    pub fn insert_char(&mut self, row: usize, col: usize, ch: char) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        r.insert_char(col, ch);
        self.dirty += 1;
    }

    /// Delete one character from a row. No-op if the row or column is out
    /// of range.
    pub fn delete_char(&mut self, row: usize, col: usize) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        if r.delete_char(col) {
            self.dirty += 1;
        }
    }

    /// Append text onto the end of a row (line-merge helper).
    pub fn append_to_row(&mut self, row: usize, text: &str) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        r.push_str(text);
        self.dirty += 1;
    }

    /// Split a row at `col`: the row keeps `[..col]`, a new row with
    /// `[col..]` is inserted right after it.
    pub fn split_row(&mut self, row: usize, col: usize) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        let tail = r.split_off(col);
        self.rows.insert(row + 1, tail);
        self.dirty += 1;
    }

    /// Serialize: every row's content followed by a single `\n`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.rows.iter().map(|r| r.len() + 1).sum());
        for row in &self.rows {
            out.extend_from_slice(row.chars().as_bytes());
            out.push(b'\n');
        }
        out
    }

    // ====================================================================
    // Search-highlight overlay (not mutations: dirty is untouched)
    // ====================================================================

    /// Overlay the match tag over a render-byte range of a row.
    pub fn mark_match(&mut self, row: usize, start: usize, len: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            r.mark_match(start, len);
        }
    }

    /// Snapshot a row's highlight tags before an overlay.
    #[must_use]
    pub fn highlight_snapshot(&self, row: usize) -> Option<Vec<Highlight>> {
        self.rows.get(row).map(Row::highlight_snapshot)
    }

    /// Restore a row's highlight tags from a snapshot.
    pub fn restore_highlight(&mut self, row: usize, snapshot: Vec<Highlight>) {
        if let Some(r) = self.rows.get_mut(row) {
            r.restore_highlight(snapshot);
        }
    }
}
