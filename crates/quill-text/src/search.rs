#![forbid(unsafe_code)]

//! Direction-aware wrapping search over rendered rows.
//!
//! The scan is a plain substring search on each row's display form, so
//! match offsets are render-columns; callers translate them back to
//! chars-columns with [`Row::cx_of`](crate::row::Row::cx_of). It starts
//! one row past the previous match and wraps circularly through the full
//! row set at most once.

use memchr::memmem;

use crate::row::Row;

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Towards higher row indices.
    #[default]
    Forward,
    /// Towards lower row indices.
    Backward,
}

/// Incremental-search cursor: where the last match was and which way the
/// next scan moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindState {
    /// Row index of the previous match, if any.
    pub last_match: Option<usize>,
    /// Direction for the next scan.
    pub direction: Direction,
}

impl FindState {
    /// Fresh forward search with no anchor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the anchor and reset to forward.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A single match: the row and the render-byte offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPos {
    /// Row index.
    pub row: usize,
    /// Byte offset of the match start within the row's render form.
    pub start: usize,
}

/// Find the next occurrence of `query`, starting one row from the state's
/// anchor and wrapping at most once.
///
/// With no anchor the scan always runs forward from the top regardless of
/// the requested direction. Empty queries and empty row sets never match.
#[must_use]
pub fn scan(rows: &[Row], query: &str, state: &FindState) -> Option<MatchPos> {
    if query.is_empty() || rows.is_empty() {
        return None;
    }

    let step: isize = match (state.last_match, state.direction) {
        (None, _) | (_, Direction::Forward) => 1,
        (_, Direction::Backward) => -1,
    };
    let mut current = state.last_match.map_or(-1, |r| r as isize);

    let finder = memmem::Finder::new(query.as_bytes());
    // Loop bound: the full row set, so the wrap happens exactly once
    for _ in 0..rows.len() {
        current += step;
        if current < 0 {
            current = rows.len() as isize - 1;
        } else if current >= rows.len() as isize {
            current = 0;
        }

        let row = &rows[current as usize];
        if let Some(start) = finder.find(row.render().as_bytes()) {
            tracing::trace!(row = current, start, "search match");
            return Some(MatchPos {
                row: current as usize,
                start,
            });
        }
    }
    None
}
