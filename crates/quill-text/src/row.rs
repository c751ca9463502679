#![forbid(unsafe_code)]

//! A single logical line and its derived display form.
//!
//! [`Row`] keeps three parallel representations in lockstep:
//!
//! - `chars`: the authoritative content, exactly as typed (no newline);
//! - `render`: `chars` with tabs expanded to 8-column stops, the form the
//!   screen and the search scan operate on;
//! - `highlight`: one tag per byte of `render`.
//!
//! All mutation goes through `chars`-level entry points that regenerate the
//! derived fields atomically, so `highlight.len() == render.len()` holds
//! after every mutation. The only exception is the transient search-match
//! overlay, which is applied over the baseline and restored from a snapshot
//! taken before the overlay.
//!
//! Columns are byte indices; the editor assumes single-byte ASCII-width
//! characters throughout.

/// Tab stops land on multiples of this column count.
pub const TAB_STOP: usize = 8;

/// Per-rendered-byte highlight class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Plain text, default foreground.
    Normal,
    /// Part of a numeric literal.
    Number,
    /// Part of the current search match (transient overlay).
    Match,
}

/// One logical line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    chars: String,
    render: String,
    highlight: Vec<Highlight>,
}

impl Row {
    /// Create a row from its logical content.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let mut row = Self {
            chars: text.into(),
            render: String::new(),
            highlight: Vec::new(),
        };
        row.update();
        row
    }

    /// The logical content.
    #[must_use]
    pub fn chars(&self) -> &str {
        &self.chars
    }

    /// The tab-expanded display form.
    #[must_use]
    pub fn render(&self) -> &str {
        &self.render
    }

    /// Highlight tags, one per byte of [`Row::render`].
    #[must_use]
    pub fn highlight(&self) -> &[Highlight] {
        &self.highlight
    }

    /// Length of the logical content in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the logical content is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Insert one character at `at`, clamped to `[0, len]`.
    pub fn insert_char(&mut self, at: usize, ch: char) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, ch);
        self.update();
    }

    /// Remove the character at `at`. No-op outside `[0, len)`.
    ///
    /// Returns `true` if a character was removed.
    pub fn delete_char(&mut self, at: usize) -> bool {
        if at >= self.chars.len() {
            return false;
        }
        self.chars.remove(at);
        self.update();
        true
    }

    /// Append text onto the end of the logical content.
    pub fn push_str(&mut self, text: &str) {
        self.chars.push_str(text);
        self.update();
    }

    /// Split at `at` (clamped): this row keeps `[..at]`, the returned row
    /// takes `[at..]`.
    pub fn split_off(&mut self, at: usize) -> Row {
        let at = at.min(self.chars.len());
        let tail = self.chars.split_off(at);
        self.update();
        Row::new(tail)
    }

    /// Translate a chars-column into a render-column (tab expansion).
    #[must_use]
    pub fn rx_of(&self, cx: usize) -> usize {
        let mut rx = 0;
        for b in self.chars.bytes().take(cx) {
            if b == b'\t' {
                rx += (TAB_STOP - 1) - (rx % TAB_STOP);
            }
            rx += 1;
        }
        rx
    }

    /// Translate a render-column back into a chars-column.
    ///
    /// Inverse of [`Row::rx_of`]: the first chars-column whose render-column
    /// reaches `rx`. Past-the-end values map to `len`.
    #[must_use]
    pub fn cx_of(&self, rx: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, b) in self.chars.bytes().enumerate() {
            if b == b'\t' {
                cur_rx += (TAB_STOP - 1) - (cur_rx % TAB_STOP);
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.chars.len()
    }

    /// Overlay the search-match tag over a byte range of the render form.
    ///
    /// The range is clamped; the baseline is untouched and can be restored
    /// from a snapshot taken before this call.
    pub fn mark_match(&mut self, start: usize, len: usize) {
        let end = start.saturating_add(len).min(self.highlight.len());
        let start = start.min(end);
        for tag in &mut self.highlight[start..end] {
            *tag = Highlight::Match;
        }
    }

    /// Copy the current highlight tags (taken before a match overlay).
    #[must_use]
    pub fn highlight_snapshot(&self) -> Vec<Highlight> {
        self.highlight.clone()
    }

    /// Restore highlight tags from a snapshot.
    ///
    /// A snapshot of the wrong length (the row changed since it was taken)
    /// is discarded in favor of the regenerated baseline.
    pub fn restore_highlight(&mut self, snapshot: Vec<Highlight>) {
        if snapshot.len() == self.render.len() {
            self.highlight = snapshot;
        } else {
            self.rebuild_highlight();
        }
    }

    /// Regenerate `render` and the baseline `highlight` from `chars`.
    fn update(&mut self) {
        self.render = String::with_capacity(self.chars.len());
        for ch in self.chars.chars() {
            if ch == '\t' {
                self.render.push(' ');
                while self.render.len() % TAB_STOP != 0 {
                    self.render.push(' ');
                }
            } else {
                self.render.push(ch);
            }
        }
        self.rebuild_highlight();
    }

    /// Single left-to-right pass tagging numeric literals.
    fn rebuild_highlight(&mut self) {
        self.highlight.clear();
        self.highlight.reserve(self.render.len());
        let mut prev_sep = true;
        for (i, b) in self.render.bytes().enumerate() {
            let prev = if i > 0 {
                self.highlight[i - 1]
            } else {
                Highlight::Normal
            };
            let tag = if b.is_ascii_digit() && (prev_sep || prev == Highlight::Number) {
                Highlight::Number
            } else if b == b'.' && prev == Highlight::Number {
                Highlight::Number
            } else {
                Highlight::Normal
            };
            self.highlight.push(tag);
            prev_sep = is_separator(b);
        }
    }
}

/// Separator for the numeric-literal pass: whitespace, NUL, or punctuation.
fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0 || b",.()+-/*=~%<>[];".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==========================================================
    // Tab expansion
    // ==========================================================

    #[test]
    fn plain_text_renders_verbatim() {
        let row = Row::new("hello");
        assert_eq!(row.render(), "hello");
        assert_eq!(row.highlight().len(), 5);
    }

    #[test]
    fn tab_expands_to_next_stop() {
        assert_eq!(Row::new("\t").render(), "        ");
        assert_eq!(Row::new("a\tb").render(), "a       b");
        assert_eq!(Row::new("1234567\tx").render(), "1234567 x");
        assert_eq!(Row::new("12345678\tx").render(), "12345678        x");
    }

    #[test]
    fn rx_of_accounts_for_tabs() {
        let row = Row::new("a\tb");
        assert_eq!(row.rx_of(0), 0);
        assert_eq!(row.rx_of(1), 1);
        assert_eq!(row.rx_of(2), 8);
        assert_eq!(row.rx_of(3), 9);
    }

    #[test]
    fn cx_of_inverts_rx_of() {
        let row = Row::new("a\tb\tc");
        for cx in 0..=row.len() {
            assert_eq!(row.cx_of(row.rx_of(cx)), cx, "cx={cx}");
        }
        // Columns inside a tab expansion map to the tab itself
        assert_eq!(row.cx_of(4), 1);
        // Past-the-end maps to len
        assert_eq!(row.cx_of(1000), row.len());
    }

    // ==========================================================
    // Mutation
    // ==========================================================

    #[test]
    fn insert_delete_inverse() {
        let mut row = Row::new("abc");
        row.insert_char(1, 'X');
        assert_eq!(row.chars(), "aXbc");
        row.delete_char(1);
        assert_eq!(row.chars(), "abc");
    }

    #[test]
    fn insert_out_of_range_clamps_to_append() {
        let mut row = Row::new("ab");
        row.insert_char(99, 'c');
        assert_eq!(row.chars(), "abc");
    }

    #[test]
    fn delete_out_of_range_is_noop() {
        let mut row = Row::new("ab");
        assert!(!row.delete_char(2));
        assert_eq!(row.chars(), "ab");
    }

    #[test]
    fn split_off_divides_content() {
        let mut row = Row::new("hello world");
        let tail = row.split_off(5);
        assert_eq!(row.chars(), "hello");
        assert_eq!(tail.chars(), " world");
    }

    // ==========================================================
    // Highlighting
    // ==========================================================

    fn tags(text: &str) -> Vec<Highlight> {
        Row::new(text).highlight().to_vec()
    }

    #[test]
    fn digits_after_separator_are_numbers() {
        use Highlight::{Normal, Number};
        assert_eq!(tags("12 a3"), vec![Number, Number, Normal, Normal, Normal]);
    }

    #[test]
    fn decimal_point_continues_number() {
        assert!(
            tags("3.14")
                .iter()
                .all(|&t| t == Highlight::Number)
        );
        // A bare dot is not a number
        assert_eq!(tags(".5")[0], Highlight::Normal);
    }

    #[test]
    fn digit_inside_identifier_is_normal() {
        assert!(tags("a1").iter().all(|&t| t == Highlight::Normal));
    }

    #[test]
    fn punctuation_separates_numbers() {
        let t = tags("x=42;");
        assert_eq!(t[2], Highlight::Number);
        assert_eq!(t[3], Highlight::Number);
        assert_eq!(t[4], Highlight::Normal);
    }

    #[test]
    fn match_overlay_and_restore() {
        let mut row = Row::new("hello world");
        let baseline = row.highlight_snapshot();
        row.mark_match(6, 5);
        assert!(
            row.highlight()[6..11]
                .iter()
                .all(|&t| t == Highlight::Match)
        );
        assert_eq!(row.highlight()[0], Highlight::Normal);
        row.restore_highlight(baseline.clone());
        assert_eq!(row.highlight(), &baseline[..]);
    }

    #[test]
    fn mark_match_clamps_range() {
        let mut row = Row::new("ab");
        row.mark_match(1, 100);
        assert_eq!(row.highlight()[0], Highlight::Normal);
        assert_eq!(row.highlight()[1], Highlight::Match);
    }

    #[test]
    fn stale_snapshot_falls_back_to_baseline() {
        let mut row = Row::new("ab");
        let old = row.highlight_snapshot();
        row.push_str("cd42");
        row.restore_highlight(old);
        assert_eq!(row.highlight().len(), row.render().len());
    }

    // ==========================================================
    // Properties
    // ==========================================================

    proptest! {
        #[test]
        fn render_at_least_as_long_as_chars(s in "[ -~\t]{0,80}") {
            let row = Row::new(s.as_str());
            prop_assert!(row.render().len() >= row.chars().len());
        }

        #[test]
        fn post_tab_columns_land_on_stops(s in "[ -~\t]{0,80}") {
            let row = Row::new(s.as_str());
            for (cx, b) in row.chars().bytes().enumerate() {
                if b == b'\t' {
                    // The character after a tab starts on a multiple of 8
                    prop_assert_eq!(row.rx_of(cx + 1) % TAB_STOP, 0);
                }
            }
        }

        #[test]
        fn highlight_matches_render_after_mutation(
            s in "[ -~\t]{0,40}",
            at in 0usize..64,
            ch in proptest::char::range(' ', '~'),
        ) {
            let mut row = Row::new(s.as_str());
            row.insert_char(at, ch);
            prop_assert_eq!(row.highlight().len(), row.render().len());
            row.delete_char(at.min(row.len().saturating_sub(1)));
            prop_assert_eq!(row.highlight().len(), row.render().len());
        }

        #[test]
        fn cx_of_is_left_inverse(s in "[ -~\t]{0,40}", cx in 0usize..48) {
            let row = Row::new(s.as_str());
            let cx = cx.min(row.len());
            prop_assert_eq!(row.cx_of(row.rx_of(cx)), cx);
        }
    }
}
