#![forbid(unsafe_code)]

//! Viewport controller: which row/column window of the document is visible.

/// Top-left corner of the visible window, in row-index / render-column
/// units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row index.
    pub row_off: usize,
    /// First visible render-column.
    pub col_off: usize,
}

impl Viewport {
    /// Adjust the offsets so the cursor at `(row, rcol)` is inside a
    /// `text_rows` x `text_cols` window.
    ///
    /// Postcondition: `row ∈ [row_off, row_off + text_rows)` and
    /// `rcol ∈ [col_off, col_off + text_cols)`.
    pub fn scroll_into_view(
        &mut self,
        row: usize,
        rcol: usize,
        text_rows: usize,
        text_cols: usize,
    ) {
        if row < self.row_off {
            self.row_off = row;
        }
        if row >= self.row_off + text_rows {
            self.row_off = row + 1 - text_rows;
        }
        if rcol < self.col_off {
            self.col_off = rcol;
        }
        if rcol >= self.col_off + text_cols {
            self.col_off = rcol + 1 - text_cols;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cursor_above_scrolls_up() {
        let mut vp = Viewport {
            row_off: 10,
            col_off: 0,
        };
        vp.scroll_into_view(3, 0, 20, 80);
        assert_eq!(vp.row_off, 3);
    }

    #[test]
    fn cursor_below_scrolls_down() {
        let mut vp = Viewport::default();
        vp.scroll_into_view(25, 0, 20, 80);
        assert_eq!(vp.row_off, 6);
    }

    #[test]
    fn cursor_right_scrolls_horizontally() {
        let mut vp = Viewport::default();
        vp.scroll_into_view(0, 100, 20, 80);
        assert_eq!(vp.col_off, 21);
    }

    #[test]
    fn in_view_cursor_leaves_offsets_alone() {
        let mut vp = Viewport {
            row_off: 5,
            col_off: 5,
        };
        vp.scroll_into_view(10, 10, 20, 80);
        assert_eq!(
            vp,
            Viewport {
                row_off: 5,
                col_off: 5
            }
        );
    }

    proptest! {
        #[test]
        fn cursor_always_lands_in_window(
            row in 0usize..10_000,
            rcol in 0usize..10_000,
            off_r in 0usize..10_000,
            off_c in 0usize..10_000,
            rows in 1usize..200,
            cols in 1usize..500,
        ) {
            let mut vp = Viewport { row_off: off_r, col_off: off_c };
            vp.scroll_into_view(row, rcol, rows, cols);
            prop_assert!(vp.row_off <= row && row < vp.row_off + rows);
            prop_assert!(vp.col_off <= rcol && rcol < vp.col_off + cols);
        }
    }
}
