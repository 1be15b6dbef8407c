//! Cursor + scroll-offset bookkeeping for one scrollable list.
//!
//! Invariant after every public mutation: when the list is non-empty,
//! `offset <= cursor < offset + visible_rows` and
//! `offset <= max(0, len - visible_rows)`.

use std::ops::Range;

/// Scroll offset that keeps `cursor` on screen.
pub fn ensure_visible(cursor: usize, offset: usize, visible_rows: usize, len: usize) -> usize {
    let rows = visible_rows.max(1);
    let mut offset = offset;
    if cursor < offset {
        offset = cursor;
    } else if cursor >= offset + rows {
        offset = cursor + 1 - rows;
    }
    offset.min(len.saturating_sub(rows))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub cursor: usize,
    pub offset: usize,
    pub visible_rows: usize,
    pub len: usize,
}

impl ScrollState {
    pub fn new(visible_rows: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            visible_rows: visible_rows.max(1),
            len: 0,
        }
    }

    fn settle(&mut self) {
        if self.len == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        self.cursor = self.cursor.min(self.len - 1);
        self.offset = ensure_visible(self.cursor, self.offset, self.visible_rows, self.len);
    }

    /// New list length (e.g. after a refresh).  Keeps the cursor where it was
    /// unless the list shrank underneath it.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.settle();
    }

    /// Viewport height changed.  The cursor is never reset.
    pub fn resize(&mut self, visible_rows: usize) {
        self.visible_rows = visible_rows.max(1);
        self.settle();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let target = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta as usize)
        };
        self.cursor = target.min(self.len - 1);
        self.settle();
    }

    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index;
        self.settle();
    }

    pub fn first(&mut self) {
        self.set_cursor(0);
    }

    pub fn last(&mut self) {
        self.set_cursor(self.len.saturating_sub(1));
    }

    pub fn page_down(&mut self) {
        self.move_cursor(self.visible_rows as isize);
    }

    pub fn page_up(&mut self) {
        self.move_cursor(-(self.visible_rows as isize));
    }

    /// Move the viewport without touching the cursor beyond what is needed to
    /// keep it visible (mouse wheel).
    pub fn scroll_by(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let max_offset = self.len.saturating_sub(self.visible_rows);
        let offset = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta as usize)
        };
        self.offset = offset.min(max_offset);
        let last_visible = self.offset + self.visible_rows - 1;
        self.cursor = self.cursor.clamp(self.offset, last_visible.min(self.len - 1));
    }

    /// Select the item drawn on `row` of the viewport.  Returns the index
    /// when the row holds an item.
    pub fn click_row(&mut self, row: usize) -> Option<usize> {
        let target = self.offset + row;
        if row < self.visible_rows && target < self.len {
            self.set_cursor(target);
            Some(target)
        } else {
            None
        }
    }

    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.visible_rows).min(self.len);
        self.offset.min(end)..end
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list(len: usize, rows: usize) -> ScrollState {
        let mut s = ScrollState::new(rows);
        s.set_len(len);
        s
    }

    #[test]
    fn test_cursor_to_ten_scrolls_to_seven() {
        let mut s = list(20, 4);
        s.move_cursor(10);
        assert_eq!(s.cursor, 10);
        assert_eq!(s.offset, 7);
    }

    #[test]
    fn test_ensure_visible_free_function() {
        assert_eq!(ensure_visible(10, 0, 4, 20), 7);
        assert_eq!(ensure_visible(2, 7, 4, 20), 2);
        assert_eq!(ensure_visible(5, 3, 4, 20), 3);
        // Short list: offset floors at zero.
        assert_eq!(ensure_visible(2, 5, 10, 3), 0);
        assert_eq!(ensure_visible(0, 0, 0, 0), 0);
    }

    #[test]
    fn test_move_clamps_to_bounds() {
        let mut s = list(5, 3);
        s.move_cursor(-3);
        assert_eq!(s.cursor, 0);
        s.move_cursor(100);
        assert_eq!(s.cursor, 4);
        assert_eq!(s.offset, 2);
    }

    #[test]
    fn test_resize_keeps_cursor() {
        let mut s = list(20, 4);
        s.set_cursor(10);
        s.resize(10);
        assert_eq!(s.cursor, 10);
        assert_eq!(s.offset, 7);
        s.resize(2);
        assert_eq!(s.cursor, 10);
        assert_eq!(s.offset, 9);
        s.resize(0);
        assert_eq!(s.visible_rows, 1);
        assert_eq!(s.offset, 10);
    }

    #[test]
    fn test_shrinking_list_pulls_cursor_in() {
        let mut s = list(20, 4);
        s.last();
        s.set_len(3);
        assert_eq!(s.cursor, 2);
        assert_eq!(s.offset, 0);
        s.set_len(0);
        assert_eq!((s.cursor, s.offset), (0, 0));
        s.move_cursor(1);
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn test_click_row() {
        let mut s = list(10, 4);
        s.set_cursor(6);
        assert_eq!(s.offset, 3);
        assert_eq!(s.click_row(1), Some(4));
        assert_eq!(s.cursor, 4);
        assert_eq!(s.click_row(4), None);
        let mut short = list(2, 4);
        assert_eq!(short.click_row(3), None);
    }

    #[test]
    fn test_scroll_by_drags_cursor_along() {
        let mut s = list(20, 4);
        s.scroll_by(5);
        assert_eq!(s.offset, 5);
        assert_eq!(s.cursor, 5);
        s.scroll_by(100);
        assert_eq!(s.offset, 16);
        s.scroll_by(-100);
        assert_eq!(s.offset, 0);
        assert_eq!(s.cursor, 3);
    }

    #[test]
    fn test_visible_range() {
        let mut s = list(10, 4);
        assert_eq!(s.visible_range(), 0..4);
        s.last();
        assert_eq!(s.visible_range(), 6..10);
        assert_eq!(list(0, 4).visible_range(), 0..0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Move(isize),
        Resize(usize),
        SetLen(usize),
        Page(bool),
        Wheel(isize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-30isize..30).prop_map(Op::Move),
            (0usize..40).prop_map(Op::Resize),
            (0usize..60).prop_map(Op::SetLen),
            any::<bool>().prop_map(Op::Page),
            (-10isize..10).prop_map(Op::Wheel),
        ]
    }

    proptest! {
        #[test]
        fn prop_cursor_always_in_window(
            len in 0usize..60,
            rows in 1usize..30,
            ops in proptest::collection::vec(op(), 0..40),
        ) {
            let mut s = list(len, rows);
            for op in ops {
                match op {
                    Op::Move(d) => s.move_cursor(d),
                    Op::Resize(r) => s.resize(r),
                    Op::SetLen(l) => s.set_len(l),
                    Op::Page(down) => if down { s.page_down() } else { s.page_up() },
                    Op::Wheel(d) => s.scroll_by(d),
                }
                let max_offset = s.len.saturating_sub(s.visible_rows);
                prop_assert!(s.offset <= max_offset);
                if s.len > 0 {
                    prop_assert!(s.cursor < s.len);
                    prop_assert!(s.offset <= s.cursor);
                    prop_assert!(s.cursor < s.offset + s.visible_rows);
                }
            }
        }
    }
}
