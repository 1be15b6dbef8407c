//! Generic scrollable list widget.

use crate::hitmap::{HitMap, HitPayload, KIND_ITEM};
use crate::scroll::ScrollState;

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    scroll: ScrollState,
}

impl<T> ScrollableList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            scroll: ScrollState::new(1),
        }
    }

    /// Replace the items (a refresh).  The cursor keeps its position unless
    /// the list got shorter.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.scroll.set_len(self.items.len());
    }

    /// Viewport height changed.
    pub fn resize(&mut self, rows: usize) {
        self.scroll.resize(rows);
    }

    pub fn select_up(&mut self, n: usize) {
        self.scroll.move_cursor(-(n as isize));
    }

    pub fn select_down(&mut self, n: usize) {
        self.scroll.move_cursor(n as isize);
    }

    pub fn select_first(&mut self) {
        self.scroll.first();
    }

    pub fn select_last(&mut self) {
        self.scroll.last();
    }

    pub fn page_down(&mut self) {
        self.scroll.page_down();
    }

    pub fn page_up(&mut self) {
        self.scroll.page_up();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll.scroll_by(delta);
    }

    pub fn selected(&self) -> usize {
        self.scroll.cursor
    }

    pub fn select(&mut self, pos: usize) {
        self.scroll.set_cursor(pos);
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.scroll.cursor)
    }

    /// `(position, item)` for every row currently in view.
    pub fn visible_items(&self) -> Vec<(usize, &T)> {
        self.scroll
            .visible_range()
            .filter_map(|pos| Some((pos, self.items.get(pos)?)))
            .collect()
    }

    /// Handle a click at `row` within the rendered area.
    /// Returns true if the row holds an item.
    pub fn handle_click(&mut self, row: usize) -> bool {
        self.scroll.click_row(row).is_some()
    }

    /// Register one item region per visible row, payload = item position.
    pub fn register_hits(&self, hits: &mut HitMap, x: u16, y: u16, width: u16) {
        for (row, (pos, _)) in self.visible_items().into_iter().enumerate() {
            let row_y = y.saturating_add(u16::try_from(row).unwrap_or(u16::MAX));
            hits.add_rect(KIND_ITEM, x, row_y, width, 1, HitPayload::Index(pos));
        }
    }

    pub fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for ScrollableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize) -> ScrollableList<String> {
        let mut l = ScrollableList::new();
        l.set_items((0..n).map(|i| format!("item-{i}")).collect());
        l
    }

    #[test]
    fn test_refresh_keeps_selection() {
        let mut l = list(30);
        l.resize(5);
        l.select(12);
        l.set_items((0..20).map(|i| format!("fresh-{i}")).collect());
        assert_eq!(l.selected(), 12);
        assert_eq!(l.selected_item().map(String::as_str), Some("fresh-12"));
        assert_eq!(l.len(), 20);
    }

    #[test]
    fn test_visible_items_follow_cursor() {
        let mut l = list(20);
        l.resize(4);
        l.select_down(10);
        let visible: Vec<usize> = l.visible_items().into_iter().map(|(p, _)| p).collect();
        assert_eq!(visible, vec![7, 8, 9, 10]);
        assert_eq!(l.scroll_state().offset, 7);
    }

    #[test]
    fn test_click_rows_and_hits() {
        let mut l = list(3);
        l.resize(5);
        assert!(l.handle_click(2));
        assert_eq!(l.selected(), 2);
        assert!(!l.handle_click(3));

        let mut hits = HitMap::new();
        l.register_hits(&mut hits, 1, 2, 20);
        assert_eq!(hits.lookup(KIND_ITEM, 5, 3), Some(&HitPayload::Index(1)));
        assert_eq!(hits.lookup(KIND_ITEM, 5, 5), None);
    }

    #[test]
    fn test_refresh_shorter_list() {
        let mut l = list(10);
        l.select_last();
        l.set_items(vec!["only".into()]);
        assert_eq!(l.selected(), 0);
        l.set_items(Vec::new());
        assert!(l.selected_item().is_none());
    }
}
