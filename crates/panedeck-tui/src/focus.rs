//! Keyboard focus cycling and pointer (focus/hover) ids.
//!
//! [`FocusRing`] holds the focusable panes of a view and the focused one.  [`PointerState`] tracks the
//! focused and hovered element ids inside one modal; both ids are plain
//! strings matching [`crate::modal::Focusable::id`].

pub struct FocusRing<T> {
    items: Vec<T>,
    current: usize,
}

impl<T: Copy + PartialEq> FocusRing<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<T> {
        self.items.get(self.current).copied()
    }

    pub fn set(&mut self, id: T) {
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.current = pos;
        }
    }

    pub fn is_focused(&self, id: T) -> bool {
        self.current().map_or(false, |c| c == id)
    }

    /// Replace the ring contents (e.g. sidebar hidden).
    /// Keeps the same focused item if it survives.
    pub fn set_items(&mut self, items: Vec<T>) {
        let old = self.current();
        self.items = items;
        if let Some(id) = old {
            if let Some(pos) = self.items.iter().position(|&x| x == id) {
                self.current = pos;
                return;
            }
        }
        self.current = 0;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Copy + PartialEq> Default for FocusRing<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Focused and hovered element of one interactive surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerState {
    focused: Option<String>,
    hovered: Option<String>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.focused.as_deref() == Some(id)
    }

    pub fn is_hovered(&self, id: &str) -> bool {
        self.hovered.as_deref() == Some(id)
    }

    /// Returns true when the focus changed.
    pub fn focus(&mut self, id: &str) -> bool {
        if self.is_focused(id) {
            return false;
        }
        self.focused = Some(id.to_string());
        true
    }

    /// Returns true when the hover changed.
    pub fn hover(&mut self, id: Option<&str>) -> bool {
        if self.hovered.as_deref() == id {
            return false;
        }
        self.hovered = id.map(str::to_string);
        true
    }

    /// Move focus `step` places through `order`, wrapping.  With nothing
    /// focused the first (or last, going backwards) id wins.
    pub fn cycle(&mut self, order: &[String], step: isize) -> bool {
        if order.is_empty() {
            return false;
        }
        let len = order.len() as isize;
        let next = match self
            .focused
            .as_deref()
            .and_then(|f| order.iter().position(|id| id == f))
        {
            Some(pos) => (pos as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        self.focus(&order[next as usize])
    }

    pub fn reset(&mut self) {
        self.focused = None;
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Pane {
        Sidebar,
        Detail,
        Footer,
    }

    #[test]
    fn test_ring_set_and_focus() {
        let mut ring = FocusRing::new(vec![Pane::Sidebar, Pane::Detail, Pane::Footer]);
        assert_eq!(ring.current(), Some(Pane::Sidebar));
        ring.set(Pane::Footer);
        assert!(ring.is_focused(Pane::Footer));
        // Unknown ids leave focus alone.
        let mut short = FocusRing::new(vec![Pane::Sidebar]);
        short.set(Pane::Detail);
        assert_eq!(short.current(), Some(Pane::Sidebar));
    }

    #[test]
    fn test_set_items_keeps_survivor() {
        let mut ring = FocusRing::new(vec![Pane::Sidebar, Pane::Detail]);
        ring.set(Pane::Detail);
        ring.set_items(vec![Pane::Detail]);
        assert_eq!(ring.current(), Some(Pane::Detail));
        ring.set_items(vec![Pane::Sidebar, Pane::Footer]);
        assert_eq!(ring.current(), Some(Pane::Sidebar));
    }

    #[test]
    fn test_empty_ring() {
        let mut ring: FocusRing<Pane> = FocusRing::default();
        assert_eq!(ring.current(), None);
    }

    #[test]
    fn test_pointer_focus_and_hover() {
        let mut p = PointerState::new();
        assert!(p.focus("open"));
        assert!(!p.focus("open"));
        assert!(p.hover(Some("cancel")));
        assert!(!p.hover(Some("cancel")));
        assert!(p.is_hovered("cancel"));
        assert!(p.hover(None));
        assert_eq!(p.hovered(), None);
        p.reset();
        assert_eq!(p.focused(), None);
    }

    #[test]
    fn test_pointer_cycle_wraps() {
        let order: Vec<String> = ["input", "open", "cancel"].map(String::from).to_vec();
        let mut p = PointerState::new();
        p.cycle(&order, 1);
        assert_eq!(p.focused(), Some("input"));
        p.cycle(&order, 1);
        p.cycle(&order, 1);
        assert_eq!(p.focused(), Some("cancel"));
        p.cycle(&order, 1);
        assert_eq!(p.focused(), Some("input"));
        p.cycle(&order, -1);
        assert_eq!(p.focused(), Some("cancel"));

        let mut fresh = PointerState::new();
        fresh.cycle(&order, -1);
        assert_eq!(fresh.focused(), Some("cancel"));
        assert!(!fresh.cycle(&[], 1));
    }
}
