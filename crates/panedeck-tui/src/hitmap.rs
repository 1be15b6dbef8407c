//! Per-frame registry of clickable screen rectangles.
//!
//! The map is cleared at the start of every render and refilled by whoever
//! draws; the mouse event that follows is resolved against it.  Regions may
//! overlap: the one registered last wins.  Modals call [`HitMap::raise`]
//! before registering so that, while they are open, lookups can be limited
//! to the top layer.

use std::collections::HashMap;

use ratatui::layout::{Position, Rect};

pub const KIND_ITEM: &str = "item";
pub const KIND_BUTTON: &str = "button";
pub const KIND_MODAL: &str = "modal";
pub const KIND_PANE: &str = "pane";
pub const KIND_TAB: &str = "tab";

/// What a region points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitPayload {
    Index(usize),
    Id(String),
}

impl HitPayload {
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Id(_) => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(s) => Some(s),
            Self::Index(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRegion {
    pub kind: String,
    pub area: Rect,
    pub payload: HitPayload,
    pub layer: u16,
    seq: u64,
}

impl HitRegion {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.area.contains(Position { x, y })
    }
}

#[derive(Debug, Default)]
pub struct HitMap {
    regions: HashMap<String, Vec<HitRegion>>,
    bounds: Option<Rect>,
    layer: u16,
    next_seq: u64,
}

impl HitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every region.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.bounds = None;
        self.layer = 0;
        self.next_seq = 0;
    }

    /// Clear and record the frame size; lookups outside it always miss.
    pub fn begin_frame(&mut self, width: u16, height: u16) {
        self.clear();
        self.bounds = Some(Rect {
            x: 0,
            y: 0,
            width,
            height,
        });
    }

    /// Start a new layer on top of everything registered so far.
    pub fn raise(&mut self) -> u16 {
        self.layer = self.layer.saturating_add(1);
        self.layer
    }

    pub fn add_rect(&mut self, kind: &str, x: u16, y: u16, w: u16, h: u16, payload: HitPayload) {
        self.add(
            kind,
            Rect {
                x,
                y,
                width: w,
                height: h,
            },
            payload,
        );
    }

    pub fn add(&mut self, kind: &str, area: Rect, payload: HitPayload) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.regions
            .entry(kind.to_string())
            .or_default()
            .push(HitRegion {
                kind: kind.to_string(),
                area,
                payload,
                layer: self.layer,
                seq,
            });
    }

    fn in_bounds(&self, x: u16, y: u16) -> bool {
        self.bounds
            .map_or(true, |b| b.contains(Position { x, y }))
    }

    /// Last-registered region of `kind` containing `(x, y)`.
    pub fn lookup(&self, kind: &str, x: u16, y: u16) -> Option<&HitPayload> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.regions
            .get(kind)?
            .iter()
            .rev()
            .find(|r| r.contains(x, y))
            .map(|r| &r.payload)
    }

    /// Last-registered region of any kind containing `(x, y)`.
    pub fn topmost(&self, x: u16, y: u16) -> Option<&HitRegion> {
        self.topmost_from(0, x, y)
    }

    /// Like [`topmost`](Self::topmost) but only considers the current top layer.
    pub fn topmost_in_top_layer(&self, x: u16, y: u16) -> Option<&HitRegion> {
        self.topmost_from(self.layer, x, y)
    }

    fn topmost_from(&self, min_layer: u16, x: u16, y: u16) -> Option<&HitRegion> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.regions
            .values()
            .flat_map(|v| v.iter())
            .filter(|r| r.layer >= min_layer && r.contains(x, y))
            .max_by_key(|r| r.seq)
    }

    pub fn regions(&self, kind: &str) -> &[HitRegion] {
        self.regions.get(kind).map_or(&[], |v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_scenario() {
        let mut hits = HitMap::new();
        hits.add_rect(KIND_ITEM, 5, 5, 10, 2, HitPayload::Index(3));
        assert_eq!(hits.lookup(KIND_ITEM, 6, 6), Some(&HitPayload::Index(3)));
        assert_eq!(hits.lookup(KIND_ITEM, 20, 20), None);
        assert_eq!(hits.lookup(KIND_BUTTON, 6, 6), None);
    }

    #[test]
    fn test_edges_are_half_open() {
        let mut hits = HitMap::new();
        hits.add_rect(KIND_ITEM, 5, 5, 10, 2, HitPayload::Index(0));
        assert!(hits.lookup(KIND_ITEM, 5, 5).is_some());
        assert!(hits.lookup(KIND_ITEM, 14, 6).is_some());
        assert!(hits.lookup(KIND_ITEM, 15, 6).is_none());
        assert!(hits.lookup(KIND_ITEM, 14, 7).is_none());
    }

    #[test]
    fn test_last_registered_wins() {
        let mut hits = HitMap::new();
        hits.add_rect(KIND_ITEM, 0, 0, 10, 10, HitPayload::Index(1));
        hits.add_rect(KIND_ITEM, 2, 2, 3, 3, HitPayload::Index(2));
        assert_eq!(hits.lookup(KIND_ITEM, 3, 3), Some(&HitPayload::Index(2)));
        assert_eq!(hits.lookup(KIND_ITEM, 8, 8), Some(&HitPayload::Index(1)));
    }

    #[test]
    fn test_topmost_across_kinds() {
        let mut hits = HitMap::new();
        hits.add_rect(KIND_PANE, 0, 0, 80, 24, HitPayload::Id("list".into()));
        hits.add_rect(KIND_ITEM, 1, 1, 20, 1, HitPayload::Index(0));
        let top = hits.topmost(5, 1).unwrap();
        assert_eq!(top.kind, KIND_ITEM);
        assert_eq!(hits.topmost(5, 10).unwrap().kind, KIND_PANE);
    }

    #[test]
    fn test_top_layer_hides_background() {
        let mut hits = HitMap::new();
        hits.add_rect(KIND_ITEM, 0, 0, 80, 24, HitPayload::Index(9));
        hits.raise();
        hits.add_rect(KIND_MODAL, 20, 5, 40, 10, HitPayload::Id("modal".into()));
        assert!(hits.topmost_in_top_layer(1, 1).is_none());
        assert_eq!(hits.topmost(1, 1).unwrap().kind, KIND_ITEM);
        assert_eq!(hits.topmost_in_top_layer(25, 6).unwrap().kind, KIND_MODAL);
    }

    #[test]
    fn test_clear_misses_everywhere() {
        let mut hits = HitMap::new();
        hits.add_rect(KIND_ITEM, 0, 0, 10, 10, HitPayload::Index(0));
        hits.add_rect(KIND_BUTTON, 0, 0, 10, 10, HitPayload::Id("ok".into()));
        hits.clear();
        assert!(hits.is_empty());
        for x in 0..12 {
            for y in 0..12 {
                assert!(hits.lookup(KIND_ITEM, x, y).is_none());
                assert!(hits.lookup(KIND_BUTTON, x, y).is_none());
                assert!(hits.topmost(x, y).is_none());
            }
        }
    }

    #[test]
    fn test_stale_coordinates_miss_after_resize() {
        let mut hits = HitMap::new();
        hits.begin_frame(40, 10);
        hits.add_rect(KIND_ITEM, 0, 0, 100, 100, HitPayload::Index(0));
        assert!(hits.lookup(KIND_ITEM, 39, 9).is_some());
        assert!(hits.lookup(KIND_ITEM, 50, 20).is_none());
    }

    #[test]
    fn test_empty_rects_are_ignored() {
        let mut hits = HitMap::new();
        hits.add_rect(KIND_ITEM, 0, 0, 0, 5, HitPayload::Index(0));
        assert!(hits.is_empty());
    }
}
