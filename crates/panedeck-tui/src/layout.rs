//! Width/height split between sibling panes.
//!
//! Rules, applied on every resize and every sidebar toggle:
//!
//! 1. Border and gap columns are reserved first.
//! 2. The rest is shared by weight (floor), the last visible pane taking the
//!    rounding remainder.
//! 3. A pane below its minimum is raised to it; the columns come out of the
//!    other panes, heaviest first, never pushing one below its own minimum.
//! 4. When even the minimums do not fit, panes are filled from the last
//!    declared one backwards, so the detail pane keeps its width longest.
//!
//! Hidden panes get a zero-width area and no gap.

use panedeck_proto::config::UiConfig;
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneSpec {
    pub name: &'static str,
    /// Content width, borders excluded.
    pub min_width: u16,
    pub weight: u16,
    pub visible: bool,
}

impl PaneSpec {
    pub fn new(name: &'static str, min_width: u16, weight: u16) -> Self {
        Self {
            name,
            min_width,
            weight,
            visible: true,
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Columns eaten by chrome: `border` on each side of every pane and `gap`
/// between neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSpec {
    pub border: u16,
    pub gap: u16,
}

impl Default for SplitSpec {
    fn default() -> Self {
        Self { border: 1, gap: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub name: &'static str,
    /// Outer area, borders included.
    pub area: Rect,
}

impl PaneLayout {
    pub fn is_visible(&self) -> bool {
        self.area.width > 0
    }

    /// Content area inside the border.
    pub fn inner(&self, border: u16) -> Rect {
        let a = self.area;
        Rect {
            x: a.x.saturating_add(border),
            y: a.y.saturating_add(border),
            width: a.width.saturating_sub(border * 2),
            height: a.height.saturating_sub(border * 2),
        }
    }
}

/// Split `area` left to right.  One [`PaneLayout`] per spec, in order.
pub fn split_horizontal(area: Rect, panes: &[PaneSpec], split: SplitSpec) -> Vec<PaneLayout> {
    let visible: Vec<&PaneSpec> = panes.iter().filter(|p| p.visible).collect();
    let n = visible.len() as u32;
    let reserved = if n == 0 {
        0
    } else {
        n * 2 * u32::from(split.border) + (n - 1) * u32::from(split.gap)
    };
    let available = u32::from(area.width).saturating_sub(reserved);
    let mut widths = allocate(available, &visible).into_iter();

    let mut out = Vec::with_capacity(panes.len());
    let mut x = area.x;
    let mut placed = 0;
    for spec in panes {
        if !spec.visible {
            out.push(PaneLayout {
                name: spec.name,
                area: Rect {
                    x,
                    y: area.y,
                    width: 0,
                    height: area.height,
                },
            });
            continue;
        }
        if placed > 0 {
            x = x.saturating_add(split.gap);
        }
        let inner = widths.next().unwrap_or(0);
        let width = clamp_u16(inner + 2 * u32::from(split.border));
        out.push(PaneLayout {
            name: spec.name,
            area: Rect {
                x,
                y: area.y,
                width,
                height: area.height,
            },
        });
        x = x.saturating_add(width);
        placed += 1;
    }
    out
}

fn allocate(available: u32, panes: &[&PaneSpec]) -> Vec<u32> {
    if panes.is_empty() {
        return Vec::new();
    }
    let mins: Vec<u32> = panes.iter().map(|p| u32::from(p.min_width)).collect();

    if mins.iter().sum::<u32>() > available {
        // Not even the minimums fit: fill from the back.
        let mut left = available;
        let mut widths = vec![0; panes.len()];
        for i in (0..panes.len()).rev() {
            let take = mins[i].min(left);
            widths[i] = take;
            left -= take;
        }
        return widths;
    }

    let total_weight: u32 = panes.iter().map(|p| u32::from(p.weight)).sum();
    let mut widths: Vec<u32> = panes
        .iter()
        .map(|p| {
            if total_weight == 0 {
                available / panes.len() as u32
            } else {
                available * u32::from(p.weight) / total_weight
            }
        })
        .collect();
    let assigned: u32 = widths.iter().sum();
    if let Some(last) = widths.last_mut() {
        *last += available - assigned;
    }

    let mut deficit = 0;
    for (w, &min) in widths.iter_mut().zip(&mins) {
        if *w < min {
            deficit += min - *w;
            *w = min;
        }
    }

    let mut donors: Vec<usize> = (0..panes.len()).collect();
    donors.sort_by(|&a, &b| panes[b].weight.cmp(&panes[a].weight));
    for i in donors {
        if deficit == 0 {
            break;
        }
        let spare = widths[i] - mins[i];
        let give = spare.min(deficit);
        widths[i] -= give;
        deficit -= give;
    }
    widths
}

fn clamp_u16(n: u32) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Fixed-height header above a body that takes the rest (at least one row).
pub fn split_vertical(area: Rect, header_height: u16) -> (Rect, Rect) {
    let header_h = header_height.min(area.height);
    let header = Rect {
        height: header_h,
        ..area
    };
    let body = Rect {
        y: area.y.saturating_add(header_h),
        height: area.height.saturating_sub(header_h).max(1),
        ..area
    };
    (header, body)
}

/// Sidebar + detail split used by the two-pane views.
pub fn sidebar_detail(area: Rect, ui: &UiConfig, sidebar_visible: bool) -> (PaneLayout, PaneLayout) {
    let percent = ui.sidebar_percent.min(100);
    let specs = [
        PaneSpec::new("sidebar", ui.sidebar_min_width, percent).visible(sidebar_visible),
        PaneSpec::new("detail", ui.detail_min_width, 100 - percent),
    ];
    let panes = split_horizontal(area, &specs, SplitSpec::default());
    (panes[0], panes[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn area(width: u16, height: u16) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    fn widths(panes: &[PaneLayout]) -> Vec<u16> {
        panes.iter().map(|p| p.area.width).collect()
    }

    #[test]
    fn test_proportional_split() {
        let specs = [PaneSpec::new("a", 10, 30), PaneSpec::new("b", 10, 70)];
        let panes = split_horizontal(area(105, 20), &specs, SplitSpec::default());
        // 105 - 4 borders - 1 gap = 100 inner columns.
        assert_eq!(widths(&panes), vec![32, 72]);
        assert_eq!(panes[1].area.x, 33);
        assert_eq!(panes[1].inner(1).width, 70);
    }

    #[test]
    fn test_minimum_raised_and_taken_from_heaviest() {
        let specs = [PaneSpec::new("sidebar", 25, 30), PaneSpec::new("detail", 40, 70)];
        let panes = split_horizontal(area(75, 10), &specs, SplitSpec::default());
        // 70 inner: 21 / 49, sidebar raised to 25, detail gives 4.
        assert_eq!(widths(&panes), vec![27, 47]);
    }

    #[test]
    fn test_insufficient_width_favours_last_pane() {
        let specs = [PaneSpec::new("sidebar", 25, 30), PaneSpec::new("detail", 40, 70)];
        let panes = split_horizontal(area(50, 10), &specs, SplitSpec::default());
        // 45 inner: detail keeps 40, sidebar gets 5.
        assert_eq!(widths(&panes), vec![7, 42]);
    }

    #[test]
    fn test_hidden_pane_gets_nothing() {
        let specs = [
            PaneSpec::new("sidebar", 25, 30).visible(false),
            PaneSpec::new("detail", 40, 70),
        ];
        let panes = split_horizontal(area(80, 10), &specs, SplitSpec::default());
        assert!(!panes[0].is_visible());
        assert_eq!(panes[1].area, area(80, 10));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let specs = [PaneSpec::new("a", 25, 1), PaneSpec::new("b", 40, 1)];
        let panes = split_horizontal(area(3, 1), &specs, SplitSpec::default());
        assert_eq!(panes.len(), 2);
        assert!(split_horizontal(area(10, 1), &[], SplitSpec::default()).is_empty());
    }

    #[test]
    fn test_split_vertical() {
        let (head, body) = split_vertical(area(40, 10), 2);
        assert_eq!((head.height, body.y, body.height), (2, 2, 8));
        let (head, body) = split_vertical(area(40, 2), 2);
        assert_eq!((head.height, body.height), (2, 1));
    }

    #[test]
    fn test_sidebar_detail_from_config() {
        let ui = UiConfig::default();
        let (side, detail) = sidebar_detail(area(120, 30), &ui, true);
        assert_eq!(side.area.width + 1 + detail.area.width, 120);
        assert!(side.inner(1).width >= ui.sidebar_min_width);
        assert!(detail.inner(1).width >= ui.detail_min_width);
    }

    proptest! {
        #[test]
        fn prop_widths_fill_total(
            specs in proptest::collection::vec((0u16..30, 0u16..10, any::<bool>()), 1..5),
            extra in 0u16..200,
            border in 0u16..2,
            gap in 0u16..2,
        ) {
            let panes: Vec<PaneSpec> = specs
                .iter()
                .map(|&(min, weight, visible)| PaneSpec::new("p", min, weight).visible(visible))
                .collect();
            let visible: Vec<&PaneSpec> = panes.iter().filter(|p| p.visible).collect();
            let n = visible.len() as u16;
            let chrome = n * 2 * border + n.saturating_sub(1) * gap;
            let mins: u16 = visible.iter().map(|p| p.min_width).sum();
            let total = mins + chrome + extra;

            let split = SplitSpec { border, gap };
            let out = split_horizontal(area(total, 5), &panes, split);
            let sum: u16 = out.iter().map(|p| p.area.width).sum();
            if n > 0 {
                prop_assert_eq!(sum + n.saturating_sub(1) * gap, total);
            }
            for (layout, spec) in out.iter().zip(&panes) {
                if spec.visible {
                    prop_assert!(layout.inner(border).width >= spec.min_width);
                } else {
                    prop_assert_eq!(layout.area.width, 0);
                }
            }
        }
    }
}
