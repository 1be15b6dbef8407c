//! WorkspaceManager: active view, per-view sidebar visibility and pane focus.
//!
//! Tracks:
//! - Which top-level view is active
//! - Whether each view shows its sidebar
//! - The FocusRing over the panes that are currently visible
//! - Help overlay and keys bar toggles

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::{PaneId, ViewId};
use crate::focus::FocusRing;

pub struct WorkspaceManager {
    pub view: ViewId,

    // ── Shared UI ─────────────────────────────────────────────────────────────
    pub show_help: bool,
    pub show_keys_bar: bool,

    /// Views whose sidebar is hidden.  Everything else shows it.
    hidden_sidebar: HashMap<ViewId, bool>,

    // ── Focus ring ────────────────────────────────────────────────────────────
    pub focus: FocusRing<PaneId>,
}

impl WorkspaceManager {
    pub fn new(show_keys_bar: bool) -> Self {
        let mut wm = Self {
            view: ViewId::default(),
            show_help: false,
            show_keys_bar,
            hidden_sidebar: HashMap::new(),
            focus: FocusRing::new(Vec::new()),
        };
        wm.rebuild_focus_ring();
        wm
    }

    /// Panes of the active view that can take focus.
    pub fn rebuild_focus_ring(&mut self) {
        let items = if self.sidebar_visible() {
            vec![PaneId::Sidebar, PaneId::Detail]
        } else {
            vec![PaneId::Detail]
        };
        self.focus.set_items(items);
    }

    pub fn set_view(&mut self, view: ViewId) -> bool {
        if self.view == view {
            return false;
        }
        debug!("workspace: {:?} -> {:?}", self.view, view);
        self.view = view;
        self.rebuild_focus_ring();
        true
    }

    pub fn sidebar_visible(&self) -> bool {
        !self.hidden_sidebar.get(&self.view).copied().unwrap_or(false)
    }

    /// Hiding the sidebar moves focus to the detail pane.
    pub fn toggle_sidebar(&mut self) {
        let visible = self.sidebar_visible();
        self.hidden_sidebar.insert(self.view, visible);
        self.rebuild_focus_ring();
    }

    /// Convenience: current focused pane.
    pub fn focused(&self) -> PaneId {
        self.focus.current().unwrap_or(PaneId::Detail)
    }

    /// Focus a pane; ignored when the pane is hidden.
    pub fn focus_pane(&mut self, pane: PaneId) -> bool {
        if !self.focus.items().contains(&pane) || self.focus.is_focused(pane) {
            return false;
        }
        self.focus.set(pane);
        true
    }

    pub fn session_state(&self) -> UiSessionState {
        let mut hidden: Vec<ViewId> = self
            .hidden_sidebar
            .iter()
            .filter(|(_, hidden)| **hidden)
            .map(|(view, _)| *view)
            .collect();
        hidden.sort_by_key(|v| v.index());
        UiSessionState {
            view: self.view,
            hidden_sidebars: hidden,
            focused_pane: self.focused().name().to_string(),
            show_keys_bar: self.show_keys_bar,
        }
    }

    pub fn restore(&mut self, state: &UiSessionState) {
        self.view = state.view;
        self.hidden_sidebar = state.hidden_sidebars.iter().map(|v| (*v, true)).collect();
        self.show_keys_bar = state.show_keys_bar;
        self.rebuild_focus_ring();
        if let Some(pane) = PaneId::from_name(&state.focused_pane) {
            self.focus_pane(pane);
        }
    }
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self::new(true)
    }
}

// ── Persistence ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSessionState {
    pub view: ViewId,
    pub hidden_sidebars: Vec<ViewId>,
    pub focused_pane: String,
    pub show_keys_bar: bool,
}

impl Default for UiSessionState {
    fn default() -> Self {
        Self {
            view: ViewId::default(),
            hidden_sidebars: Vec::new(),
            focused_pane: PaneId::Sidebar.name().to_string(),
            show_keys_bar: true,
        }
    }
}

pub fn load_ui_session_state(path: &Path) -> UiSessionState {
    let Ok(content) = std::fs::read_to_string(path) else {
        return UiSessionState::default();
    };
    serde_json::from_str(&content).unwrap_or_default()
}

pub fn save_ui_session_state(path: &Path, state: &UiSessionState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}
