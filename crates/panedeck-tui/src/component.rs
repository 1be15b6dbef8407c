//! Component trait: the interface every top-level view implements.
//!
//! - Views own their state and render themselves into a string frame.
//! - Views read shared settings through [`ViewContext`]; they never touch
//!   another view's state.
//! - Every handler answers with an [`Outcome`]; the app carries out
//!   navigation actions and runs commands off the event loop.

use std::time::Instant;

use panedeck_proto::config::Config;
use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::action::{Completion, PaneId, ViewId};
use crate::dispatch::Outcome;
use crate::hitmap::{HitMap, HitRegion};
use crate::modal::RenderedModal;
use crate::widgets::status_bar::{InputMode, KeyHint};

/// Read-only state handed to every view call.
pub struct ViewContext<'a> {
    pub focused: PaneId,
    pub sidebar_visible: bool,
    pub config: &'a Config,
    pub now: Instant,
}

pub trait Component {
    fn id(&self) -> ViewId;

    /// Key for the focused pane (or this view's modal, when one is open).
    fn handle_key(&mut self, key: KeyEvent, ctx: &ViewContext) -> Outcome;

    fn handle_paste(&mut self, _text: &str, _ctx: &ViewContext) -> Outcome {
        Outcome::Ignored
    }

    /// A click that landed on one of this view's regions.
    fn handle_click(&mut self, region: &HitRegion, ctx: &ViewContext) -> Outcome;

    /// `None` when the pointer left every region.
    fn handle_hover(&mut self, _region: Option<&HitRegion>, _ctx: &ViewContext) -> Outcome {
        Outcome::Ignored
    }

    fn handle_scroll(&mut self, _delta: isize, _region: Option<&HitRegion>, _ctx: &ViewContext) -> Outcome {
        Outcome::Ignored
    }

    /// Result of a command this view issued.
    fn on_completion(&mut self, completion: Completion, ctx: &ViewContext) -> Outcome;

    /// Called each tick (~100ms).
    fn tick(&mut self, _ctx: &ViewContext) -> Outcome {
        Outcome::Ignored
    }

    /// The view became the active tab.
    fn activate(&mut self, _ctx: &ViewContext) -> Outcome {
        Outcome::Ignored
    }

    /// The view stopped being the active tab.
    fn deactivate(&mut self) {}

    /// Exactly `area.height` lines of `area.width` columns.  Regions are
    /// registered in absolute coordinates.
    fn render(&mut self, area: Rect, hits: &mut HitMap, ctx: &ViewContext) -> String;

    /// The view's open modal, drawn and registered on a fresh hit layer.
    fn render_modal(&mut self, _width: u16, _height: u16, _hits: &mut HitMap) -> Option<RenderedModal> {
        None
    }

    fn has_modal(&self) -> bool {
        false
    }

    /// True while the view wants every key, global bindings included.
    fn captures_input(&self) -> bool {
        false
    }

    fn input_mode(&self) -> InputMode {
        if self.has_modal() {
            InputMode::Modal
        } else {
            InputMode::Normal
        }
    }

    fn key_hints(&self) -> &'static [KeyHint];
}
