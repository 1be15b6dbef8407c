//! Raw terminal events → routed input.
//!
//! Keys go to whoever owns the keyboard: the open modal, else the focused
//! pane.  Mouse events are resolved against the hit map built by the last
//! render; while a modal is open only its layer is considered, so clicks
//! never leak to the panes underneath.

use ratatui::crossterm::event::{
    Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use crate::action::{Action, Command};
use crate::hitmap::{HitMap, HitRegion};

/// Rows moved per wheel notch.
pub const WHEEL_STEP: isize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Paste(String),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

impl InputEvent {
    /// Terminal events the dashboard reacts to.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) => Some(Self::Key(key)),
            Event::Paste(text) => Some(Self::Paste(text)),
            Event::Mouse(mouse) => Some(Self::Mouse(mouse)),
            Event::Resize(w, h) => Some(Self::Resize(w, h)),
            Event::FocusGained | Event::FocusLost => None,
        }
    }
}

/// Keyboard owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<P> {
    Modal,
    Pane(P),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<P> {
    Key { target: Target<P>, key: KeyEvent },
    Paste { target: Target<P>, text: String },
    Click { region: HitRegion },
    Hover { region: HitRegion },
    /// Pointer over nothing interactive (or a click that hit nothing).
    HoverCleared,
    /// Positive scrolls down.  `region` is whatever lies under the pointer.
    Scroll { delta: isize, region: Option<HitRegion> },
    Resize { width: u16, height: u16 },
    Drop,
}

/// Resolve one event.  `focused` is the pane owning the keyboard when no
/// modal is open.
pub fn route<P: Copy>(event: InputEvent, has_modal: bool, focused: P, hits: &HitMap) -> Route<P> {
    let target = if has_modal {
        Target::Modal
    } else {
        Target::Pane(focused)
    };
    let under = |x: u16, y: u16| {
        if has_modal {
            hits.topmost_in_top_layer(x, y).cloned()
        } else {
            hits.topmost(x, y).cloned()
        }
    };

    match event {
        InputEvent::Key(key) if key.kind == KeyEventKind::Release => Route::Drop,
        InputEvent::Key(key) => Route::Key { target, key },
        InputEvent::Paste(text) => Route::Paste { target, text },
        InputEvent::Resize(width, height) => Route::Resize { width, height },
        InputEvent::Mouse(mouse) => {
            let (x, y) = (mouse.column, mouse.row);
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => match under(x, y) {
                    Some(region) => Route::Click { region },
                    None => Route::HoverCleared,
                },
                MouseEventKind::Moved => match under(x, y) {
                    Some(region) => Route::Hover { region },
                    None => Route::HoverCleared,
                },
                MouseEventKind::ScrollDown => Route::Scroll {
                    delta: WHEEL_STEP,
                    region: under(x, y),
                },
                MouseEventKind::ScrollUp => Route::Scroll {
                    delta: -WHEEL_STEP,
                    region: under(x, y),
                },
                _ => Route::Drop,
            }
        }
    }
}

/// What a view did with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored,
    /// Own state changed; redraw.
    Changed,
    Navigate(Action),
    Command(Command),
}

impl Outcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// `Changed` when `changed`, else `Ignored`.
    pub fn changed_if(changed: bool) -> Self {
        if changed {
            Self::Changed
        } else {
            Self::Ignored
        }
    }
}
