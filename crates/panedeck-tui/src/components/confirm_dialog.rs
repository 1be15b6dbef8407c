//! ConfirmDialog: reusable yes/no modal with a Confirm and a Cancel button.

use ratatui::crossterm::event::{KeyCode, KeyEvent};

use crate::hitmap::{HitMap, HitRegion};
use crate::modal::{Button, Modal, ModalEvent, ModalOptions, ModalState, RenderedModal, Section, Variant};

pub const CONFIRM_ID: &str = "confirm";
pub const CANCEL_ID: &str = "cancel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Ignored,
    Changed,
    Confirmed,
    Cancelled,
}

impl From<ModalEvent> for ConfirmOutcome {
    fn from(event: ModalEvent) -> Self {
        match event {
            ModalEvent::Ignored => Self::Ignored,
            ModalEvent::Changed => Self::Changed,
            ModalEvent::Activate(id) if id == CANCEL_ID => Self::Cancelled,
            ModalEvent::Activate(_) => Self::Confirmed,
            ModalEvent::Cancel => Self::Cancelled,
        }
    }
}

pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub variant: Variant,
    pub width: u16,
    state: ModalState,
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        let mut dialog = Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "Confirm".into(),
            cancel_label: "Cancel".into(),
            variant: Variant::Normal,
            width: 50,
            state: ModalState::new(),
        };
        dialog.reset();
        dialog
    }

    pub fn labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = cancel.into();
        self
    }

    pub fn danger(mut self) -> Self {
        self.variant = Variant::Danger;
        self
    }

    pub fn modal(&self) -> Modal {
        let confirm = match self.variant {
            Variant::Danger => Button::danger(&self.confirm_label, CONFIRM_ID),
            Variant::Normal => Button::primary(&self.confirm_label, CONFIRM_ID),
        };
        Modal::new(&self.title, ModalOptions::default())
            .width(self.width)
            .variant(self.variant)
            .hints(false)
            .section(Section::text(&self.message))
            .section(Section::Spacer)
            .section(Section::Buttons(vec![
                confirm,
                Button::new(&self.cancel_label, CANCEL_ID),
            ]))
    }

    pub fn render(&mut self, width: u16, height: u16, hits: &mut HitMap) -> RenderedModal {
        let modal = self.modal();
        self.state.render(&modal, width, height, hits)
    }

    pub fn focused(&self) -> Option<&str> {
        self.state.focused()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.state.pointer.hovered()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ConfirmOutcome {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => ConfirmOutcome::Confirmed,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') => ConfirmOutcome::Cancelled,
            _ => self.state.handle_key(key).into(),
        }
    }

    pub fn handle_click(&mut self, region: &HitRegion) -> ConfirmOutcome {
        self.state.handle_click(region).into()
    }

    pub fn handle_hover(&mut self, region: Option<&HitRegion>) -> ConfirmOutcome {
        self.state.handle_hover(region).into()
    }

    /// Back to the initial state: Confirm focused, nothing hovered.
    pub fn reset(&mut self) {
        self.state.reset();
        self.state.pointer.focus(CONFIRM_ID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;
    use crate::hitmap::KIND_BUTTON;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn rendered() -> (ConfirmDialog, HitMap, RenderedModal) {
        let mut d = ConfirmDialog::new("Delete File?", "Are you sure?").labels("Delete", "Cancel");
        let mut hits = HitMap::new();
        hits.begin_frame(80, 24);
        let r = d.render(80, 24, &mut hits);
        (d, hits, r)
    }

    #[test]
    fn test_render_contains_parts() {
        let (_, _, r) = rendered();
        let plain = ansi::strip(&r.content);
        for part in ["Delete File?", "Are you sure?", " Delete ", " Cancel "] {
            assert!(plain.contains(part), "missing {part:?}");
        }
    }

    #[test]
    fn test_tab_cycles_and_enter_follows_focus() {
        let (mut d, _, _) = rendered();
        assert_eq!(d.focused(), Some(CONFIRM_ID));
        assert_eq!(d.handle_key(key(KeyCode::Tab)), ConfirmOutcome::Changed);
        assert_eq!(d.focused(), Some(CANCEL_ID));
        assert_eq!(d.handle_key(key(KeyCode::Tab)), ConfirmOutcome::Changed);
        assert_eq!(d.focused(), Some(CONFIRM_ID));
        assert_eq!(d.handle_key(key(KeyCode::BackTab)), ConfirmOutcome::Changed);
        assert_eq!(d.handle_key(key(KeyCode::Enter)), ConfirmOutcome::Cancelled);
        d.reset();
        assert_eq!(d.handle_key(key(KeyCode::Enter)), ConfirmOutcome::Confirmed);
    }

    #[test]
    fn test_shortcut_keys() {
        let (mut d, _, _) = rendered();
        for c in ['y', 'Y'] {
            assert_eq!(d.handle_key(key(KeyCode::Char(c))), ConfirmOutcome::Confirmed);
        }
        for c in ['n', 'N', 'q'] {
            assert_eq!(d.handle_key(key(KeyCode::Char(c))), ConfirmOutcome::Cancelled);
        }
        assert_eq!(d.handle_key(key(KeyCode::Esc)), ConfirmOutcome::Cancelled);
        assert_eq!(d.handle_key(key(KeyCode::Char('x'))), ConfirmOutcome::Ignored);
    }

    #[test]
    fn test_hover_and_click_buttons() {
        let (mut d, hits, r) = rendered();
        let (x, y, _, _) = r.screen_rect(CANCEL_ID).unwrap();
        let region = hits.topmost_in_top_layer(x, y).cloned().unwrap();
        assert_eq!(region.kind, KIND_BUTTON);
        assert_eq!(d.handle_hover(Some(&region)), ConfirmOutcome::Changed);
        assert_eq!(d.hovered(), Some(CANCEL_ID));
        assert_eq!(d.handle_click(&region), ConfirmOutcome::Cancelled);

        let (x, y, _, _) = r.screen_rect(CONFIRM_ID).unwrap();
        let region = hits.topmost_in_top_layer(x, y).cloned().unwrap();
        assert_eq!(d.handle_click(&region), ConfirmOutcome::Confirmed);
        d.reset();
        assert_eq!(d.hovered(), None);
        assert_eq!(d.focused(), Some(CONFIRM_ID));
    }
}
