//! Horizontal button rows.

use crate::text;
use crate::theme::{paint, Tone};

use super::section::{clamp_u16, Focusable, RenderedSection};

/// Columns between two buttons.
pub const BUTTON_GAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonKind {
    #[default]
    Normal,
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub id: String,
    pub kind: ButtonKind,
}

impl Button {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
            kind: ButtonKind::Normal,
        }
    }

    pub fn primary(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: ButtonKind::Primary,
            ..Self::new(label, id)
        }
    }

    pub fn danger(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: ButtonKind::Danger,
            ..Self::new(label, id)
        }
    }

    fn tone(&self, focused: bool, hovered: bool) -> Tone {
        match (focused, hovered, self.kind) {
            (true, _, ButtonKind::Danger) => Tone::ButtonDanger,
            (true, _, _) => Tone::ButtonFocused,
            (false, true, _) => Tone::ButtonHover,
            (false, false, ButtonKind::Primary) => Tone::ButtonPrimary,
            (false, false, _) => Tone::Button,
        }
    }
}

/// Lay buttons out left to right.  A button that would cross `width` is
/// dropped together with everything after it.
pub fn render_buttons(
    buttons: &[Button],
    width: usize,
    focused: Option<&str>,
    hovered: Option<&str>,
) -> RenderedSection {
    let mut content = String::new();
    let mut focusables = Vec::with_capacity(buttons.len());
    let mut x = 0;

    for button in buttons {
        let label = format!(" {} ", button.label);
        let bw = text::visual_width(&label);
        let start = if x == 0 { 0 } else { x + BUTTON_GAP };
        if start + bw > width {
            break;
        }
        if start > 0 {
            content.push_str(&" ".repeat(BUTTON_GAP));
        }
        let tone = button.tone(
            focused == Some(button.id.as_str()),
            hovered == Some(button.id.as_str()),
        );
        content.push_str(&paint(tone, &label));
        focusables.push(Focusable::button(&button.id, clamp_u16(start), clamp_u16(bw)));
        x = start + bw;
    }

    RenderedSection {
        content,
        focusables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;
    use crate::hitmap::KIND_BUTTON;

    fn row() -> Vec<Button> {
        vec![Button::primary("Open", "open"), Button::new("Cancel", "cancel")]
    }

    #[test]
    fn test_offsets_follow_labels() {
        let r = render_buttons(&row(), 40, None, None);
        assert_eq!(ansi::strip(&r.content), " Open    Cancel ");
        assert_eq!(r.focusables.len(), 2);
        assert_eq!((r.focusables[0].offset_x, r.focusables[0].width), (0, 6));
        assert_eq!((r.focusables[1].offset_x, r.focusables[1].width), (8, 8));
        assert!(r.focusables.iter().all(|f| f.kind == KIND_BUTTON));
    }

    #[test]
    fn test_focus_and_hover_change_style_only() {
        let plain = render_buttons(&row(), 40, None, None);
        let focused = render_buttons(&row(), 40, Some("cancel"), Some("open"));
        assert_ne!(plain.content, focused.content);
        assert_eq!(ansi::strip(&plain.content), ansi::strip(&focused.content));
        assert_eq!(plain.focusables, focused.focusables);
    }

    #[test]
    fn test_narrow_row_drops_overflow() {
        let r = render_buttons(&row(), 10, None, None);
        assert_eq!(r.focusables.len(), 1);
        assert_eq!(ansi::strip(&r.content), " Open ");
    }

    #[test]
    fn test_tone_choice() {
        let b = Button::danger("Delete", "del");
        assert_eq!(b.tone(true, false), Tone::ButtonDanger);
        assert_eq!(b.tone(false, true), Tone::ButtonHover);
        assert_eq!(b.tone(false, false), Tone::Button);
        assert_eq!(Button::primary("Ok", "ok").tone(false, false), Tone::ButtonPrimary);
    }
}
