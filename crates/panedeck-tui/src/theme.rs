//! Colour palette and named tones for the panedeck TUI.
//!
//! Renderers never build escape codes by hand: they pick a [`Tone`] and call
//! [`paint`], which keeps the measured width of the text unchanged.

use ratatui::crossterm::style::{Color, ContentStyle, Stylize};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_PRIMARY: Color = Color::Rgb { r: 210, g: 210, b: 225 };
pub const C_SECONDARY: Color = Color::Rgb { r: 115, g: 115, b: 138 };
pub const C_MUTED: Color = Color::Rgb { r: 72, g: 72, b: 88 };
pub const C_ACCENT: Color = Color::Rgb { r: 120, g: 100, b: 200 };
pub const C_DANGER: Color = Color::Rgb { r: 255, g: 95, b: 95 };
pub const C_SUCCESS: Color = Color::Rgb { r: 80, g: 200, b: 120 };
pub const C_WARNING: Color = Color::Rgb { r: 255, g: 184, b: 80 };
pub const C_INFO: Color = Color::Rgb { r: 80, g: 160, b: 220 };
pub const C_SELECTION_BG: Color = Color::Rgb { r: 40, g: 40, b: 60 };
pub const C_PANEL_BORDER: Color = Color::Rgb { r: 60, g: 60, b: 76 };
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb { r: 120, g: 100, b: 200 };
pub const C_KEY_HINT: Color = Color::Rgb { r: 255, g: 200, b: 80 };
pub const C_BUTTON_BG: Color = Color::Rgb { r: 48, g: 48, b: 64 };
pub const C_BUTTON_HOVER_BG: Color = Color::Rgb { r: 70, g: 70, b: 96 };
pub const C_INPUT_BG: Color = Color::Rgb { r: 24, g: 24, b: 36 };

/// Named visual styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Primary,
    Secondary,
    Muted,
    Danger,
    Success,
    Warning,
    Info,
    Selected,
    Title,
    KeyHint,
    Border,
    BorderFocused,
    Button,
    ButtonHover,
    ButtonFocused,
    ButtonPrimary,
    ButtonDanger,
    Input,
    Cursor,
}

impl Tone {
    pub fn style(self) -> ContentStyle {
        let base = ContentStyle::new();
        match self {
            Self::Normal => base,
            Self::Primary => base.with(C_PRIMARY),
            Self::Secondary => base.with(C_SECONDARY),
            Self::Muted => base.with(C_MUTED),
            Self::Danger => base.with(C_DANGER).bold(),
            Self::Success => base.with(C_SUCCESS),
            Self::Warning => base.with(C_WARNING),
            Self::Info => base.with(C_INFO),
            Self::Selected => base.with(C_PRIMARY).on(C_SELECTION_BG).bold(),
            Self::Title => base.with(C_PRIMARY).bold(),
            Self::KeyHint => base.with(C_KEY_HINT),
            Self::Border => base.with(C_PANEL_BORDER),
            Self::BorderFocused => base.with(C_PANEL_BORDER_FOCUSED),
            Self::Button => base.with(C_SECONDARY).on(C_BUTTON_BG),
            Self::ButtonHover => base.with(C_PRIMARY).on(C_BUTTON_HOVER_BG),
            Self::ButtonFocused => base.with(C_PRIMARY).on(C_ACCENT).bold(),
            Self::ButtonPrimary => base.with(C_PRIMARY).on(C_BUTTON_BG).bold(),
            Self::ButtonDanger => base.with(C_PRIMARY).on(C_DANGER).bold(),
            Self::Input => base.with(C_PRIMARY).on(C_INPUT_BG),
            Self::Cursor => base.reverse(),
        }
    }
}

/// Wrap `text` in the escapes for `tone`.  Empty text stays empty.
pub fn paint(tone: Tone, text: &str) -> String {
    if text.is_empty() || tone == Tone::Normal {
        return text.to_string();
    }
    tone.style().apply(text).to_string()
}

/// Border tone for a pane or modal.
pub fn border_tone(focused: bool) -> Tone {
    if focused {
        Tone::BorderFocused
    } else {
        Tone::Border
    }
}
