//! Status bar: tab header on top, mode label and keybindings at the bottom.

use crate::ansi;
use crate::hitmap::{HitMap, HitPayload, KIND_TAB};
use crate::text;
use crate::theme::{paint, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
    Interactive,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Search => "SEARCH",
            Self::Modal => "MODAL",
            Self::Interactive => "INTERACTIVE",
        }
    }

    fn tone(self) -> Tone {
        match self {
            Self::Normal => Tone::Info,
            Self::Search => Tone::Warning,
            Self::Modal => Tone::Title,
            Self::Interactive => Tone::Danger,
        }
    }
}

/// One `key desc` pair as shown in the keys bar.
pub type KeyHint = (&'static str, &'static str);

/// Keybindings footer (one row, exactly `width` columns).
pub fn keys_bar(mode: InputMode, hints: &[KeyHint], width: u16) -> String {
    let mut line = paint(mode.tone(), &format!(" {} ", mode.label()));
    for (key, desc) in hints {
        line.push_str("  ");
        line.push_str(&paint(Tone::KeyHint, key));
        line.push(' ');
        line.push_str(&paint(Tone::Muted, desc));
    }
    ansi::fit(&line, usize::from(width))
}

/// A row of clickable tabs starting at `(x, y)`.  Each tab registers a
/// `KIND_TAB` region whose payload comes from `payload(index)`.
pub fn tab_bar(
    labels: &[&str],
    active: usize,
    x: u16,
    y: u16,
    width: u16,
    hits: &mut HitMap,
    payload: impl Fn(usize) -> HitPayload,
) -> String {
    let mut line = String::new();
    let mut col: u16 = 0;
    for (i, label) in labels.iter().enumerate() {
        let cell = format!(" {} {} ", i + 1, label);
        let w = u16::try_from(text::visual_width(&cell)).unwrap_or(u16::MAX);
        if col.saturating_add(w) > width {
            break;
        }
        let tone = if i == active { Tone::Selected } else { Tone::Secondary };
        line.push_str(&paint(tone, &cell));
        hits.add_rect(KIND_TAB, x + col, y, w, 1, payload(i));
        col += w;
        if col < width {
            line.push(' ');
            col += 1;
        }
    }
    ansi::fit(&line, usize::from(width))
}

/// Horizontal separator.
pub fn separator(width: u16) -> String {
    paint(Tone::Border, &"─".repeat(usize::from(width)))
}
