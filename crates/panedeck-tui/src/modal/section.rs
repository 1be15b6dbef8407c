//! Modal sections: one vertical block each.

use crate::ansi;
use crate::hitmap::{KIND_BUTTON, KIND_ITEM};
use crate::text;
use crate::theme::{paint, Tone};

use super::button::{render_buttons, Button};

/// Interactive rectangle, relative to whatever drew it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focusable {
    pub id: String,
    pub offset_x: u16,
    pub offset_y: u16,
    pub width: u16,
    pub height: u16,
    /// Hit-map kind the region is registered under.
    pub kind: &'static str,
}

impl Focusable {
    pub fn new(id: impl Into<String>, offset_x: u16, offset_y: u16, width: u16, height: u16) -> Self {
        Self {
            id: id.into(),
            offset_x,
            offset_y,
            width,
            height,
            kind: KIND_ITEM,
        }
    }

    pub fn button(id: impl Into<String>, offset_x: u16, width: u16) -> Self {
        Self {
            kind: KIND_BUTTON,
            ..Self::new(id, offset_x, 0, width, 1)
        }
    }

    pub(crate) fn shifted(mut self, dx: u16, dy: u16) -> Self {
        self.offset_x = self.offset_x.saturating_add(dx);
        self.offset_y = self.offset_y.saturating_add(dy);
        self
    }
}

/// Output of one section for one content width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedSection {
    pub content: String,
    pub focusables: Vec<Focusable>,
}

impl RenderedSection {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            focusables: Vec::new(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }
}

/// Caller-drawn block.  Implementations must be pure in their arguments:
/// the same width, focus and hover must give the same output.
pub trait SectionRenderer {
    fn render(&self, width: usize, focused: Option<&str>, hovered: Option<&str>) -> RenderedSection;
}

impl<F> SectionRenderer for F
where
    F: Fn(usize, Option<&str>, Option<&str>) -> RenderedSection,
{
    fn render(&self, width: usize, focused: Option<&str>, hovered: Option<&str>) -> RenderedSection {
        self(width, focused, hovered)
    }
}

/// Single-line text field.  The owning view keeps the editing state and
/// hands the current value in on every build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    pub id: String,
    pub value: String,
    /// Cursor position in chars.
    pub cursor: usize,
    pub placeholder: String,
}

impl InputField {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            id: id.into(),
            cursor: value.chars().count(),
            value,
            placeholder: String::new(),
        }
    }

    pub fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    fn render(&self, width: usize, focused: bool) -> RenderedSection {
        let width = width.max(1);
        let (shown, tone, cursor) = if self.value.is_empty() {
            (self.placeholder.as_str(), Tone::Muted, 0)
        } else {
            (self.value.as_str(), Tone::Input, self.cursor)
        };

        let cursor_col: usize = shown.chars().take(cursor).map(text::char_width).sum();
        // Scroll horizontally so the cursor cell stays inside the field.
        let start = (cursor_col + 1).saturating_sub(width);
        let field = ansi::fit(&ansi::cut(shown, start, start + width), width);

        let content = if focused {
            let rel = cursor_col - start;
            let cell_w = shown
                .chars()
                .nth(cursor)
                .map(text::char_width)
                .unwrap_or(1)
                .max(1);
            let mut line = paint(tone, &ansi::cut(&field, 0, rel));
            let cell = ansi::cut(&field, rel, rel + cell_w);
            line.push_str(&paint(Tone::Cursor, if cell.is_empty() { " " } else { &cell }));
            line.push_str(&paint(tone, &ansi::cut(&field, rel + cell_w, width)));
            line
        } else {
            paint(tone, &field)
        };

        RenderedSection {
            content,
            focusables: vec![Focusable::new(&self.id, 0, 0, clamp_u16(width), 1)],
        }
    }
}

pub enum Section {
    Text(String),
    Input(InputField),
    Buttons(Vec<Button>),
    Spacer,
    Custom(Box<dyn SectionRenderer>),
}

impl Section {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn custom(renderer: impl SectionRenderer + 'static) -> Self {
        Self::Custom(Box::new(renderer))
    }

    pub fn render(&self, width: usize, focused: Option<&str>, hovered: Option<&str>) -> RenderedSection {
        let width = width.max(1);
        match self {
            Self::Text(s) => RenderedSection::plain(wrap_text(s, width).join("\n")),
            Self::Input(field) => field.render(width, focused == Some(field.id.as_str())),
            Self::Buttons(buttons) => render_buttons(buttons, width, focused, hovered),
            Self::Spacer => RenderedSection::plain(""),
            Self::Custom(renderer) => renderer.render(width, focused, hovered),
        }
    }
}

fn wrap_text(s: &str, width: usize) -> Vec<String> {
    s.split('\n')
        .flat_map(|line| {
            if line.contains('\x1b') {
                ansi::wrap_hard(line, width)
            } else {
                text::wrap(line, width)
            }
        })
        .collect()
}

pub(crate) fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
