//! Declarative modal builder.
//!
//! A [`Modal`] is a title plus a vertical stack of [`Section`]s.  Drawing is a
//! pure function of the modal, the terminal size, the pointer state and the
//! body scroll; it returns a bordered surface along with every visible
//! focusable already translated to absolute screen coordinates.  The surface
//! is placed with [`overlay::centered_origin`], the same function the
//! compositor uses, so hit regions and pixels always agree.
//!
//! Surface rows:
//!
//! ```text
//! ╭──────────────╮  0
//! │  Title       │  1
//! │              │  2
//! │  section...  │  3..   (scrolls when taller than the terminal)
//! │              │        (only with a footer)
//! │  footer      │
//! ╰──────────────╯
//! ```

pub mod button;
pub mod section;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use crate::ansi;
use crate::focus::PointerState;
use crate::hitmap::{HitMap, HitPayload, HitRegion, KIND_MODAL};
use crate::overlay::{self, Backdrop};
use crate::text;
use crate::theme::{paint, Tone};

pub use button::{Button, ButtonKind};
pub use section::{Focusable, InputField, RenderedSection, Section, SectionRenderer};

pub const MIN_MODAL_WIDTH: u16 = 20;
/// Columns kept free around a modal on narrow terminals.
pub const MODAL_MARGIN: u16 = 4;
/// Border plus padding on each side.
pub const CHROME_X: u16 = 3;
/// First body row.
pub const BODY_TOP: u16 = 3;

const DEFAULT_HINTS: &str = "Tab next · Enter select · Esc close";
const PAGE_ROWS: isize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Normal,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalOptions {
    pub width: u16,
    pub hints: bool,
    pub variant: Variant,
    /// Replaces the default key hints.
    pub footer: Option<String>,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            width: 50,
            hints: true,
            variant: Variant::Normal,
            footer: None,
        }
    }
}

pub struct Modal {
    title: String,
    options: ModalOptions,
    sections: Vec<Section>,
}

impl Modal {
    pub fn new(title: impl Into<String>, options: ModalOptions) -> Self {
        Self {
            title: title.into(),
            options,
            sections: Vec::new(),
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.options.width = width;
        self
    }

    pub fn hints(mut self, hints: bool) -> Self {
        self.options.hints = hints;
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.options.variant = variant;
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.options.footer = Some(footer.into());
        self
    }

    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn options(&self) -> &ModalOptions {
        &self.options
    }

    /// Requested width, kept [`MODAL_MARGIN`] inside the terminal but never
    /// below [`MIN_MODAL_WIDTH`].
    pub fn effective_width(&self, term_width: u16) -> u16 {
        self.options
            .width
            .min(term_width.saturating_sub(MODAL_MARGIN))
            .max(MIN_MODAL_WIDTH)
    }

    fn footer_line(&self) -> Option<String> {
        match &self.options.footer {
            Some(f) => Some(f.clone()),
            None if self.options.hints => Some(paint(Tone::Muted, DEFAULT_HINTS)),
            None => None,
        }
    }

    /// Draw at body scroll `scroll` without touching a hit map.
    pub fn draw(&self, term_width: u16, term_height: u16, pointer: &PointerState, scroll: usize) -> RenderedModal {
        let mw = self.effective_width(term_width);
        let cw = usize::from(mw).saturating_sub(usize::from(CHROME_X) * 2).max(1);
        let (border, title_tone) = match self.options.variant {
            Variant::Normal => (Tone::BorderFocused, Tone::Title),
            Variant::Danger => (Tone::Danger, Tone::Danger),
        };

        let mut body: Vec<String> = Vec::new();
        let mut targets: Vec<Focusable> = Vec::new();
        for section in &self.sections {
            let r = section.render(cw, pointer.focused(), pointer.hovered());
            let top = section::clamp_u16(body.len());
            targets.extend(r.focusables.into_iter().map(|f| f.shifted(0, top)));
            body.extend(r.content.split('\n').map(str::to_string));
        }

        let footer = self.footer_line();
        let footer_rows = if footer.is_some() { 2 } else { 0 };
        let chrome = usize::from(BODY_TOP) + footer_rows + 1;
        let max_height = usize::from(term_height).saturating_sub(2).max(chrome + 1);
        let body_rows = body.len().min(max_height - chrome);
        let max_scroll = body.len() - body_rows;
        let scroll = scroll.min(max_scroll);

        let frame_line = |content: &str| {
            format!(
                "{}  {}  {}",
                paint(border, "│"),
                ansi::fit(content, cw),
                paint(border, "│")
            )
        };
        let rule = "─".repeat(usize::from(mw).saturating_sub(2));

        let mut lines = Vec::with_capacity(chrome + body_rows);
        lines.push(paint(border, &format!("╭{rule}╮")));
        lines.push(frame_line(&paint(title_tone, &text::truncate_end(&self.title, cw))));
        lines.push(frame_line(""));
        for line in &body[scroll..scroll + body_rows] {
            lines.push(frame_line(line));
        }
        if let Some(footer) = footer {
            lines.push(frame_line(""));
            lines.push(frame_line(&footer));
        }
        lines.push(paint(border, &format!("╰{rule}╯")));

        let width = section::clamp_u16(usize::from(mw).max(cw + 6));
        let height = section::clamp_u16(lines.len());
        let origin = overlay::centered_origin(width, height, term_width, term_height);

        let focus_order = targets.iter().map(|f| f.id.clone()).collect();
        let focus_rows = targets.iter().map(|f| (f.id.clone(), usize::from(f.offset_y))).collect();
        let cw16 = section::clamp_u16(cw);
        let focusables = targets
            .into_iter()
            .filter(|f| {
                let y = usize::from(f.offset_y);
                y >= scroll && y + usize::from(f.height) <= scroll + body_rows && f.offset_x < cw16
            })
            .map(|mut f| {
                f.width = f.width.min(cw16 - f.offset_x);
                f.offset_y -= section::clamp_u16(scroll);
                f.shifted(CHROME_X, BODY_TOP)
            })
            .collect();

        RenderedModal {
            content: lines.join("\n"),
            origin,
            width,
            height,
            focusables,
            focus_order,
            scroll,
            max_scroll,
            body_rows,
            focus_rows,
        }
    }

    /// Draw and register hit regions: a backdrop covering the surface on a
    /// fresh layer, then one region per visible focusable.
    pub fn render(&self, term_width: u16, term_height: u16, pointer: &PointerState, hits: &mut HitMap) -> RenderedModal {
        let rendered = self.draw(term_width, term_height, pointer, 0);
        rendered.register(hits);
        rendered
    }
}

/// A drawn modal.  `focusables` are relative to the surface's top-left
/// corner; add `origin` for screen coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModal {
    pub content: String,
    pub origin: (u16, u16),
    pub width: u16,
    pub height: u16,
    pub focusables: Vec<Focusable>,
    /// Every focusable id in section order, visible or not.
    pub focus_order: Vec<String>,
    pub scroll: usize,
    pub max_scroll: usize,
    body_rows: usize,
    focus_rows: Vec<(String, usize)>,
}

impl RenderedModal {
    pub fn register(&self, hits: &mut HitMap) {
        let (ox, oy) = self.origin;
        hits.raise();
        hits.add_rect(KIND_MODAL, ox, oy, self.width, self.height, HitPayload::Id("modal".into()));
        for f in &self.focusables {
            hits.add_rect(
                f.kind,
                ox.saturating_add(f.offset_x),
                oy.saturating_add(f.offset_y),
                f.width,
                f.height,
                HitPayload::Id(f.id.clone()),
            );
        }
    }

    /// Absolute rectangle of a visible focusable.
    pub fn screen_rect(&self, id: &str) -> Option<(u16, u16, u16, u16)> {
        let (ox, oy) = self.origin;
        self.focusables
            .iter()
            .find(|f| f.id == id)
            .map(|f| (ox + f.offset_x, oy + f.offset_y, f.width, f.height))
    }

    /// Composite over `background` at the recorded origin.
    pub fn composite(&self, background: &str, width: u16, height: u16) -> String {
        let (x, y) = self.origin;
        overlay::overlay_at(background, &self.content, x, y, width, height, Backdrop::Dim)
    }

    /// Scroll that brings `id` into view, if it is off screen.
    fn scroll_for(&self, id: &str) -> Option<usize> {
        let row = self.focus_rows.iter().find(|(f, _)| f == id)?.1;
        let next = crate::scroll::ensure_visible(row, self.scroll, self.body_rows, self.body_rows + self.max_scroll);
        (next != self.scroll).then_some(next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    Ignored,
    Changed,
    /// Enter on, or click on, the focusable with this id.
    Activate(String),
    Cancel,
}

/// Interaction state of one open modal.
#[derive(Debug, Default)]
pub struct ModalState {
    pub pointer: PointerState,
    scroll: usize,
    max_scroll: usize,
    order: Vec<String>,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `modal`, default the focus to the first focusable, keep the
    /// focused one on screen and register hit regions.
    pub fn render(&mut self, modal: &Modal, width: u16, height: u16, hits: &mut HitMap) -> RenderedModal {
        let mut rendered = modal.draw(width, height, &self.pointer, self.scroll);

        let focus_known = self
            .pointer
            .focused()
            .map_or(false, |f| rendered.focus_order.iter().any(|id| id == f));
        if !focus_known {
            if let Some(first) = rendered.focus_order.first().cloned() {
                self.pointer.focus(&first);
                rendered = modal.draw(width, height, &self.pointer, self.scroll);
            }
        }
        if let Some(scroll) = self.pointer.focused().and_then(|f| rendered.scroll_for(f)) {
            rendered = modal.draw(width, height, &self.pointer, scroll);
        }

        self.scroll = rendered.scroll;
        self.max_scroll = rendered.max_scroll;
        self.order = rendered.focus_order.clone();
        rendered.register(hits);
        rendered
    }

    pub fn focused(&self) -> Option<&str> {
        self.pointer.focused()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalEvent {
        match key.code {
            KeyCode::Tab if !key.modifiers.contains(KeyModifiers::SHIFT) => self.cycle(1),
            KeyCode::Tab | KeyCode::BackTab => self.cycle(-1),
            KeyCode::Enter => match self.pointer.focused() {
                Some(id) => ModalEvent::Activate(id.to_string()),
                None => ModalEvent::Ignored,
            },
            KeyCode::Esc => ModalEvent::Cancel,
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(PAGE_ROWS),
            KeyCode::PageUp => self.scroll_by(-PAGE_ROWS),
            _ => ModalEvent::Ignored,
        }
    }

    fn cycle(&mut self, step: isize) -> ModalEvent {
        if self.pointer.cycle(&self.order, step) {
            trace!(focused = ?self.pointer.focused(), "modal focus moved");
            ModalEvent::Changed
        } else {
            ModalEvent::Ignored
        }
    }

    pub fn handle_click(&mut self, region: &HitRegion) -> ModalEvent {
        match region.payload.id() {
            Some(id) if region.kind != KIND_MODAL => {
                self.pointer.focus(id);
                ModalEvent::Activate(id.to_string())
            }
            _ => ModalEvent::Ignored,
        }
    }

    pub fn handle_hover(&mut self, region: Option<&HitRegion>) -> ModalEvent {
        let id = region
            .filter(|r| r.kind != KIND_MODAL)
            .and_then(|r| r.payload.id());
        if self.pointer.hover(id) {
            ModalEvent::Changed
        } else {
            ModalEvent::Ignored
        }
    }

    pub fn scroll_by(&mut self, delta: isize) -> ModalEvent {
        let next = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta as usize).min(self.max_scroll)
        };
        if next == self.scroll {
            return ModalEvent::Ignored;
        }
        self.scroll = next;
        ModalEvent::Changed
    }

    pub fn reset(&mut self) {
        self.pointer.reset();
        self.scroll = 0;
        self.max_scroll = 0;
        self.order.clear();
    }
}
