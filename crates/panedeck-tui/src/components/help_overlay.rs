//! HelpOverlay component: modal with the keyboard shortcut reference.

use ratatui::crossterm::event::{KeyCode, KeyEvent};

use crate::hitmap::{HitMap, HitRegion};
use crate::modal::{
    Button, Modal, ModalEvent, ModalOptions, ModalState, RenderedModal, RenderedSection, Section,
    SectionRenderer,
};
use crate::text;
use crate::theme::{paint, Tone};

const CLOSE_ID: &str = "close";
const KEY_COLUMN: usize = 12;

/// `(group, key, description)`; a new group starts a heading.
const BINDINGS: &[(&str, &str, &str)] = &[
    ("Global", "1 / 2", "switch view"),
    ("Global", "Tab", "next view"),
    ("Global", "h / l", "focus sidebar / detail"),
    ("Global", "\\", "toggle sidebar"),
    ("Global", "K", "toggle keys bar"),
    ("Global", "?", "this help"),
    ("Global", "q", "quit"),
    ("Lists", "j / k", "move down / up"),
    ("Lists", "g / G", "first / last"),
    ("Lists", "PgDn / PgUp", "page"),
    ("Lists", "Enter", "open"),
    ("Issues", "/", "search issues"),
    ("Issues", "y", "copy issue id"),
    ("Issues", "r", "reload"),
    ("Panes", "i", "interactive mode"),
    ("Panes", "[ / ]", "output / info tab"),
    ("Interactive", "Ctrl+\\", "detach"),
    ("Interactive", "Esc Esc", "detach"),
    ("Modals", "Tab / S-Tab", "next / previous"),
    ("Modals", "Enter", "activate"),
    ("Modals", "Esc", "close"),
];

/// Two-column table of key bindings with group headings.
struct BindingTable;

impl SectionRenderer for BindingTable {
    fn render(&self, width: usize, _focused: Option<&str>, _hovered: Option<&str>) -> RenderedSection {
        let key_w = KEY_COLUMN.min(width / 2);
        let desc_w = width.saturating_sub(key_w + 1);
        let mut lines = Vec::new();
        let mut group = "";
        for (g, key, desc) in BINDINGS {
            if *g != group {
                if !group.is_empty() {
                    lines.push(String::new());
                }
                group = g;
                lines.push(paint(Tone::Title, &text::truncate_end(g, width)));
            }
            lines.push(format!(
                "{} {}",
                paint(Tone::KeyHint, &text::pad_right(&text::truncate_end(key, key_w), key_w)),
                paint(Tone::Secondary, &text::truncate_end(desc, desc_w)),
            ));
        }
        RenderedSection::plain(lines.join("\n"))
    }
}

pub struct HelpOverlay {
    pub visible: bool,
    state: ModalState,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self {
            visible: false,
            state: ModalState::new(),
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.state.reset();
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn toggle(&mut self) {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    fn modal(&self) -> Modal {
        Modal::new("Keyboard shortcuts", ModalOptions::default())
            .width(56)
            .footer(paint(Tone::Muted, "j/k scroll · Esc close"))
            .section(Section::custom(BindingTable))
            .section(Section::Spacer)
            .section(Section::Buttons(vec![Button::new("Close", CLOSE_ID)]))
    }

    pub fn render(&mut self, width: u16, height: u16, hits: &mut HitMap) -> Option<RenderedModal> {
        if !self.visible {
            return None;
        }
        let modal = self.modal();
        Some(self.state.render(&modal, width, height, hits))
    }

    /// Consumes every key while open.  Returns true when the overlay closed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let event = match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') => ModalEvent::Cancel,
            _ => self.state.handle_key(key),
        };
        self.apply(event)
    }

    pub fn handle_click(&mut self, region: &HitRegion) -> bool {
        let event = self.state.handle_click(region);
        self.apply(event)
    }

    pub fn handle_hover(&mut self, region: Option<&HitRegion>) -> bool {
        !matches!(self.state.handle_hover(region), ModalEvent::Ignored)
    }

    pub fn scroll_by(&mut self, delta: isize) -> bool {
        !matches!(self.state.scroll_by(delta), ModalEvent::Ignored)
    }

    fn apply(&mut self, event: ModalEvent) -> bool {
        match event {
            ModalEvent::Cancel => {
                self.hide();
                true
            }
            ModalEvent::Activate(id) if id == CLOSE_ID => {
                self.hide();
                true
            }
            _ => false,
        }
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}
