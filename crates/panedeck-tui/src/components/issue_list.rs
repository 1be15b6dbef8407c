//! Issues view: issue list sidebar, detail pane, search and preview modals.
//!
//! The view is always in exactly one [`Mode`].  Search and preview each own
//! their modal state, so nothing belonging to a closed modal survives it
//! (except the search a preview was opened from, kept for "Back").

use panedeck_proto::records::IssueRecord;
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};
use tui_input::backend::crossterm::EventHandler;
use tui_input::{Input, InputRequest};

use crate::action::{Action, Command, Completion, PaneId, ViewId};
use crate::component::{Component, ViewContext};
use crate::dispatch::Outcome;
use crate::hitmap::{HitMap, HitPayload, HitRegion, KIND_ITEM, KIND_PANE};
use crate::layout;
use crate::modal::section::clamp_u16;
use crate::modal::{
    Button, Focusable, InputField, Modal, ModalEvent, ModalOptions, ModalState, RenderedModal,
    RenderedSection, Section, SectionRenderer, Variant,
};
use crate::overlay;
use crate::request::RequestTracker;
use crate::text;
use crate::theme::{paint, Tone};
use crate::widgets::pane_chrome::{pane_chrome, Badge};
use crate::widgets::scrollable_list::ScrollableList;
use crate::widgets::status_bar::{InputMode, KeyHint};
use crate::widgets::toast::Severity;

const SEARCH_INPUT_ID: &str = "issue-id";
/// Hit-region id prefix for clickable search results.
const RESULT_PREFIX: &str = "issue-search-";
const MAX_RESULTS: usize = 10;
/// Rows kept for results even when there are fewer, so the buttons below
/// do not jump while typing.
const MIN_RESULT_LINES: usize = 5;
const OPEN_ID: &str = "open";
const BACK_ID: &str = "back";
const CANCEL_ID: &str = "cancel";
const PREVIEW_MIN_WIDTH: u16 = 30;

const LIST_HINTS: &[KeyHint] = &[
    ("j/k", "move"),
    ("enter", "preview"),
    ("/", "search"),
    ("y", "copy id"),
    ("r", "reload"),
    ("\\", "sidebar"),
    ("?", "help"),
];
const SEARCH_HINTS: &[KeyHint] = &[("enter", "open"), ("↑↓", "select"), ("tab", "fill"), ("esc", "cancel")];
const PREVIEW_HINTS: &[KeyHint] = &[
    ("j/k", "scroll"),
    ("o", "open"),
    ("b", "back"),
    ("y", "yank"),
    ("esc", "close"),
];

struct SearchState {
    input: Input,
    results: Vec<IssueRecord>,
    cursor: usize,
    loading: bool,
    modal: ModalState,
}

impl SearchState {
    fn new() -> Self {
        Self {
            input: Input::default(),
            results: Vec::new(),
            cursor: 0,
            loading: false,
            modal: ModalState::new(),
        }
    }

    fn query(&self) -> &str {
        self.input.value().trim()
    }

    fn shown(&self) -> usize {
        self.results.len().min(MAX_RESULTS)
    }

    fn modal(&self, width: u16) -> Modal {
        let status = if self.loading {
            paint(Tone::Muted, "Searching...")
        } else {
            " ".to_string()
        };
        let rows = self
            .results
            .iter()
            .take(MAX_RESULTS)
            .map(|i| (i.id.clone(), i.title.clone()))
            .collect();

        let mut hint = String::new();
        for (key, desc) in SEARCH_HINTS {
            if self.results.is_empty() && (*key == "↑↓" || *key == "tab") {
                continue;
            }
            if !hint.is_empty() {
                hint.push_str("  ");
            }
            hint.push_str(&paint(Tone::KeyHint, key));
            hint.push(' ');
            hint.push_str(&paint(Tone::Muted, desc));
        }

        Modal::new("Open Issue", ModalOptions::default())
            .width(width)
            .hints(false)
            .section(Section::Input(
                InputField::new(SEARCH_INPUT_ID, self.input.value())
                    .cursor(self.input.cursor())
                    .placeholder("issue id or title"),
            ))
            .section(Section::text(status))
            .section(Section::custom(SearchResults {
                rows,
                cursor: self.cursor,
            }))
            .section(Section::Spacer)
            .section(Section::Buttons(vec![
                Button::primary("Open", OPEN_ID),
                Button::new("Cancel", CANCEL_ID),
            ]))
            .section(Section::Spacer)
            .section(Section::text(hint))
    }
}

/// Results dropdown of the search modal.
struct SearchResults {
    rows: Vec<(String, String)>,
    cursor: usize,
}

fn result_id(i: usize) -> String {
    format!("{RESULT_PREFIX}{i}")
}

fn result_index(id: &str) -> Option<usize> {
    id.strip_prefix(RESULT_PREFIX)?.parse().ok()
}

impl SectionRenderer for SearchResults {
    fn render(&self, width: usize, focused: Option<&str>, hovered: Option<&str>) -> RenderedSection {
        let mut lines = Vec::with_capacity(MIN_RESULT_LINES.max(self.rows.len()));
        let mut focusables = Vec::with_capacity(self.rows.len());
        for (i, (id, title)) in self.rows.iter().enumerate() {
            let item = result_id(i);
            let line = text::pad_right(&text::truncate_end(&format!("  {id}  {title}"), width), width);
            let lit = i == self.cursor
                || hovered == Some(item.as_str())
                || focused == Some(item.as_str());
            lines.push(paint(if lit { Tone::Selected } else { Tone::Normal }, &line));
            focusables.push(Focusable::new(item, 0, clamp_u16(i), clamp_u16(width), 1));
        }
        while lines.len() < MIN_RESULT_LINES {
            lines.push(String::new());
        }
        RenderedSection {
            content: lines.join("\n"),
            focusables,
        }
    }
}

struct PreviewState {
    id: String,
    loading: bool,
    error: Option<String>,
    data: Option<IssueRecord>,
    modal: ModalState,
    /// Built modal, keyed by terminal width.  Dropped whenever the data,
    /// error or loading flag changes.
    cache: Option<(u16, Modal)>,
    /// The search this preview was opened from.
    back: Option<Box<SearchState>>,
}

/// 80% of the terminal, kept inside the usual margin, at least 30 wide.
fn preview_width(term_width: u16) -> u16 {
    (term_width / 5 * 4 + term_width % 5 * 4 / 5)
        .min(term_width.saturating_sub(crate::modal::MODAL_MARGIN))
        .max(PREVIEW_MIN_WIDTH)
}

impl PreviewState {
    fn modal(&self, term_width: u16) -> Modal {
        let width = preview_width(term_width);
        if let Some(err) = &self.error {
            return Modal::new("Error", ModalOptions::default())
                .width(width)
                .variant(Variant::Danger)
                .hints(false)
                .section(Section::text(err))
                .section(Section::Spacer)
                .section(Section::Buttons(vec![Button::new("Close", CANCEL_ID)]));
        }
        let data = match (&self.data, self.loading) {
            (Some(data), false) => data,
            _ => {
                return Modal::new("Loading...", ModalOptions::default())
                    .width(width)
                    .hints(false)
                    .section(Section::text("Fetching issue data..."));
            }
        };

        let title = if data.title.is_empty() {
            data.id.clone()
        } else {
            format!("{}: {}", data.id, data.title)
        };
        let mut footer = String::new();
        for (key, desc) in PREVIEW_HINTS {
            if !footer.is_empty() {
                footer.push_str("  ");
            }
            footer.push_str(&paint(Tone::KeyHint, key));
            footer.push(' ');
            footer.push_str(&paint(Tone::Muted, desc));
        }

        let mut modal = Modal::new(title, ModalOptions::default())
            .width(width)
            .hints(false)
            .footer(footer);
        let meta = data.meta_line();
        if !meta.is_empty() {
            modal = modal.section(Section::text(meta));
        }
        if let Some(parent) = &data.parent_id {
            modal = modal.section(Section::text(format!("Parent: {parent}")));
        }
        if !data.labels.is_empty() {
            modal = modal.section(Section::text(format!("Labels: {}", data.labels.join(", "))));
        }
        if !data.description.is_empty() {
            modal = modal
                .section(Section::Spacer)
                .section(Section::text(text::expand_tabs(&data.description, text::TAB_STOP)));
        }
        let mut buttons = vec![Button::primary("Open", OPEN_ID)];
        if self.back.is_some() {
            buttons.push(Button::new("Back", BACK_ID));
        }
        buttons.push(Button::new("Close", CANCEL_ID));
        modal.section(Section::Spacer).section(Section::Buttons(buttons))
    }
}

enum Mode {
    List,
    Search(Box<SearchState>),
    Preview(PreviewState),
}

pub struct IssueList {
    list: ScrollableList<IssueRecord>,
    loaded: bool,
    loading: bool,
    load_error: Option<String>,
    detail_scroll: usize,
    detail_rows: usize,
    detail_len: usize,
    modal_width: u16,
    mode: Mode,
    searches: RequestTracker,
    fetches: RequestTracker,
}

impl IssueList {
    pub fn new(modal_width: u16) -> Self {
        Self {
            list: ScrollableList::new(),
            loaded: false,
            loading: false,
            load_error: None,
            detail_scroll: 0,
            detail_rows: 1,
            detail_len: 0,
            modal_width,
            mode: Mode::List,
            searches: RequestTracker::new(),
            fetches: RequestTracker::new(),
        }
    }

    pub fn selected(&self) -> Option<&IssueRecord> {
        self.list.selected_item()
    }

    pub fn issues(&self) -> &[IssueRecord] {
        &self.list.items
    }

    fn reload(&mut self) -> Outcome {
        self.loading = true;
        Outcome::Command(Command::LoadIssues)
    }

    fn open_search(&mut self) -> Outcome {
        info!("issues: search opened");
        self.mode = Mode::Search(Box::new(SearchState::new()));
        Outcome::Changed
    }

    fn close_modal(&mut self) -> Outcome {
        debug!("issues: modal closed");
        self.searches.invalidate();
        self.fetches.invalidate();
        self.mode = Mode::List;
        Outcome::Changed
    }

    fn open_preview(&mut self, id: String, back: Option<Box<SearchState>>) -> Outcome {
        info!("issues: preview {}", id);
        self.searches.invalidate();
        let token = self.fetches.issue();
        self.mode = Mode::Preview(PreviewState {
            id: id.clone(),
            loading: true,
            error: None,
            data: None,
            modal: ModalState::new(),
            cache: None,
            back,
        });
        Outcome::Command(Command::FetchIssue { token, id })
    }

    fn select_by_id(&mut self, id: &str) {
        if let Some(pos) = self.list.items.iter().position(|i| i.id == id) {
            self.list.select(pos);
            self.detail_scroll = 0;
        }
    }

    // ── Search modal ─────────────────────────────────────────────────────────

    fn search_key(&mut self, key: KeyEvent) -> Outcome {
        let Mode::Search(search) = &mut self.mode else {
            return Outcome::Ignored;
        };
        match key.code {
            KeyCode::Esc => self.close_modal(),
            KeyCode::Enter => {
                let target = search.modal.focused().unwrap_or(SEARCH_INPUT_ID).to_string();
                self.search_activate(&target)
            }
            KeyCode::Up => {
                let moved = search.cursor > 0;
                search.cursor = search.cursor.saturating_sub(1);
                Outcome::changed_if(moved)
            }
            KeyCode::Down => {
                let moved = search.cursor + 1 < search.shown();
                if moved {
                    search.cursor += 1;
                }
                Outcome::changed_if(moved)
            }
            KeyCode::Tab if !key.modifiers.contains(KeyModifiers::SHIFT) && search.shown() > 0 => {
                // Fill the input with the highlighted result
                let id = search.results[search.cursor.min(search.shown() - 1)].id.clone();
                search.input = Input::new(id);
                search.modal.pointer.focus(SEARCH_INPUT_ID);
                Outcome::Changed
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::PageUp | KeyCode::PageDown => {
                match search.modal.handle_key(key) {
                    ModalEvent::Ignored => Outcome::Ignored,
                    _ => Outcome::Changed,
                }
            }
            _ => {
                let before = search.input.value().to_string();
                search.input.handle_event(&Event::Key(key));
                if search.input.value() == before {
                    return Outcome::Ignored;
                }
                self.query_changed()
            }
        }
    }

    fn query_changed(&mut self) -> Outcome {
        let Mode::Search(search) = &mut self.mode else {
            return Outcome::Ignored;
        };
        search.cursor = 0;
        let query = search.query().to_string();
        if query.is_empty() {
            self.searches.invalidate();
            search.results.clear();
            search.loading = false;
            return Outcome::Changed;
        }
        search.loading = true;
        let token = self.searches.issue();
        Outcome::Command(Command::SearchIssues { token, query })
    }

    fn search_activate(&mut self, id: &str) -> Outcome {
        let Mode::Search(search) = &mut self.mode else {
            return Outcome::Ignored;
        };
        if id == CANCEL_ID {
            return self.close_modal();
        }
        let target = match result_index(id) {
            Some(i) => search.results.get(i).map(|r| r.id.clone()),
            None => search
                .results
                .get(search.cursor)
                .map(|r| r.id.clone())
                .or_else(|| Some(search.query().to_string()).filter(|q| !q.is_empty())),
        };
        let Some(target) = target else {
            return Outcome::Ignored;
        };
        let back = match std::mem::replace(&mut self.mode, Mode::List) {
            Mode::Search(search) => Some(search),
            _ => None,
        };
        self.open_preview(target, back)
    }

    // ── Preview modal ────────────────────────────────────────────────────────

    fn preview_key(&mut self, key: KeyEvent) -> Outcome {
        let Mode::Preview(preview) = &mut self.mode else {
            return Outcome::Ignored;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.close_modal(),
            KeyCode::Char('o') => self.preview_activate(OPEN_ID),
            KeyCode::Char('b') => self.preview_activate(BACK_ID),
            KeyCode::Char('y') => match &preview.data {
                Some(data) => copy(data.id.clone()),
                None => Outcome::Ignored,
            },
            KeyCode::Char('Y') => match &preview.data {
                Some(data) => copy(format!("{}: {}", data.id, data.title)),
                None => Outcome::Ignored,
            },
            _ => match preview.modal.handle_key(key) {
                ModalEvent::Ignored => Outcome::Ignored,
                ModalEvent::Changed => Outcome::Changed,
                ModalEvent::Cancel => self.close_modal(),
                ModalEvent::Activate(id) => self.preview_activate(&id),
            },
        }
    }

    fn preview_activate(&mut self, id: &str) -> Outcome {
        let Mode::Preview(preview) = &mut self.mode else {
            return Outcome::Ignored;
        };
        match id {
            OPEN_ID => {
                let Some(data) = preview.data.take() else {
                    return Outcome::Ignored;
                };
                self.close_modal();
                self.select_by_id(&data.id);
                Outcome::Navigate(Action::FocusPane(PaneId::Sidebar))
            }
            BACK_ID => match preview.back.take() {
                Some(mut search) => {
                    self.fetches.invalidate();
                    search.modal.reset();
                    self.mode = Mode::Search(search);
                    Outcome::Changed
                }
                None => self.close_modal(),
            },
            CANCEL_ID => self.close_modal(),
            _ => Outcome::Ignored,
        }
    }

    // ── List + detail ────────────────────────────────────────────────────────

    fn list_key(&mut self, key: KeyEvent, ctx: &ViewContext) -> Outcome {
        match key.code {
            KeyCode::Char('/') => return self.open_search(),
            KeyCode::Char('r') => return self.reload(),
            KeyCode::Char('y') => {
                return match self.list.selected_item() {
                    Some(issue) => copy(issue.id.clone()),
                    None => Outcome::Ignored,
                }
            }
            KeyCode::Enter => {
                return match self.list.selected_item() {
                    Some(issue) => {
                        let id = issue.id.clone();
                        self.open_preview(id, None)
                    }
                    None => Outcome::Ignored,
                }
            }
            _ => {}
        }

        if ctx.focused == PaneId::Detail {
            let step: isize = match key.code {
                KeyCode::Char('j') | KeyCode::Down => 1,
                KeyCode::Char('k') | KeyCode::Up => -1,
                KeyCode::PageDown => self.detail_rows as isize,
                KeyCode::PageUp => -(self.detail_rows as isize),
                _ => return Outcome::Ignored,
            };
            return Outcome::changed_if(self.scroll_detail(step));
        }

        let before = self.list.selected();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.list.select_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.list.select_up(1),
            KeyCode::Char('g') | KeyCode::Home => self.list.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.list.select_last(),
            KeyCode::PageDown => self.list.page_down(),
            KeyCode::PageUp => self.list.page_up(),
            _ => return Outcome::Ignored,
        }
        let moved = self.list.selected() != before;
        if moved {
            self.detail_scroll = 0;
        }
        Outcome::changed_if(moved)
    }

    fn scroll_detail(&mut self, delta: isize) -> bool {
        let max = self.detail_len.saturating_sub(self.detail_rows);
        let next = if delta < 0 {
            self.detail_scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.detail_scroll.saturating_add(delta.unsigned_abs()).min(max)
        };
        let changed = next != self.detail_scroll;
        self.detail_scroll = next;
        changed
    }

    fn sidebar_body(&mut self, inner: Rect, hits: &mut HitMap, focused: bool) -> String {
        let width = usize::from(inner.width);
        if self.list.is_empty() {
            let msg = if let Some(err) = &self.load_error {
                paint(Tone::Danger, &text::truncate_end(err, width))
            } else if self.loading || !self.loaded {
                paint(Tone::Muted, "Loading issues...")
            } else {
                paint(Tone::Muted, "No issues")
            };
            return msg;
        }
        self.list.resize(usize::from(inner.height));
        let selected = self.list.selected();
        let lines: Vec<String> = self
            .list
            .visible_items()
            .into_iter()
            .map(|(pos, issue)| {
                let line = format!("{} {}  {}", status_glyph(&issue.status), issue.id, issue.title);
                let line = text::pad_right(&text::truncate_end(&line, width), width);
                let tone = match (pos == selected, focused) {
                    (true, true) => Tone::Selected,
                    (true, false) => Tone::Primary,
                    (false, _) => Tone::Secondary,
                };
                paint(tone, &line)
            })
            .collect();
        self.list.register_hits(hits, inner.x, inner.y, inner.width);
        lines.join("\n")
    }

    fn detail_body(&mut self, inner: Rect) -> String {
        let width = usize::from(inner.width).max(1);
        let Some(issue) = self.list.selected_item() else {
            self.detail_len = 0;
            return paint(Tone::Muted, "Select an issue to see its details.");
        };
        let mut lines = vec![paint(Tone::Title, &text::truncate_end(&issue.title, width))];
        let meta = issue.meta_line();
        if !meta.is_empty() {
            lines.push(paint(Tone::Secondary, &text::truncate_end(&meta, width)));
        }
        if let Some(parent) = &issue.parent_id {
            lines.push(text::truncate_end(&format!("Parent: {parent}"), width));
        }
        if !issue.labels.is_empty() {
            lines.push(text::truncate_end(&format!("Labels: {}", issue.labels.join(", ")), width));
        }
        lines.push(String::new());
        if issue.description.is_empty() {
            lines.push(paint(Tone::Muted, "No description."));
        } else {
            lines.extend(text::wrap(&text::expand_tabs(&issue.description, text::TAB_STOP), width));
        }

        self.detail_rows = usize::from(inner.height).max(1);
        self.detail_len = lines.len();
        self.detail_scroll = self.detail_scroll.min(lines.len().saturating_sub(self.detail_rows));
        lines
            .into_iter()
            .skip(self.detail_scroll)
            .take(self.detail_rows)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn copy(text: String) -> Outcome {
    Outcome::Navigate(Action::CopyToClipboard(text))
}

fn status_glyph(status: &str) -> &'static str {
    match status {
        "open" => "○",
        "in_progress" => "◐",
        "closed" | "done" => "●",
        _ => "·",
    }
}

impl Component for IssueList {
    fn id(&self) -> ViewId {
        ViewId::Issues
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &ViewContext) -> Outcome {
        match self.mode {
            Mode::List => self.list_key(key, ctx),
            Mode::Search(_) => self.search_key(key),
            Mode::Preview(_) => self.preview_key(key),
        }
    }

    fn handle_paste(&mut self, pasted: &str, _ctx: &ViewContext) -> Outcome {
        let Mode::Search(search) = &mut self.mode else {
            return Outcome::Ignored;
        };
        let before = search.input.value().to_string();
        for c in pasted.chars().filter(|c| !c.is_control()) {
            search.input.handle(InputRequest::InsertChar(c));
        }
        if search.input.value() == before {
            return Outcome::Ignored;
        }
        self.query_changed()
    }

    fn handle_click(&mut self, region: &HitRegion, _ctx: &ViewContext) -> Outcome {
        match &mut self.mode {
            Mode::Search(search) => match search.modal.handle_click(region) {
                ModalEvent::Activate(id) => self.search_activate(&id),
                _ => Outcome::Ignored,
            },
            Mode::Preview(preview) => match preview.modal.handle_click(region) {
                ModalEvent::Activate(id) => self.preview_activate(&id),
                _ => Outcome::Ignored,
            },
            Mode::List => {
                if region.kind == KIND_ITEM {
                    if let Some(pos) = region.payload.index() {
                        self.list.select(pos);
                        self.detail_scroll = 0;
                        return Outcome::Navigate(Action::FocusPane(PaneId::Sidebar));
                    }
                }
                match region.payload.id().and_then(PaneId::from_name) {
                    Some(pane) if region.kind == KIND_PANE => Outcome::Navigate(Action::FocusPane(pane)),
                    _ => Outcome::Ignored,
                }
            }
        }
    }

    fn handle_hover(&mut self, region: Option<&HitRegion>, _ctx: &ViewContext) -> Outcome {
        let state = match &mut self.mode {
            Mode::Search(search) => &mut search.modal,
            Mode::Preview(preview) => &mut preview.modal,
            Mode::List => return Outcome::Ignored,
        };
        Outcome::changed_if(state.handle_hover(region) != ModalEvent::Ignored)
    }

    fn handle_scroll(&mut self, delta: isize, region: Option<&HitRegion>, _ctx: &ViewContext) -> Outcome {
        match &mut self.mode {
            Mode::Search(search) => Outcome::changed_if(search.modal.scroll_by(delta) != ModalEvent::Ignored),
            Mode::Preview(preview) => {
                Outcome::changed_if(preview.modal.scroll_by(delta) != ModalEvent::Ignored)
            }
            Mode::List => {
                let over_detail = region
                    .and_then(|r| r.payload.id())
                    .map_or(false, |id| id == PaneId::Detail.name());
                if over_detail {
                    return Outcome::changed_if(self.scroll_detail(delta));
                }
                let before = self.list.scroll_state().offset;
                self.list.scroll_by(delta);
                Outcome::changed_if(self.list.scroll_state().offset != before)
            }
        }
    }

    fn on_completion(&mut self, completion: Completion, _ctx: &ViewContext) -> Outcome {
        match completion {
            Completion::Issues(result) => {
                self.loading = false;
                self.loaded = true;
                match result {
                    Ok(issues) => {
                        info!("issues: {} loaded", issues.len());
                        self.load_error = None;
                        self.list.set_items(issues);
                        Outcome::Changed
                    }
                    Err(e) => {
                        warn!("issues: load failed: {}", e);
                        self.load_error = Some(e.clone());
                        Outcome::Navigate(Action::Toast(Severity::Error, format!("Loading issues failed: {e}")))
                    }
                }
            }
            Completion::SearchResults { token, query, result } => {
                if !self.searches.accept(token) {
                    return Outcome::Ignored;
                }
                let Mode::Search(search) = &mut self.mode else {
                    return Outcome::Ignored;
                };
                if search.query() != query {
                    return Outcome::Ignored;
                }
                search.loading = false;
                search.cursor = 0;
                match result {
                    Ok(results) => {
                        search.results = results;
                        Outcome::Changed
                    }
                    Err(e) => {
                        search.results.clear();
                        Outcome::Navigate(Action::Toast(Severity::Warning, format!("Search failed: {e}")))
                    }
                }
            }
            Completion::IssueLoaded { token, result } => {
                if !self.fetches.accept(token) {
                    return Outcome::Ignored;
                }
                let Mode::Preview(preview) = &mut self.mode else {
                    return Outcome::Ignored;
                };
                preview.loading = false;
                preview.cache = None;
                match result {
                    Ok(Some(issue)) => preview.data = Some(issue),
                    Ok(None) => preview.error = Some(format!("Issue {} not found", preview.id)),
                    Err(e) => preview.error = Some(e),
                }
                Outcome::Changed
            }
            _ => Outcome::Ignored,
        }
    }

    fn activate(&mut self, _ctx: &ViewContext) -> Outcome {
        if self.loaded || self.loading {
            return Outcome::Ignored;
        }
        self.reload()
    }

    fn render(&mut self, area: Rect, hits: &mut HitMap, ctx: &ViewContext) -> String {
        let (sidebar, detail) = layout::sidebar_detail(area, &ctx.config.ui, ctx.sidebar_visible);
        let mut blocks = Vec::with_capacity(2);

        if sidebar.is_visible() {
            hits.add(KIND_PANE, sidebar.area, HitPayload::Id(PaneId::Sidebar.name().into()));
            let focused = ctx.focused == PaneId::Sidebar;
            let body = self.sidebar_body(sidebar.inner(1), hits, focused);
            let count = self.list.len().to_string();
            let badge = (!self.list.is_empty()).then(|| Badge {
                text: &count,
                tone: Tone::Muted,
            });
            let a = sidebar.area;
            blocks.push((a, pane_chrome("Issues", Some('1'), focused, badge, &body, a.width, a.height)));
        }

        hits.add(KIND_PANE, detail.area, HitPayload::Id(PaneId::Detail.name().into()));
        let focused = ctx.focused == PaneId::Detail;
        let body = self.detail_body(detail.inner(1));
        let title = self.list.selected_item().map_or_else(|| "Detail".to_string(), |i| i.id.clone());
        let a = detail.area;
        blocks.push((a, pane_chrome(&title, Some('2'), focused, None, &body, a.width, a.height)));

        overlay::compose(area, &blocks)
    }

    fn render_modal(&mut self, width: u16, height: u16, hits: &mut HitMap) -> Option<RenderedModal> {
        match &mut self.mode {
            Mode::List => None,
            Mode::Search(search) => {
                let modal = search.modal(self.modal_width);
                Some(search.modal.render(&modal, width, height, hits))
            }
            Mode::Preview(preview) => {
                if preview.cache.as_ref().map(|(w, _)| *w) != Some(width) {
                    preview.cache = Some((width, preview.modal(width)));
                }
                let PreviewState { cache, modal: state, .. } = preview;
                let (_, modal) = cache.as_ref()?;
                Some(state.render(modal, width, height, hits))
            }
        }
    }

    fn has_modal(&self) -> bool {
        !matches!(self.mode, Mode::List)
    }

    fn input_mode(&self) -> InputMode {
        match self.mode {
            Mode::List => InputMode::Normal,
            Mode::Search(_) => InputMode::Search,
            Mode::Preview(_) => InputMode::Modal,
        }
    }

    fn key_hints(&self) -> &'static [KeyHint] {
        match self.mode {
            Mode::List => LIST_HINTS,
            Mode::Search(_) => SEARCH_HINTS,
            Mode::Preview(_) => PREVIEW_HINTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;
    use crate::hitmap::KIND_BUTTON;
    use crate::provider::{IssueSource, MemoryIssues};
    use panedeck_proto::config::Config;
    use std::time::Instant;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctx(config: &Config) -> ViewContext<'_> {
        ViewContext {
            focused: PaneId::Sidebar,
            sidebar_visible: true,
            config,
            now: Instant::now(),
        }
    }

    fn loaded(config: &Config) -> IssueList {
        let mut view = IssueList::new(60);
        assert_eq!(view.activate(&ctx(config)), Outcome::Command(Command::LoadIssues));
        let issues = MemoryIssues::sample().list().unwrap();
        view.on_completion(Completion::Issues(Ok(issues)), &ctx(config));
        view
    }

    fn search_token(outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Command(Command::SearchIssues { token, .. }) => token,
            other => panic!("expected a search, got {other:?}"),
        }
    }

    #[test]
    fn test_render_and_click_item() {
        let config = Config::default();
        let mut view = loaded(&config);
        let area = Rect { x: 0, y: 1, width: 120, height: 20 };
        let mut hits = HitMap::new();
        hits.begin_frame(120, 22);
        let frame = view.render(area, &mut hits, &ctx(&config));
        let lines: Vec<&str> = frame.split('\n').collect();
        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|l| ansi::width(l) == 120));
        assert!(ansi::strip(&frame).contains("pd-001"));

        // Third row of the list: border at y=1, first item at y=2.
        let region = hits.topmost(3, 4).cloned().unwrap();
        assert_eq!(region.kind, KIND_ITEM);
        assert_eq!(
            view.handle_click(&region, &ctx(&config)),
            Outcome::Navigate(Action::FocusPane(PaneId::Sidebar))
        );
        assert_eq!(view.selected().map(|i| i.id.as_str()), Some("pd-003"));

        // A click on the detail border focuses the detail pane.
        let region = hits.topmost(119, 10).cloned().unwrap();
        assert_eq!(
            view.handle_click(&region, &ctx(&config)),
            Outcome::Navigate(Action::FocusPane(PaneId::Detail))
        );
    }

    #[test]
    fn test_search_drops_stale_results() {
        let config = Config::default();
        let mut view = loaded(&config);
        view.handle_key(key(KeyCode::Char('/')), &ctx(&config));
        assert!(view.has_modal());
        let first = search_token(view.handle_key(key(KeyCode::Char('p')), &ctx(&config)));
        let second = search_token(view.handle_key(key(KeyCode::Char('a')), &ctx(&config)));

        let source = MemoryIssues::sample();
        let stale = Completion::SearchResults {
            token: first,
            query: "p".into(),
            result: source.search("p").map_err(|e| e.to_string()),
        };
        assert_eq!(view.on_completion(stale, &ctx(&config)), Outcome::Ignored);

        let fresh = Completion::SearchResults {
            token: second,
            query: "pa".into(),
            result: source.search("pa").map_err(|e| e.to_string()),
        };
        assert_eq!(view.on_completion(fresh, &ctx(&config)), Outcome::Changed);

        let mut hits = HitMap::new();
        let r = view.render_modal(100, 40, &mut hits).unwrap();
        let plain = ansi::strip(&r.content);
        assert!(plain.contains("pane"));
        assert!(!plain.contains("Searching..."));
    }

    #[test]
    fn test_search_modal_height_is_stable() {
        let config = Config::default();
        let mut view = loaded(&config);
        view.handle_key(key(KeyCode::Char('/')), &ctx(&config));
        let mut hits = HitMap::new();
        let empty = view.render_modal(100, 40, &mut hits).unwrap();

        let token = search_token(view.handle_key(key(KeyCode::Char('v')), &ctx(&config)));
        let loading = view.render_modal(100, 40, &mut hits).unwrap();
        assert!(ansi::strip(&loading.content).contains("Searching..."));

        // Fewer results than the reserved rows.
        let results = MemoryIssues::sample().search("v").map_err(|e| e.to_string());
        assert_eq!(results.as_ref().map(Vec::len), Ok(4));
        view.on_completion(
            Completion::SearchResults { token, query: "v".into(), result: results },
            &ctx(&config),
        );
        let filled = view.render_modal(100, 40, &mut hits).unwrap();
        assert_eq!(empty.height, loading.height);
        assert_eq!(loading.height, filled.height);

        // The buttons stay put, on screen and in the hit map.
        let open_row = |r: &RenderedModal| r.screen_rect(OPEN_ID).map(|(_, y, _, _)| y);
        assert!(open_row(&empty).is_some());
        assert_eq!(open_row(&empty), open_row(&loading));
        assert_eq!(open_row(&loading), open_row(&filled));
        let hit_row = |id: &str| {
            hits.regions(KIND_BUTTON)
                .iter()
                .rev()
                .find(|r| r.payload.id() == Some(id))
                .map(|r| r.area.y)
        };
        assert_eq!(hit_row(OPEN_ID), open_row(&empty));
        assert_eq!(hit_row(CANCEL_ID), open_row(&empty));
    }

    #[test]
    fn test_search_enter_opens_preview_and_back() {
        let config = Config::default();
        let mut view = loaded(&config);
        view.handle_key(key(KeyCode::Char('/')), &ctx(&config));
        for c in "pd-005".chars() {
            view.handle_key(key(KeyCode::Char(c)), &ctx(&config));
        }
        let outcome = view.handle_key(key(KeyCode::Enter), &ctx(&config));
        let token = match outcome {
            Outcome::Command(Command::FetchIssue { token, id }) => {
                assert_eq!(id, "pd-005");
                token
            }
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(view.input_mode(), InputMode::Modal);

        let mut hits = HitMap::new();
        let r = view.render_modal(100, 40, &mut hits).unwrap();
        assert!(ansi::strip(&r.content).contains("Fetching issue data..."));

        let issue = MemoryIssues::sample().get("pd-005").unwrap();
        view.on_completion(Completion::IssueLoaded { token, result: Ok(issue) }, &ctx(&config));
        let r = view.render_modal(100, 40, &mut hits).unwrap();
        let plain = ansi::strip(&r.content);
        assert!(plain.contains("pd-005: Sidebar toggle keeps cursor visible"));
        assert!(plain.contains("[open]  task  P3  1p"));
        assert!(plain.contains("Parent: pd-003"));
        assert!(r.screen_rect(BACK_ID).is_some());

        assert_eq!(view.handle_key(key(KeyCode::Char('b')), &ctx(&config)), Outcome::Changed);
        assert_eq!(view.input_mode(), InputMode::Search);
        let r = view.render_modal(100, 40, &mut hits).unwrap();
        assert!(ansi::strip(&r.content).contains("pd-005"));
    }

    #[test]
    fn test_preview_not_found_is_danger() {
        let config = Config::default();
        let mut view = loaded(&config);
        view.handle_key(key(KeyCode::Char('G')), &ctx(&config));
        let token = match view.handle_key(key(KeyCode::Enter), &ctx(&config)) {
            Outcome::Command(Command::FetchIssue { token, .. }) => token,
            other => panic!("unexpected {other:?}"),
        };
        view.on_completion(Completion::IssueLoaded { token, result: Ok(None) }, &ctx(&config));
        let mut hits = HitMap::new();
        hits.begin_frame(100, 40);
        let r = view.render_modal(100, 40, &mut hits).unwrap();
        assert!(ansi::strip(&r.content).contains("Issue pd-006 not found"));
        let (x, y, _, _) = r.screen_rect(CANCEL_ID).unwrap();
        let region = hits.topmost_in_top_layer(x, y).cloned().unwrap();
        assert_eq!(region.kind, KIND_BUTTON);
        assert_eq!(view.handle_click(&region, &ctx(&config)), Outcome::Changed);
        assert!(!view.has_modal());
    }

    #[test]
    fn test_preview_width_and_cache() {
        assert_eq!(preview_width(100), 80);
        assert_eq!(preview_width(50), 40);
        assert_eq!(preview_width(34), PREVIEW_MIN_WIDTH);

        let config = Config::default();
        let mut view = loaded(&config);
        view.handle_key(key(KeyCode::Enter), &ctx(&config));
        let mut hits = HitMap::new();
        let r = view.render_modal(100, 40, &mut hits).unwrap();
        assert_eq!(r.width, 80);
        let Mode::Preview(preview) = &view.mode else { panic!("not previewing") };
        assert_eq!(preview.cache.as_ref().map(|(w, _)| *w), Some(100));
        view.render_modal(90, 40, &mut hits);
        let Mode::Preview(preview) = &view.mode else { panic!("not previewing") };
        assert_eq!(preview.cache.as_ref().map(|(w, _)| *w), Some(90));
    }

    #[test]
    fn test_copy_and_open_selects_in_list() {
        let config = Config::default();
        let mut view = loaded(&config);
        assert_eq!(
            view.handle_key(key(KeyCode::Char('y')), &ctx(&config)),
            Outcome::Navigate(Action::CopyToClipboard("pd-001".into()))
        );
        view.handle_key(key(KeyCode::Char('/')), &ctx(&config));
        for c in "pd-004".chars() {
            view.handle_key(key(KeyCode::Char(c)), &ctx(&config));
        }
        let token = match view.handle_key(key(KeyCode::Enter), &ctx(&config)) {
            Outcome::Command(Command::FetchIssue { token, .. }) => token,
            other => panic!("unexpected {other:?}"),
        };
        let issue = MemoryIssues::sample().get("pd-004").unwrap();
        view.on_completion(Completion::IssueLoaded { token, result: Ok(issue) }, &ctx(&config));
        assert_eq!(
            view.handle_key(key(KeyCode::Char('o')), &ctx(&config)),
            Outcome::Navigate(Action::FocusPane(PaneId::Sidebar))
        );
        assert!(!view.has_modal());
        assert_eq!(view.selected().map(|i| i.id.as_str()), Some("pd-004"));
    }

    #[test]
    fn test_closing_search_drops_in_flight_result() {
        let config = Config::default();
        let mut view = loaded(&config);
        view.handle_key(key(KeyCode::Char('/')), &ctx(&config));
        let token = search_token(view.handle_key(key(KeyCode::Char('x')), &ctx(&config)));
        view.handle_key(key(KeyCode::Esc), &ctx(&config));
        let late = Completion::SearchResults { token, query: "x".into(), result: Ok(Vec::new()) };
        assert_eq!(view.on_completion(late, &ctx(&config)), Outcome::Ignored);
        assert!(!view.has_modal());
    }
}
