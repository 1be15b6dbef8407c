//! Panes view: tmux pane list, live output preview and interactive attach.
//!
//! The preview is refreshed by a [`PollChain`]: each capture that comes back
//! asks for the next one, so the chain dies as soon as the selection changes
//! or the view is left.  Attaching forwards keystrokes to the pane until
//! `Ctrl+\`, a double Escape, or a failed send/capture.

use std::time::Instant;

use panedeck_proto::records::PaneRecord;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use tracing::{debug, info, trace, warn};

use crate::action::{Action, Command, Completion, PaneId, ViewId};
use crate::component::{Component, ViewContext};
use crate::dispatch::Outcome;
use crate::hitmap::{HitMap, HitPayload, HitRegion, KIND_ITEM, KIND_PANE, KIND_TAB};
use crate::interactive::{render_with_cursor, InteractiveSession, KeyStep, PaneInput};
use crate::layout;
use crate::overlay;
use crate::poll::{PollChain, PollPolicy};
use crate::text;
use crate::theme::{paint, Tone};
use crate::tmux::{PaneSnapshot, PaneTarget};
use crate::widgets::pane_chrome::{pane_chrome, Badge};
use crate::widgets::scrollable_list::ScrollableList;
use crate::widgets::status_bar::{self, InputMode, KeyHint};
use crate::widgets::toast::Severity;

/// Tab row plus separator.
const HEADER_HEIGHT: u16 = 2;

const BROWSE_HINTS: &[KeyHint] = &[
    ("j/k", "move"),
    ("i", "attach"),
    ("[ ]", "tabs"),
    ("r", "refresh"),
    ("\\", "sidebar"),
    ("?", "help"),
];
const INTERACTIVE_HINTS: &[KeyHint] = &[("ctrl+\\", "detach"), ("esc esc", "detach")];

const WELCOME: &str = "Select a pane on the left to preview its output.\n\n\
Press i to attach and type into it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Output,
    Info,
}

impl DetailTab {
    const ALL: [DetailTab; 2] = [DetailTab::Output, DetailTab::Info];

    fn label(self) -> &'static str {
        match self {
            Self::Output => "Output",
            Self::Info => "Info",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Info => "info",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    fn index(self) -> usize {
        match self {
            Self::Output => 0,
            Self::Info => 1,
        }
    }
}

enum ViewMode {
    Browse,
    Interactive(InteractiveSession),
}

pub struct PaneViewer {
    list: ScrollableList<PaneRecord>,
    loaded: bool,
    loading: bool,
    load_error: Option<String>,
    tab: DetailTab,
    snapshot: Option<PaneSnapshot>,
    capture_error: Option<String>,
    poll: PollChain,
    mode: ViewMode,
}

impl PaneViewer {
    pub fn new(policy: PollPolicy, now: Instant) -> Self {
        Self {
            list: ScrollableList::new(),
            loaded: false,
            loading: false,
            load_error: None,
            tab: DetailTab::Output,
            snapshot: None,
            capture_error: None,
            poll: PollChain::new(policy, now),
            mode: ViewMode::Browse,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.mode, ViewMode::Interactive(_))
    }

    pub fn tab(&self) -> DetailTab {
        self.tab
    }

    pub fn panes(&self) -> &[PaneRecord] {
        &self.list.items
    }

    fn selected_target(&self) -> Option<PaneTarget> {
        self.list.selected_item().map(PaneTarget::from)
    }

    /// Restart the capture chain for the current selection.
    fn restart_capture(&mut self, now: Instant) -> Outcome {
        self.snapshot = None;
        self.capture_error = None;
        match self.selected_target() {
            Some(target) => {
                let generation = self.poll.start(now);
                debug!("panes: capture chain {} for {}", generation, target.arg());
                Outcome::Command(Command::CapturePane { generation, target })
            }
            None => {
                self.poll.stop();
                Outcome::Changed
            }
        }
    }

    fn refresh(&mut self) -> Outcome {
        self.loading = true;
        Outcome::Command(Command::ListPanes)
    }

    fn attach(&mut self, ctx: &ViewContext) -> Outcome {
        if !ctx.config.features.interactive_input {
            return Outcome::Navigate(Action::Toast(
                Severity::Info,
                "Interactive input is off (features.interactive_input)".into(),
            ));
        }
        let Some(target) = self.selected_target() else {
            return Outcome::Ignored;
        };
        let session = InteractiveSession::new(target, ctx.config.input.double_press_window(), ctx.now);
        self.mode = ViewMode::Interactive(session);
        self.tab = DetailTab::Output;
        self.restart_capture(ctx.now)
    }

    /// Leave interactive mode.  The capture chain keeps running for the
    /// preview.
    fn detach(&mut self, reason: &str) {
        if let ViewMode::Interactive(session) = &mut self.mode {
            session.end(reason);
        }
        self.mode = ViewMode::Browse;
    }

    /// Queue `inputs` for the attached pane.  The capture chain restarts so
    /// the next capture comes at the fast rate, even after a long idle.
    fn send(&mut self, inputs: Vec<PaneInput>, now: Instant) -> Option<Command> {
        let ViewMode::Interactive(session) = &self.mode else {
            return None;
        };
        if inputs.is_empty() {
            return None;
        }
        let send = Command::SendToPane {
            target: session.target.clone(),
            inputs,
        };
        let generation = self.poll.start(now);
        let poll = Command::after(self.poll.next_delay(now), Completion::PollDue { generation });
        Some(Command::Batch(vec![send, poll]))
    }

    fn interactive_step(&mut self, step: KeyStep, now: Instant) -> Outcome {
        match step {
            KeyStep::Exit => {
                self.detach("user");
                Outcome::Changed
            }
            KeyStep::Nothing => Outcome::Ignored,
            KeyStep::Send(inputs) => match self.send(inputs, now) {
                Some(cmd) => Outcome::Command(cmd),
                None => Outcome::Ignored,
            },
            KeyStep::Arm { token, delay, send } => {
                let timer = Command::after(delay, Completion::EscapeTimeout { token });
                match self.send(send, now) {
                    Some(cmd) => Outcome::Command(Command::Batch(vec![cmd, timer])),
                    None => Outcome::Command(timer),
                }
            }
        }
    }

    fn session_lost(&mut self, err: &str) -> Outcome {
        warn!("panes: session lost: {}", err);
        self.detach("target gone");
        Outcome::Navigate(Action::Toast(Severity::Warning, format!("Session ended: {err}")))
    }

    fn browse_key(&mut self, key: KeyEvent, ctx: &ViewContext) -> Outcome {
        match key.code {
            KeyCode::Char('r') => return self.refresh(),
            KeyCode::Char('i') => return self.attach(ctx),
            KeyCode::Enter if ctx.focused == PaneId::Sidebar => return self.attach(ctx),
            KeyCode::Char('[') => return self.set_tab(DetailTab::Output),
            KeyCode::Char(']') => return self.set_tab(DetailTab::Info),
            _ => {}
        }
        if ctx.focused != PaneId::Sidebar {
            return Outcome::Ignored;
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
        if self.list.selected() == before {
            return Outcome::Ignored;
        }
        self.restart_capture(ctx.now)
    }

    fn set_tab(&mut self, tab: DetailTab) -> Outcome {
        let changed = self.tab != tab;
        self.tab = tab;
        Outcome::changed_if(changed)
    }

    fn sidebar_body(&mut self, inner: Rect, hits: &mut HitMap, focused: bool) -> String {
        let width = usize::from(inner.width);
        if self.list.is_empty() {
            return if let Some(err) = &self.load_error {
                paint(Tone::Danger, &text::truncate_end(err, width))
            } else if self.loading || !self.loaded {
                paint(Tone::Muted, "Listing panes...")
            } else {
                paint(Tone::Muted, "No tmux panes found.\nStart tmux, then press r.")
            };
        }
        self.list.resize(usize::from(inner.height));
        let selected = self.list.selected();
        let lines: Vec<String> = self
            .list
            .visible_items()
            .into_iter()
            .map(|(pos, pane)| {
                let line = text::pad_right(&text::truncate_end(&pane.label(), width), width);
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

    fn detail_body(&self, inner: Rect, hits: &mut HitMap, now: Instant) -> String {
        let (header, body) = layout::split_vertical(inner, HEADER_HEIGHT);
        let labels: Vec<&str> = DetailTab::ALL.iter().map(|t| t.label()).collect();
        let mut lines = vec![status_bar::tab_bar(
            &labels,
            self.tab.index(),
            header.x,
            header.y,
            header.width,
            hits,
            |i| HitPayload::Id(DetailTab::ALL[i].name().into()),
        )];
        if header.height > 1 {
            lines.push(status_bar::separator(header.width));
        }
        lines.truncate(usize::from(header.height));

        let width = usize::from(body.width);
        let rows = usize::from(body.height);
        let content = match self.tab {
            DetailTab::Output => self.output_text(width),
            DetailTab::Info => self.info_text(width, now),
        };
        // Newest output is at the bottom.
        let content: Vec<&str> = content.split('\n').collect();
        let skip = match self.tab {
            DetailTab::Output => content.len().saturating_sub(rows),
            DetailTab::Info => 0,
        };
        lines.extend(content.into_iter().skip(skip).take(rows).map(str::to_string));
        lines.join("\n")
    }

    fn output_text(&self, width: usize) -> String {
        let Some(pane) = self.list.selected_item() else {
            return paint(Tone::Muted, WELCOME);
        };
        if let Some(err) = &self.capture_error {
            return paint(Tone::Danger, &text::truncate_all_lines(err, width));
        }
        let Some(snapshot) = &self.snapshot else {
            return paint(Tone::Muted, &format!("Capturing {}...", pane.pane_id));
        };
        if snapshot.content.trim().is_empty() {
            return paint(Tone::Muted, "(pane is empty)");
        }
        let content = match &self.mode {
            ViewMode::Interactive(session) => render_with_cursor(&snapshot.content, session.cursor),
            ViewMode::Browse => snapshot.content.clone(),
        };
        text::truncate_all_lines(&content, width)
    }

    fn info_text(&self, width: usize, now: Instant) -> String {
        let Some(pane) = self.list.selected_item() else {
            return paint(Tone::Muted, WELCOME);
        };
        let state = match &self.mode {
            ViewMode::Interactive(_) => "attached",
            ViewMode::Browse => "browsing",
        };
        let poll = if self.poll.is_running() {
            format!("every {}ms", self.poll.next_delay(now).as_millis())
        } else {
            "stopped".to_string()
        };
        let rows = [
            ("Session", pane.session.clone()),
            ("Pane", pane.pane_id.clone()),
            ("Command", pane.command.clone()),
            ("Size", format!("{}x{}", pane.width, pane.height)),
            ("State", state.to_string()),
            ("Refresh", poll),
        ];
        rows.iter()
            .map(|(k, v)| {
                let line = format!("{} {}", paint(Tone::KeyHint, &format!("{k:<8}")), v);
                crate::ansi::truncate(&line, width)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Component for PaneViewer {
    fn id(&self) -> ViewId {
        ViewId::Panes
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &ViewContext) -> Outcome {
        match &mut self.mode {
            ViewMode::Interactive(session) => {
                let step = session.handle_key(key, ctx.now);
                self.interactive_step(step, ctx.now)
            }
            ViewMode::Browse => self.browse_key(key, ctx),
        }
    }

    fn handle_paste(&mut self, pasted: &str, ctx: &ViewContext) -> Outcome {
        let ViewMode::Interactive(session) = &mut self.mode else {
            return Outcome::Ignored;
        };
        let step = session.handle_paste(pasted, ctx.now);
        self.interactive_step(step, ctx.now)
    }

    fn handle_click(&mut self, region: &HitRegion, ctx: &ViewContext) -> Outcome {
        if self.is_interactive() {
            return Outcome::Ignored;
        }
        match region.kind.as_str() {
            KIND_ITEM => {
                let Some(pos) = region.payload.index() else {
                    return Outcome::Ignored;
                };
                if pos == self.list.selected() {
                    return Outcome::Ignored;
                }
                self.list.select(pos);
                self.restart_capture(ctx.now)
            }
            KIND_TAB => match region.payload.id().and_then(DetailTab::from_name) {
                Some(tab) => self.set_tab(tab),
                None => Outcome::Ignored,
            },
            KIND_PANE => match region.payload.id().and_then(PaneId::from_name) {
                Some(pane) => Outcome::Navigate(Action::FocusPane(pane)),
                None => Outcome::Ignored,
            },
            _ => Outcome::Ignored,
        }
    }

    fn handle_scroll(&mut self, delta: isize, region: Option<&HitRegion>, _ctx: &ViewContext) -> Outcome {
        let over_sidebar = region
            .and_then(|r| r.payload.id())
            .map_or(true, |id| id != PaneId::Detail.name());
        if self.is_interactive() || !over_sidebar {
            return Outcome::Ignored;
        }
        let before = self.list.scroll_state().offset;
        self.list.scroll_by(delta);
        Outcome::changed_if(self.list.scroll_state().offset != before)
    }

    fn on_completion(&mut self, completion: Completion, ctx: &ViewContext) -> Outcome {
        match completion {
            Completion::Panes(result) => {
                self.loading = false;
                self.loaded = true;
                match result {
                    Ok(panes) => {
                        info!("panes: {} listed", panes.len());
                        let previous = self.selected_target();
                        self.load_error = None;
                        self.list.set_items(panes);
                        let kept = previous.as_ref().and_then(|t| {
                            self.list.items.iter().position(|p| PaneTarget::from(p) == *t)
                        });
                        match kept {
                            Some(pos) => {
                                self.list.select(pos);
                                if self.poll.is_running() {
                                    return Outcome::Changed;
                                }
                            }
                            None if self.is_interactive() => {
                                return self.session_lost("pane no longer listed");
                            }
                            None => {}
                        }
                        self.restart_capture(ctx.now)
                    }
                    Err(e) => {
                        warn!("panes: list failed: {}", e);
                        self.load_error = Some(e.clone());
                        self.poll.stop();
                        Outcome::Navigate(Action::Toast(Severity::Error, format!("Listing panes failed: {e}")))
                    }
                }
            }
            Completion::PaneCaptured { generation, result } => {
                if !self.poll.is_current(generation) {
                    trace!("panes: stale capture {}", generation);
                    return Outcome::Ignored;
                }
                match result {
                    Ok(snapshot) => {
                        if let ViewMode::Interactive(session) = &mut self.mode {
                            session.cursor = snapshot.cursor;
                        }
                        self.snapshot = Some(snapshot);
                        self.capture_error = None;
                        let delay = self.poll.next_delay(ctx.now);
                        Outcome::Command(Command::after(delay, Completion::PollDue { generation }))
                    }
                    Err(e) => {
                        // No retry: the pane is treated as gone.
                        self.poll.stop();
                        self.capture_error = Some(e.clone());
                        if self.is_interactive() {
                            return self.session_lost(&e);
                        }
                        Outcome::Changed
                    }
                }
            }
            Completion::PollDue { generation } => {
                if !self.poll.is_current(generation) {
                    trace!("panes: stale poll {}", generation);
                    return Outcome::Ignored;
                }
                match self.selected_target() {
                    Some(target) => Outcome::Command(Command::CapturePane { generation, target }),
                    None => {
                        self.poll.stop();
                        Outcome::Ignored
                    }
                }
            }
            Completion::PaneSent { target, result } => {
                let current = match &self.mode {
                    ViewMode::Interactive(session) => session.target == target,
                    ViewMode::Browse => false,
                };
                match result {
                    Err(e) if current => self.session_lost(&e),
                    _ => Outcome::Ignored,
                }
            }
            Completion::EscapeTimeout { token } => {
                let ViewMode::Interactive(session) = &mut self.mode else {
                    return Outcome::Ignored;
                };
                match session.escape_timeout(token, ctx.now) {
                    Some(input) => match self.send(vec![input], ctx.now) {
                        Some(cmd) => Outcome::Command(cmd),
                        None => Outcome::Ignored,
                    },
                    None => Outcome::Ignored,
                }
            }
            _ => Outcome::Ignored,
        }
    }

    fn activate(&mut self, ctx: &ViewContext) -> Outcome {
        if !self.loaded && !self.loading {
            return self.refresh();
        }
        if self.poll.is_running() {
            return Outcome::Ignored;
        }
        self.restart_capture(ctx.now)
    }

    fn deactivate(&mut self) {
        self.detach("view left");
        self.poll.stop();
    }

    fn render(&mut self, area: Rect, hits: &mut HitMap, ctx: &ViewContext) -> String {
        let (sidebar, detail) = layout::sidebar_detail(area, &ctx.config.ui, ctx.sidebar_visible);
        let mut blocks = Vec::with_capacity(2);

        if sidebar.is_visible() {
            hits.add(KIND_PANE, sidebar.area, HitPayload::Id(PaneId::Sidebar.name().into()));
            let focused = ctx.focused == PaneId::Sidebar && !self.is_interactive();
            let body = self.sidebar_body(sidebar.inner(1), hits, focused);
            let count = self.list.len().to_string();
            let badge = (!self.list.is_empty()).then(|| Badge {
                text: &count,
                tone: Tone::Muted,
            });
            let a = sidebar.area;
            blocks.push((a, pane_chrome("Panes", Some('1'), focused, badge, &body, a.width, a.height)));
        }

        hits.add(KIND_PANE, detail.area, HitPayload::Id(PaneId::Detail.name().into()));
        let focused = ctx.focused == PaneId::Detail || self.is_interactive();
        let body = self.detail_body(detail.inner(1), hits, ctx.now);
        let title = self
            .list
            .selected_item()
            .map_or_else(|| "Preview".to_string(), |p| format!("{} {}", p.session, p.pane_id));
        let badge = self.is_interactive().then_some(Badge {
            text: "LIVE",
            tone: Tone::Danger,
        });
        let a = detail.area;
        blocks.push((a, pane_chrome(&title, Some('2'), focused, badge, &body, a.width, a.height)));

        overlay::compose(area, &blocks)
    }

    fn captures_input(&self) -> bool {
        self.is_interactive()
    }

    fn input_mode(&self) -> InputMode {
        if self.is_interactive() {
            InputMode::Interactive
        } else {
            InputMode::Normal
        }
    }

    fn key_hints(&self) -> &'static [KeyHint] {
        if self.is_interactive() {
            INTERACTIVE_HINTS
        } else {
            BROWSE_HINTS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;
    use crate::tmux::CursorPos;
    use panedeck_proto::config::Config;
    use ratatui::crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctx(config: &Config, now: Instant) -> ViewContext<'_> {
        ViewContext {
            focused: PaneId::Sidebar,
            sidebar_visible: true,
            config,
            now,
        }
    }

    fn pane(session: &str, id: &str, command: &str) -> PaneRecord {
        PaneRecord {
            session: session.into(),
            pane_id: id.into(),
            command: command.into(),
            width: 80,
            height: 24,
        }
    }

    fn interactive_config() -> Config {
        let mut config = Config::default();
        config.features.interactive_input = true;
        config
    }

    /// Listed panes; returns the viewer and the generation of the first capture.
    fn listed(config: &Config, now: Instant) -> (PaneViewer, u64) {
        let mut view = PaneViewer::new(PollPolicy::default(), now);
        assert_eq!(view.activate(&ctx(config, now)), Outcome::Command(Command::ListPanes));
        let panes = vec![pane("main", "%1", "zsh"), pane("main", "%2", "vim"), pane("work", "%7", "htop")];
        match view.on_completion(Completion::Panes(Ok(panes)), &ctx(config, now)) {
            Outcome::Command(Command::CapturePane { generation, target }) => {
                assert_eq!(target, PaneTarget::new("main", "%1"));
                (view, generation)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    /// Split a send batch into the inputs, the poll generation and its delay.
    fn sent(outcome: Outcome) -> (Vec<PaneInput>, u64, Duration) {
        let commands = match outcome {
            Outcome::Command(Command::Batch(commands)) => commands,
            other => panic!("unexpected {other:?}"),
        };
        match commands.as_slice() {
            [Command::SendToPane { target, inputs }, Command::After { delay, completion }] => {
                assert_eq!(*target, PaneTarget::new("main", "%1"));
                match **completion {
                    Completion::PollDue { generation } => (inputs.clone(), generation, *delay),
                    ref other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    fn snapshot(content: &str) -> PaneSnapshot {
        PaneSnapshot {
            content: content.into(),
            cursor: Some(CursorPos { row: 0, col: 2, visible: true }),
        }
    }

    #[test]
    fn test_capture_rearms_and_stale_generation_drops() {
        let config = Config::default();
        let now = Instant::now();
        let (mut view, first) = listed(&config, now);

        let done = Completion::PaneCaptured { generation: first, result: Ok(snapshot("$ ls")) };
        match view.on_completion(done, &ctx(&config, now)) {
            Outcome::Command(Command::After { delay, completion }) => {
                assert_eq!(delay, PollPolicy::default().fast);
                assert_eq!(*completion, Completion::PollDue { generation: first });
            }
            other => panic!("unexpected {other:?}"),
        }

        // Selecting another pane restarts the chain.
        let second = match view.handle_key(key(KeyCode::Char('j')), &ctx(&config, now)) {
            Outcome::Command(Command::CapturePane { generation, target }) => {
                assert_eq!(target.pane_id, "%2");
                generation
            }
            other => panic!("unexpected {other:?}"),
        };
        assert_ne!(first, second);
        let late = Completion::PollDue { generation: first };
        assert_eq!(view.on_completion(late, &ctx(&config, now)), Outcome::Ignored);
        let late = Completion::PaneCaptured { generation: first, result: Ok(snapshot("old")) };
        assert_eq!(view.on_completion(late, &ctx(&config, now)), Outcome::Ignored);
    }

    #[test]
    fn test_poll_slows_down_when_idle() {
        let config = Config::default();
        let start = Instant::now();
        let (mut view, generation) = listed(&config, start);
        let later = start + Duration::from_secs(config.polling.slow_after_secs + 1);
        let done = Completion::PaneCaptured { generation, result: Ok(snapshot("$")) };
        match view.on_completion(done, &ctx(&config, later)) {
            Outcome::Command(Command::After { delay, .. }) => {
                assert_eq!(delay, Duration::from_millis(config.polling.slow_ms));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_deactivate_stops_chain() {
        let config = Config::default();
        let now = Instant::now();
        let (mut view, generation) = listed(&config, now);
        view.deactivate();
        let due = Completion::PollDue { generation };
        assert_eq!(view.on_completion(due, &ctx(&config, now)), Outcome::Ignored);
        // Coming back starts a fresh chain.
        assert!(matches!(
            view.activate(&ctx(&config, now)),
            Outcome::Command(Command::CapturePane { .. })
        ));
    }

    #[test]
    fn test_attach_gated_by_feature_flag() {
        let config = Config::default();
        let now = Instant::now();
        let (mut view, _) = listed(&config, now);
        assert!(matches!(
            view.handle_key(key(KeyCode::Char('i')), &ctx(&config, now)),
            Outcome::Navigate(Action::Toast(Severity::Info, _))
        ));
        assert!(!view.is_interactive());
    }

    #[test]
    fn test_interactive_forwards_keys_and_detaches() {
        let config = interactive_config();
        let now = Instant::now();
        let (mut view, _) = listed(&config, now);
        assert!(matches!(
            view.handle_key(key(KeyCode::Char('i')), &ctx(&config, now)),
            Outcome::Command(Command::CapturePane { .. })
        ));
        assert!(view.captures_input());
        assert_eq!(view.input_mode(), InputMode::Interactive);

        let (inputs, _, _) = sent(view.handle_key(key(KeyCode::Char('q')), &ctx(&config, now)));
        assert_eq!(inputs, vec![PaneInput::Literal("q".into())]);

        let ctrl_backslash = KeyEvent::new(KeyCode::Char('\\'), KeyModifiers::CONTROL);
        assert_eq!(view.handle_key(ctrl_backslash, &ctx(&config, now)), Outcome::Changed);
        assert!(!view.is_interactive());
    }

    #[test]
    fn test_single_escape_is_held_then_sent() {
        let config = interactive_config();
        let now = Instant::now();
        let (mut view, _) = listed(&config, now);
        view.handle_key(key(KeyCode::Char('i')), &ctx(&config, now));

        let token = match view.handle_key(key(KeyCode::Esc), &ctx(&config, now)) {
            Outcome::Command(Command::After { delay, completion }) => {
                assert_eq!(delay, config.input.double_press_window());
                match *completion {
                    Completion::EscapeTimeout { token } => token,
                    other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        };
        let fired = Completion::EscapeTimeout { token };
        let later = now + Duration::from_millis(200);
        let (inputs, _, _) = sent(view.on_completion(fired.clone(), &ctx(&config, later)));
        assert_eq!(inputs, vec![PaneInput::key("Escape")]);
        // The same timer never fires twice.
        assert_eq!(view.on_completion(fired, &ctx(&config, later)), Outcome::Ignored);
    }

    #[test]
    fn test_typing_after_idle_pulls_capture_forward() {
        let config = interactive_config();
        let now = Instant::now();
        let (mut view, _) = listed(&config, now);
        let generation = match view.handle_key(key(KeyCode::Char('i')), &ctx(&config, now)) {
            Outcome::Command(Command::CapturePane { generation, .. }) => generation,
            other => panic!("unexpected {other:?}"),
        };

        // Idle long enough that the chain re-arms at the slow rate.
        let idle = now + Duration::from_secs(20);
        let captured = Completion::PaneCaptured { generation, result: Ok(snapshot("$ ")) };
        match view.on_completion(captured, &ctx(&config, idle)) {
            Outcome::Command(Command::After { delay, .. }) => {
                assert_eq!(delay, Duration::from_millis(config.polling.slow_ms));
            }
            other => panic!("unexpected {other:?}"),
        }

        let (inputs, fresh, delay) = sent(view.handle_key(key(KeyCode::Char('x')), &ctx(&config, idle)));
        assert_eq!(inputs, vec![PaneInput::Literal("x".into())]);
        assert_eq!(delay, Duration::from_millis(config.polling.fast_ms));
        assert_ne!(fresh, generation);

        // The slow wake-up armed before the keystroke is stale now.
        let stale = Completion::PollDue { generation };
        assert_eq!(view.on_completion(stale, &ctx(&config, idle)), Outcome::Ignored);
        assert!(matches!(
            view.on_completion(Completion::PollDue { generation: fresh }, &ctx(&config, idle)),
            Outcome::Command(Command::CapturePane { .. })
        ));
    }

    #[test]
    fn test_double_escape_detaches() {
        let config = interactive_config();
        let now = Instant::now();
        let (mut view, _) = listed(&config, now);
        view.handle_key(key(KeyCode::Char('i')), &ctx(&config, now));
        view.handle_key(key(KeyCode::Esc), &ctx(&config, now));
        let soon = now + Duration::from_millis(50);
        assert_eq!(view.handle_key(key(KeyCode::Esc), &ctx(&config, soon)), Outcome::Changed);
        assert!(!view.is_interactive());
    }

    #[test]
    fn test_failed_send_ends_session() {
        let config = interactive_config();
        let now = Instant::now();
        let (mut view, _) = listed(&config, now);
        view.handle_key(key(KeyCode::Char('i')), &ctx(&config, now));
        let failed = Completion::PaneSent {
            target: PaneTarget::new("main", "%1"),
            result: Err("can't find pane: %1".into()),
        };
        assert!(matches!(
            view.on_completion(failed, &ctx(&config, now)),
            Outcome::Navigate(Action::Toast(Severity::Warning, _))
        ));
        assert!(!view.is_interactive());
    }

    #[test]
    fn test_failed_capture_ends_session() {
        let config = interactive_config();
        let now = Instant::now();
        let (mut view, _) = listed(&config, now);
        let generation = match view.handle_key(key(KeyCode::Char('i')), &ctx(&config, now)) {
            Outcome::Command(Command::CapturePane { generation, .. }) => generation,
            other => panic!("unexpected {other:?}"),
        };
        let failed = Completion::PaneCaptured { generation, result: Err("session main is gone".into()) };
        assert!(matches!(
            view.on_completion(failed, &ctx(&config, now)),
            Outcome::Navigate(Action::Toast(Severity::Warning, _))
        ));
        assert!(!view.is_interactive());
        let mut hits = HitMap::new();
        let area = Rect { x: 0, y: 0, width: 100, height: 12 };
        let frame = view.render(area, &mut hits, &ctx(&config, now));
        assert!(ansi::strip(&frame).contains("session main is gone"));
    }

    #[test]
    fn test_render_tabs_and_clipped_output() {
        let config = Config::default();
        let now = Instant::now();
        let (mut view, generation) = listed(&config, now);
        let long = format!("a\tb\n{}", "x".repeat(300));
        view.on_completion(
            Completion::PaneCaptured { generation, result: Ok(snapshot(&long)) },
            &ctx(&config, now),
        );

        let area = Rect { x: 0, y: 1, width: 100, height: 12 };
        let mut hits = HitMap::new();
        hits.begin_frame(100, 14);
        let frame = view.render(area, &mut hits, &ctx(&config, now));
        let lines: Vec<&str> = frame.split('\n').collect();
        assert_eq!(lines.len(), 12);
        assert!(lines.iter().all(|l| ansi::width(l) == 100));
        let plain = ansi::strip(&frame);
        assert!(plain.contains("a       b"));
        assert!(plain.contains(" 1 Output "));

        let tab = hits.regions(KIND_TAB)[1].clone();
        assert_eq!(view.handle_click(&tab, &ctx(&config, now)), Outcome::Changed);
        assert_eq!(view.tab(), DetailTab::Info);
        let frame = view.render(area, &mut hits, &ctx(&config, now));
        assert!(ansi::strip(&frame).contains("vim") || ansi::strip(&frame).contains("zsh"));
        assert!(ansi::strip(&frame).contains("80x24"));
    }

    #[test]
    fn test_placeholders() {
        let config = Config::default();
        let now = Instant::now();
        let mut view = PaneViewer::new(PollPolicy::default(), now);
        let area = Rect { x: 0, y: 0, width: 100, height: 10 };
        let mut hits = HitMap::new();
        let frame = ansi::strip(&view.render(area, &mut hits, &ctx(&config, now)));
        assert!(frame.contains("Listing panes..."));
        assert!(frame.contains("Select a pane"));

        view.on_completion(Completion::Panes(Ok(Vec::new())), &ctx(&config, now));
        let frame = ansi::strip(&view.render(area, &mut hits, &ctx(&config, now)));
        assert!(frame.contains("No tmux panes found."));
    }
}
