//! App: event loop, frame compositor and command executor.
//!
//! Architecture:
//! - `App` owns both views, the workspace state and the app-level overlays
//!   (help, quit confirmation, toasts).
//! - Every frame is rebuilt from scratch as one string together with its
//!   `HitMap`; the next mouse event is routed against that map.
//! - Views answer input with an `Outcome`.  Actions are applied here,
//!   commands are returned to the loop, which runs them off the loop and
//!   feeds the `Completion` back in as an `AppMessage`.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use panedeck_proto::config::Config;
use ratatui::crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ansi_to_tui::IntoText;
use ratatui::layout::Rect;
use ratatui::text::Text;
use ratatui::widgets::Paragraph;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::action::{Action, Command, Completion, PaneId, ViewId};
use crate::ansi;
use crate::component::{Component, ViewContext};
use crate::components::confirm_dialog::{ConfirmDialog, ConfirmOutcome};
use crate::components::help_overlay::HelpOverlay;
use crate::components::issue_list::IssueList;
use crate::components::pane_viewer::PaneViewer;
use crate::dispatch::{self, InputEvent, Outcome, Route, Target};
use crate::hitmap::{HitMap, HitPayload, HitRegion, KIND_PANE, KIND_TAB};
use crate::overlay;
use crate::poll::{self, PollPolicy};
use crate::provider::IssueSource;
use crate::tmux::{self, SendQueue};
use crate::widgets::status_bar::{self, InputMode};
use crate::widgets::toast::{Severity, ToastManager};
use crate::workspace::{load_ui_session_state, save_ui_session_state, WorkspaceManager};

const TICK: Duration = Duration::from_millis(100);
/// Messages handled per wake-up before the next redraw.
const MAX_DRAIN: usize = 256;

// ── Internal event bus ────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum AppMessage {
    Input(InputEvent),
    Completion(Completion),
}

/// Global bindings, consulted when no modal is open and the view does not
/// capture input.
pub fn global_action(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') => Some(Action::RequestQuit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('K') => Some(Action::ToggleKeys),
        KeyCode::Char('\\') => Some(Action::ToggleSidebar),
        KeyCode::Char('h') => Some(Action::FocusPane(PaneId::Sidebar)),
        KeyCode::Char('l') => Some(Action::FocusPane(PaneId::Detail)),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
            ViewId::from_index(index).map(Action::SwitchView)
        }
        _ => None,
    }
}

/// Turn a composed frame into ratatui `Text`.  A frame the parser rejects is
/// drawn unstyled rather than dropped.
pub fn frame_text(frame: &str) -> Text<'static> {
    match frame.into_text() {
        Ok(text) => text,
        Err(e) => {
            warn!("frame: ansi parse failed: {}", e);
            Text::raw(ansi::strip(frame))
        }
    }
}

struct Views {
    issues: IssueList,
    panes: PaneViewer,
}

impl Views {
    fn get_mut(&mut self, id: ViewId) -> &mut dyn Component {
        match id {
            ViewId::Issues => &mut self.issues,
            ViewId::Panes => &mut self.panes,
        }
    }

    fn get(&self, id: ViewId) -> &dyn Component {
        match id {
            ViewId::Issues => &self.issues,
            ViewId::Panes => &self.panes,
        }
    }
}

fn context<'a>(wm: &WorkspaceManager, config: &'a Config, now: Instant) -> ViewContext<'a> {
    ViewContext {
        focused: wm.focused(),
        sidebar_visible: wm.sidebar_visible(),
        config,
        now,
    }
}

pub struct App {
    config: Config,
    wm: WorkspaceManager,
    views: Views,
    help: HelpOverlay,
    quit_confirm: Option<ConfirmDialog>,
    toasts: ToastManager,
    hits: HitMap,
    issues_source: Arc<dyn IssueSource>,
    ui_state_path: Option<PathBuf>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        issues_source: Arc<dyn IssueSource>,
        ui_state_path: Option<PathBuf>,
        now: Instant,
    ) -> Self {
        let mut wm = WorkspaceManager::new(config.ui.show_keys_bar);
        if let Some(path) = &ui_state_path {
            wm.restore(&load_ui_session_state(path));
        }
        let views = Views {
            issues: IssueList::new(config.ui.modal_width),
            panes: PaneViewer::new(PollPolicy::from(&config.polling), now),
        };
        Self {
            config,
            wm,
            views,
            help: HelpOverlay::new(),
            quit_confirm: None,
            toasts: ToastManager::new(),
            hits: HitMap::new(),
            issues_source,
            ui_state_path,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn view(&self) -> ViewId {
        self.wm.view
    }

    pub fn focused(&self) -> PaneId {
        self.wm.focused()
    }

    pub fn hits(&self) -> &HitMap {
        &self.hits
    }

    pub fn help_visible(&self) -> bool {
        self.help.visible
    }

    pub fn quit_pending(&self) -> bool {
        self.quit_confirm.is_some()
    }

    pub fn issues(&self) -> &IssueList {
        &self.views.issues
    }

    pub fn panes(&self) -> &PaneViewer {
        &self.views.panes
    }

    /// Commands for the first frame: the restored view loads its data.
    pub fn start(&mut self, now: Instant) -> Vec<Command> {
        info!("app: starting on {:?}", self.wm.view);
        let mut commands = Vec::new();
        let ctx = context(&self.wm, &self.config, now);
        let outcome = self.views.get_mut(self.wm.view).activate(&ctx);
        self.apply(outcome, now, &mut commands);
        commands
    }

    fn has_modal(&self) -> bool {
        self.quit_confirm.is_some() || self.help.visible || self.views.get(self.wm.view).has_modal()
    }

    // ── Frame ─────────────────────────────────────────────────────────────────

    /// Build the whole frame (exactly `width × height`) and its hit map.
    pub fn frame(&mut self, width: u16, height: u16, now: Instant) -> String {
        self.hits.begin_frame(width, height);
        let full = Rect { x: 0, y: 0, width, height };
        let keys_h = u16::from(self.wm.show_keys_bar && height > 2);
        let header = Rect { height: height.min(1), ..full };
        let body = Rect {
            y: header.height,
            height: height.saturating_sub(header.height + keys_h),
            ..full
        };
        let keys = Rect {
            y: height.saturating_sub(keys_h),
            height: keys_h,
            ..full
        };

        let view = self.wm.view;
        let titles: Vec<&str> = ViewId::ALL.iter().map(|v| v.title()).collect();
        let tabs = status_bar::tab_bar(&titles, view.index(), 0, 0, width, &mut self.hits, HitPayload::Index);

        let ctx = context(&self.wm, &self.config, now);
        let component = self.views.get_mut(view);
        let content = if body.height > 0 {
            component.render(body, &mut self.hits, &ctx)
        } else {
            String::new()
        };
        let mode = if self.quit_confirm.is_some() || self.help.visible {
            InputMode::Modal
        } else {
            component.input_mode()
        };
        let keys_line = status_bar::keys_bar(mode, component.key_hints(), width);

        let mut frame = overlay::compose(full, &[(header, tabs), (body, content), (keys, keys_line)]);

        // One modal at a time, the most urgent one.
        let rendered = if let Some(confirm) = &mut self.quit_confirm {
            Some(confirm.render(width, height, &mut self.hits))
        } else if self.help.visible {
            self.help.render(width, height, &mut self.hits)
        } else {
            self.views.get_mut(view).render_modal(width, height, &mut self.hits)
        };
        if let Some(modal) = rendered {
            frame = modal.composite(&frame, width, height);
        }

        self.toasts.overlay(&frame, width, height)
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Handle one input event.  Returns whether a redraw is needed and
    /// appends any commands to run.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant, commands: &mut Vec<Command>) -> bool {
        let route = dispatch::route(event, self.has_modal(), self.wm.focused(), &self.hits);
        trace!(?route, "input routed");
        match route {
            Route::Drop => false,
            Route::Resize { width, height } => {
                debug!("app: resize {}x{}", width, height);
                true
            }
            Route::Key { target: Target::Modal, key } => self.modal_key(key, now, commands),
            Route::Key { target: Target::Pane(_), key } => self.pane_key(key, now, commands),
            Route::Paste { text, .. } => {
                if self.quit_confirm.is_some() || self.help.visible {
                    return false;
                }
                let ctx = context(&self.wm, &self.config, now);
                let outcome = self.views.get_mut(self.wm.view).handle_paste(&text, &ctx);
                self.apply(outcome, now, commands)
            }
            Route::Click { region } => self.click(&region, now, commands),
            Route::Hover { region } => self.hover(Some(&region), now, commands),
            Route::HoverCleared => self.hover(None, now, commands),
            Route::Scroll { delta, region } => {
                if self.quit_confirm.is_some() {
                    return false;
                }
                if self.help.visible {
                    return self.help.scroll_by(delta);
                }
                let ctx = context(&self.wm, &self.config, now);
                let outcome = self.views.get_mut(self.wm.view).handle_scroll(delta, region.as_ref(), &ctx);
                self.apply(outcome, now, commands)
            }
        }
    }

    fn modal_key(&mut self, key: KeyEvent, now: Instant, commands: &mut Vec<Command>) -> bool {
        if let Some(confirm) = &mut self.quit_confirm {
            return match confirm.handle_key(key) {
                ConfirmOutcome::Confirmed => self.apply_action(Action::Quit, now, commands),
                ConfirmOutcome::Cancelled => {
                    self.quit_confirm = None;
                    true
                }
                ConfirmOutcome::Changed => true,
                ConfirmOutcome::Ignored => false,
            };
        }
        if self.help.visible {
            // Scrolling keys change the help body too; always redraw.
            self.help.handle_key(key);
            self.wm.show_help = self.help.visible;
            return true;
        }
        let ctx = context(&self.wm, &self.config, now);
        let outcome = self.views.get_mut(self.wm.view).handle_key(key, &ctx);
        self.apply(outcome, now, commands)
    }

    fn pane_key(&mut self, key: KeyEvent, now: Instant, commands: &mut Vec<Command>) -> bool {
        let captures = self.views.get(self.wm.view).captures_input();
        if !captures {
            if let Some(action) = global_action(&key) {
                return self.apply_action(action, now, commands);
            }
        }
        let ctx = context(&self.wm, &self.config, now);
        let outcome = self.views.get_mut(self.wm.view).handle_key(key, &ctx);
        self.apply(outcome, now, commands)
    }

    fn click(&mut self, region: &HitRegion, now: Instant, commands: &mut Vec<Command>) -> bool {
        if let Some(confirm) = &mut self.quit_confirm {
            return match confirm.handle_click(region) {
                ConfirmOutcome::Confirmed => self.apply_action(Action::Quit, now, commands),
                ConfirmOutcome::Cancelled => {
                    self.quit_confirm = None;
                    true
                }
                _ => false,
            };
        }
        if self.help.visible {
            let closed = self.help.handle_click(region);
            self.wm.show_help = self.help.visible;
            return closed;
        }

        let view_has_modal = self.views.get(self.wm.view).has_modal();
        if !view_has_modal {
            // The header tab row belongs to the app.
            if region.kind == KIND_TAB && region.area.y == 0 {
                if let Some(view) = region.payload.index().and_then(ViewId::from_index) {
                    return self.apply_action(Action::SwitchView(view), now, commands);
                }
            }
            // Clicking anywhere inside a pane focuses it.
            let (x, y) = (region.area.x, region.area.y);
            if let Some(pane) = self.hits.lookup(KIND_PANE, x, y).and_then(|p| p.id()).and_then(PaneId::from_name) {
                self.wm.focus_pane(pane);
            }
        }
        let ctx = context(&self.wm, &self.config, now);
        let outcome = self.views.get_mut(self.wm.view).handle_click(region, &ctx);
        self.apply(outcome, now, commands) || !view_has_modal
    }

    fn hover(&mut self, region: Option<&HitRegion>, now: Instant, commands: &mut Vec<Command>) -> bool {
        if let Some(confirm) = &mut self.quit_confirm {
            return confirm.handle_hover(region) != ConfirmOutcome::Ignored;
        }
        if self.help.visible {
            return self.help.handle_hover(region);
        }
        let ctx = context(&self.wm, &self.config, now);
        let outcome = self.views.get_mut(self.wm.view).handle_hover(region, &ctx);
        self.apply(outcome, now, commands)
    }

    // ── Completions and ticks ─────────────────────────────────────────────────

    pub fn on_completion(&mut self, completion: Completion, now: Instant, commands: &mut Vec<Command>) -> bool {
        let owner = completion.view();
        let ctx = context(&self.wm, &self.config, now);
        let outcome = self.views.get_mut(owner).on_completion(completion, &ctx);
        // Background views update silently; only the active one redraws.
        self.apply(outcome, now, commands) && owner == self.wm.view
    }

    pub fn tick(&mut self, now: Instant, commands: &mut Vec<Command>) -> bool {
        let expired = self.toasts.tick_at(now);
        let ctx = context(&self.wm, &self.config, now);
        let outcome = self.views.get_mut(self.wm.view).tick(&ctx);
        self.apply(outcome, now, commands) || expired
    }

    // ── Outcomes and actions ──────────────────────────────────────────────────

    fn apply(&mut self, outcome: Outcome, now: Instant, commands: &mut Vec<Command>) -> bool {
        match outcome {
            Outcome::Ignored => false,
            Outcome::Changed => true,
            Outcome::Navigate(action) => self.apply_action(action, now, commands),
            Outcome::Command(command) => {
                commands.push(command);
                true
            }
        }
    }

    fn apply_action(&mut self, action: Action, now: Instant, commands: &mut Vec<Command>) -> bool {
        debug!(?action, "app: action");
        match action {
            Action::SwitchView(view) => {
                let previous = self.wm.view;
                if !self.wm.set_view(view) {
                    return false;
                }
                self.views.get_mut(previous).deactivate();
                let ctx = context(&self.wm, &self.config, now);
                let outcome = self.views.get_mut(view).activate(&ctx);
                self.apply(outcome, now, commands);
                true
            }
            Action::NextView => self.apply_action(Action::SwitchView(self.wm.view.next()), now, commands),
            Action::FocusPane(pane) => self.wm.focus_pane(pane),
            Action::ToggleSidebar => {
                self.wm.toggle_sidebar();
                true
            }
            Action::ToggleHelp => {
                self.help.toggle();
                self.wm.show_help = self.help.visible;
                true
            }
            Action::ToggleKeys => {
                self.wm.show_keys_bar = !self.wm.show_keys_bar;
                true
            }
            Action::Toast(severity, message) => {
                self.toasts.push_at(message, severity, now);
                true
            }
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let shown = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text
                        };
                        self.toasts.push_at(format!("copied: {shown}"), Severity::Success, now);
                    }
                    Err(e) => {
                        warn!("clipboard: {}", e);
                        self.toasts.push_at(format!("clipboard unavailable: {e}"), Severity::Error, now);
                    }
                }
                true
            }
            Action::RequestQuit => {
                self.quit_confirm = Some(
                    ConfirmDialog::new("Quit panedeck?", "Leave the dashboard?").labels("Quit", "Cancel"),
                );
                true
            }
            Action::Quit => {
                info!("app: quit");
                self.should_quit = true;
                true
            }
        }
    }

    pub fn save_ui_session_state(&self) {
        let Some(path) = &self.ui_state_path else {
            return;
        };
        if let Err(e) = save_ui_session_state(path, &self.wm.session_state()) {
            warn!("ui state: save failed: {}", e);
        }
    }

    // ── Command executor ──────────────────────────────────────────────────────

    fn execute(&self, command: Command, tx: &mpsc::UnboundedSender<AppMessage>, sends: &SendQueue) {
        trace!(?command, "execute");
        match command {
            Command::LoadIssues => {
                let source = Arc::clone(&self.issues_source);
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let result = source.list().map_err(|e| e.to_string());
                    let _ = tx.send(AppMessage::Completion(Completion::Issues(result)));
                });
            }
            Command::SearchIssues { token, query } => {
                let source = Arc::clone(&self.issues_source);
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let result = source.search(&query).map_err(|e| e.to_string());
                    let _ = tx.send(AppMessage::Completion(Completion::SearchResults { token, query, result }));
                });
            }
            Command::FetchIssue { token, id } => {
                let source = Arc::clone(&self.issues_source);
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let result = source.get(&id).map_err(|e| e.to_string());
                    let _ = tx.send(AppMessage::Completion(Completion::IssueLoaded { token, result }));
                });
            }
            Command::ListPanes => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = tmux::list_panes().await.map_err(|e| e.to_string());
                    let _ = tx.send(AppMessage::Completion(Completion::Panes(result)));
                });
            }
            Command::CapturePane { generation, target } => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = tmux::snapshot(&target).await.map_err(|e| e.to_string());
                    let _ = tx.send(AppMessage::Completion(Completion::PaneCaptured { generation, result }));
                });
            }
            Command::SendToPane { target, inputs } => {
                // Queued, not spawned: keystrokes reach the pane in typing order.
                if !sends.push(target, inputs) {
                    warn!("tmux: send queue closed, input dropped");
                }
            }
            Command::After { delay, completion } => {
                poll::schedule(tx.clone(), delay, AppMessage::Completion(*completion));
            }
            Command::Batch(commands) => {
                for command in commands {
                    self.execute(command, tx, sends);
                }
            }
        }
    }

    fn handle_message(&mut self, msg: AppMessage, commands: &mut Vec<Command>) -> bool {
        let now = Instant::now();
        match msg {
            AppMessage::Input(event) => self.handle_input(event, now, commands),
            AppMessage::Completion(completion) => self.on_completion(completion, now, commands),
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if self.config.ui.mouse {
            execute!(stdout, EnterAlternateScreen, EnableMouseCapture, event::EnableBracketedPaste)?;
        } else {
            execute!(stdout, EnterAlternateScreen, event::EnableBracketedPaste)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        self.save_ui_session_state();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            event::DisableBracketedPaste,
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    let Some(input) = InputEvent::from_terminal(ev) else {
                        continue;
                    };
                    if event_tx.send(AppMessage::Input(input)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("terminal event read failed: {}", e);
                    break;
                }
            }
        });

        let done_tx = tx.clone();
        let sends = SendQueue::spawn(
            |target, inputs| async move { tmux::send_inputs(&target, &inputs).await },
            move |target, result| {
                let result = result.map_err(|e| e.to_string());
                let _ = done_tx.send(AppMessage::Completion(Completion::PaneSent { target, result }));
            },
        );

        let mut tick = tokio::time::interval(TICK);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut commands = self.start(Instant::now());
        let mut needs_redraw = true;
        loop {
            for command in commands.drain(..) {
                self.execute(command, &tx, &sends);
            }
            if needs_redraw {
                terminal.draw(|f| {
                    let area = f.area();
                    let frame = self.frame(area.width, area.height, Instant::now());
                    f.render_widget(Paragraph::new(frame_text(&frame)), area);
                })?;
            }

            if self.should_quit {
                break;
            }

            needs_redraw = tokio::select! {
                Some(msg) = rx.recv() => {
                    let mut redraw = self.handle_message(msg, &mut commands);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let Ok(next) = rx.try_recv() else {
                            break;
                        };
                        drained += 1;
                        redraw |= self.handle_message(next, &mut commands);
                    }
                    redraw
                }
                _ = tick.tick() => self.tick(Instant::now(), &mut commands),
            };
        }
        Ok(())
    }
}
