//! Interactive passthrough to a live tmux pane.
//!
//! While attached, keystrokes are translated to tmux key names and forwarded;
//! the pane's content is polled back and drawn with a reverse-video cursor.
//!
//! Leaving the mode:
//! - `Ctrl+\` exits immediately.
//! - `Esc Esc` within the double-press window exits.  A single `Esc` is held
//!   back for that window and then forwarded, or forwarded right away when
//!   any other key arrives first.
//! - Any failed send or poll means the pane is gone: the session ends.

use std::time::{Duration, Instant};

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::ansi;
use crate::double_press::{DoublePress, Press};
use crate::theme::{paint, Tone};
use crate::tmux::{CursorPos, PaneTarget};

/// Longer typed-looking input is treated as a paste.
pub const PASTE_MIN_CHARS: usize = 10;

/// One unit of input for the attached pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneInput {
    /// tmux key name (`Enter`, `C-c`, `F5`).
    Key(String),
    /// Text sent with `send-keys -l`.
    Literal(String),
    /// Text sent through a paste buffer.
    Paste(String),
}

impl PaneInput {
    pub fn key(name: &str) -> Self {
        Self::Key(name.to_string())
    }
}

/// What the view must do after a key in interactive mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStep {
    Exit,
    /// Hold an Escape: schedule a wake-up carrying `token` after `delay`.
    /// `send` holds anything that must go out right now.
    Arm {
        token: u64,
        delay: Duration,
        send: Vec<PaneInput>,
    },
    Send(Vec<PaneInput>),
    Nothing,
}

/// tmux key name or literal text for a terminal key event.
pub fn map_key(key: &KeyEvent) -> Option<PaneInput> {
    let named = match key.code {
        KeyCode::Enter => "Enter",
        KeyCode::Backspace => "BSpace",
        KeyCode::Delete => "DC",
        KeyCode::Tab => "Tab",
        KeyCode::BackTab => "BTab",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PPage",
        KeyCode::PageDown => "NPage",
        KeyCode::Insert => "IC",
        KeyCode::Esc => "Escape",
        KeyCode::F(n @ 1..=12) => return Some(PaneInput::Key(format!("F{n}"))),
        KeyCode::Char(c) => return map_char(c, key.modifiers),
        _ => return None,
    };
    Some(PaneInput::key(named))
}

fn map_char(c: char, mods: KeyModifiers) -> Option<PaneInput> {
    if mods.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() {
        return Some(PaneInput::Key(format!("C-{}", c.to_ascii_lowercase())));
    }
    if mods.contains(KeyModifiers::ALT) {
        return Some(PaneInput::Key(format!("M-{c}")));
    }
    if c == ' ' {
        return Some(PaneInput::key("Space"));
    }
    Some(PaneInput::Literal(c.to_string()))
}

/// Multi-character input that contains a newline or is too long to have
/// been typed.
pub fn is_paste(text: &str) -> bool {
    let n = text.chars().count();
    n > 1 && (text.contains('\n') || n > PASTE_MIN_CHARS)
}

/// `Ctrl+\`.  Some terminals report it as `Ctrl+4`.
pub fn is_exit_key(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('\\') | KeyCode::Char('4'))
}

/// Overlay a reverse-video cursor cell on captured pane content.  The
/// cursor row is relative to the first line of `content`.
pub fn render_with_cursor(content: &str, cursor: Option<CursorPos>) -> String {
    let Some(cursor) = cursor.filter(|c| c.visible) else {
        return content.to_string();
    };
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let row = usize::from(cursor.row);
    let col = usize::from(cursor.col);
    let Some(line) = lines.get_mut(row) else {
        return content.to_string();
    };

    let width = ansi::width(line);
    if col >= width {
        line.push_str(&paint(Tone::Cursor, " "));
    } else {
        let before = ansi::cut(line, 0, col);
        let under = ansi::strip(&ansi::cut(line, col, col + 1));
        let after = ansi::cut(line, col + 1, width);
        let cell = if under.is_empty() { " " } else { under.as_str() };
        *line = format!("{}{}{}", before, paint(Tone::Cursor, cell), after);
    }
    lines.join("\n")
}

/// One attached pane.  Owned by the view that created it.
#[derive(Debug)]
pub struct InteractiveSession {
    pub target: PaneTarget,
    pub cursor: Option<CursorPos>,
    active: bool,
    last_input: Instant,
    escape: DoublePress,
}

impl InteractiveSession {
    pub fn new(target: PaneTarget, double_press: Duration, now: Instant) -> Self {
        info!("interactive: attached to {}", target.arg());
        Self {
            target,
            cursor: None,
            active: true,
            last_input: now,
            escape: DoublePress::new(double_press),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_input(&self) -> Instant {
        self.last_input
    }

    pub fn pending_escape(&self) -> bool {
        self.escape.is_pending()
    }

    pub fn end(&mut self, reason: &str) {
        if self.active {
            info!("interactive: detached from {} ({})", self.target.arg(), reason);
        }
        self.active = false;
        self.escape.reset();
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> KeyStep {
        if !self.active {
            return KeyStep::Nothing;
        }
        if is_exit_key(&key) {
            self.end("ctrl+\\");
            return KeyStep::Exit;
        }
        if key.code == KeyCode::Esc && key.modifiers.is_empty() {
            return match self.escape.press(now) {
                Press::Double => {
                    self.end("double escape");
                    KeyStep::Exit
                }
                Press::Armed {
                    token,
                    delay,
                    flush_previous,
                } => {
                    let mut send = Vec::new();
                    if flush_previous {
                        send.push(PaneInput::key("Escape"));
                        self.last_input = now;
                    }
                    KeyStep::Arm { token, delay, send }
                }
            };
        }

        let mut send = self.take_pending_escape();
        if let Some(input) = map_key(&key) {
            send.push(input);
        }
        self.finish(send, now)
    }

    /// Bracketed paste from the terminal.
    pub fn handle_paste(&mut self, text: &str, now: Instant) -> KeyStep {
        if !self.active || text.is_empty() {
            return KeyStep::Nothing;
        }
        let mut send = self.take_pending_escape();
        send.push(if is_paste(text) {
            PaneInput::Paste(text.to_string())
        } else {
            PaneInput::Literal(text.to_string())
        });
        self.finish(send, now)
    }

    /// Escape timer wake-up.  Returns the held Escape when it is still due.
    pub fn escape_timeout(&mut self, token: u64, now: Instant) -> Option<PaneInput> {
        if !self.active || !self.escape.fire(token) {
            debug!("interactive: stale escape timer {}", token);
            return None;
        }
        self.last_input = now;
        Some(PaneInput::key("Escape"))
    }

    fn take_pending_escape(&mut self) -> Vec<PaneInput> {
        if self.escape.interrupt() {
            vec![PaneInput::key("Escape")]
        } else {
            Vec::new()
        }
    }

    fn finish(&mut self, send: Vec<PaneInput>, now: Instant) -> KeyStep {
        if send.is_empty() {
            return KeyStep::Nothing;
        }
        self.last_input = now;
        KeyStep::Send(send)
    }
}
