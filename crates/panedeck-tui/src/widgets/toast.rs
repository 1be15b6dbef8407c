//! Toast notification system: transient status messages.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::ansi;
use crate::overlay::{overlay_at, Backdrop};
use crate::theme::{paint, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn tone(self) -> Tone {
        match self {
            Self::Info => Tone::Info,
            Self::Success => Tone::Success,
            Self::Warning => Tone::Warning,
            Self::Error => Tone::Danger,
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Info => "·",
            Self::Success => "✓",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }

    /// How long a toast of this severity stays up.
    pub fn duration(self) -> Duration {
        match self {
            Self::Info | Self::Success => Duration::from_secs(3),
            Self::Warning => Duration::from_secs(4),
            Self::Error => Duration::from_secs(5),
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            max_visible: 4,
        }
    }

    pub fn push_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        // Same message again just refreshes it
        let msg = message.into();
        self.toasts.retain(|t| t.message != msg);
        self.toasts.push_back(Toast {
            message: msg,
            severity,
            expires: now + severity.duration(),
        });
        while self.toasts.len() > self.max_visible * 2 {
            self.toasts.pop_front();
        }
    }

    /// Returns true when something visible changed.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires > now);
        before != self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// One painted line per visible toast, newest first.
    pub fn lines(&self, width: u16) -> Vec<String> {
        let max_width = usize::from((width / 2).clamp(30, 60).min(width.saturating_sub(2)));
        let mut out = Vec::new();
        for toast in self.toasts.iter().rev().take(self.max_visible) {
            let raw = ansi::truncate(
                &format!(" {} {} ", toast.severity.icon(), toast.message),
                max_width,
            );
            out.push(paint(toast.severity.tone(), &raw));
        }
        out
    }

    /// Splice the toast stack into the top-right corner of `frame`, one row
    /// below the top edge.  Everything else is left untouched.
    pub fn overlay(&self, frame: &str, width: u16, height: u16) -> String {
        let mut out = frame.to_string();
        for (i, line) in self.lines(width).iter().enumerate() {
            let y = 1 + u16::try_from(i).unwrap_or(u16::MAX);
            if y >= height {
                break;
            }
            let w = u16::try_from(ansi::width(line)).unwrap_or(width);
            let x = width.saturating_sub(w + 1);
            out = overlay_at(&out, line, x, y, width, height, Backdrop::Keep);
        }
        out
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(w: usize, h: usize) -> String {
        vec![".".repeat(w); h].join("\n")
    }

    #[test]
    fn test_expiry_by_severity() {
        let t0 = Instant::now();
        let mut m = ToastManager::new();
        m.push_at("saved", Severity::Success, t0);
        m.push_at("broken", Severity::Error, t0);
        assert!(m.tick_at(t0 + Duration::from_secs(4)));
        let lines: Vec<String> = m.lines(80).iter().map(|l| ansi::strip(l)).collect();
        assert_eq!(lines, vec![" ✗ broken ".to_string()]);
        m.tick_at(t0 + Duration::from_secs(6));
        assert!(m.is_empty());
    }

    #[test]
    fn test_duplicate_message_refreshes() {
        let t0 = Instant::now();
        let mut m = ToastManager::new();
        m.push_at("copied", Severity::Info, t0);
        m.push_at("copied", Severity::Info, t0 + Duration::from_secs(2));
        assert_eq!(m.lines(80).len(), 1);
        m.tick_at(t0 + Duration::from_secs(4));
        assert!(!m.is_empty());
    }

    #[test]
    fn test_overlay_top_right_keeps_background() {
        let mut m = ToastManager::new();
        m.push_at("hi", Severity::Info, Instant::now());
        let out = m.overlay(&blank(40, 4), 40, 4);
        let rows: Vec<String> = out.lines().map(ansi::strip).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], ".".repeat(40));
        assert!(rows[1].ends_with(" · hi ."));
        assert!(rows[1].starts_with("....."));
        assert_eq!(ansi::width(out.lines().nth(1).unwrap_or_default()), 40);
    }
}
