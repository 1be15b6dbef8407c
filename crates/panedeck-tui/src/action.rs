//! Navigation actions, asynchronous commands and their completions.
//!
//! Views answer input with an [`Outcome`](crate::dispatch::Outcome); the two
//! payload kinds live here.  An [`Action`] is handled synchronously by the
//! app.  A [`Command`] runs off the event loop and comes back later as a
//! [`Completion`] carrying whatever token it was issued with.

use std::time::Duration;

use panedeck_proto::records::{IssueRecord, PaneRecord};
use serde::{Deserialize, Serialize};

use crate::interactive::PaneInput;
use crate::tmux::{PaneSnapshot, PaneTarget};
use crate::widgets::toast::Severity;

/// Top-level views, one tab each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewId {
    #[default]
    Issues,
    Panes,
}

impl ViewId {
    pub const ALL: [ViewId; 2] = [ViewId::Issues, ViewId::Panes];

    pub fn title(self) -> &'static str {
        match self {
            Self::Issues => "Issues",
            Self::Panes => "Panes",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&v| v == self).unwrap_or(0)
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// Panes inside a two-pane view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneId {
    Sidebar,
    Detail,
}

impl PaneId {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sidebar => "sidebar",
            Self::Detail => "detail",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sidebar" => Some(Self::Sidebar),
            "detail" => Some(Self::Detail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    SwitchView(ViewId),
    NextView,
    FocusPane(PaneId),

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleSidebar,
    ToggleHelp,
    ToggleKeys,

    // ── Feedback ─────────────────────────────────────────────────────────────
    Toast(Severity, String),
    CopyToClipboard(String),

    // ── System ───────────────────────────────────────────────────────────────
    RequestQuit,
    Quit,
}

/// Work executed off the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadIssues,
    SearchIssues { token: u64, query: String },
    FetchIssue { token: u64, id: String },
    ListPanes,
    CapturePane { generation: u64, target: PaneTarget },
    SendToPane { target: PaneTarget, inputs: Vec<PaneInput> },
    /// Deliver `completion` after `delay`.
    After { delay: Duration, completion: Box<Completion> },
    Batch(Vec<Command>),
}

impl Command {
    pub fn after(delay: Duration, completion: Completion) -> Self {
        Self::After {
            delay,
            completion: Box::new(completion),
        }
    }
}

/// Result of a [`Command`], delivered back onto the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Issues(Result<Vec<IssueRecord>, String>),
    SearchResults {
        token: u64,
        query: String,
        result: Result<Vec<IssueRecord>, String>,
    },
    /// `Ok(None)` is a clean not-found.
    IssueLoaded {
        token: u64,
        result: Result<Option<IssueRecord>, String>,
    },
    Panes(Result<Vec<PaneRecord>, String>),
    PaneCaptured {
        generation: u64,
        result: Result<PaneSnapshot, String>,
    },
    PaneSent {
        target: PaneTarget,
        result: Result<(), String>,
    },
    PollDue { generation: u64 },
    EscapeTimeout { token: u64 },
}

impl Completion {
    /// View that issued the command.
    pub fn view(&self) -> ViewId {
        match self {
            Self::Issues(_) | Self::SearchResults { .. } | Self::IssueLoaded { .. } => ViewId::Issues,
            Self::Panes(_)
            | Self::PaneCaptured { .. }
            | Self::PaneSent { .. }
            | Self::PollDue { .. }
            | Self::EscapeTimeout { .. } => ViewId::Panes,
        }
    }
}
