//! Thin async wrapper over the `tmux` CLI.
//!
//! Every call is one request/response process run; there is no control-mode
//! stream.  A pane that cannot be found maps to [`DeckError::SessionGone`],
//! which callers treat as "detach now".

use std::future::Future;

use panedeck_proto::records::PaneRecord;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{DeckError, DeckResult};
use crate::interactive::PaneInput;

const TMUX: &str = "tmux";
const PASTE_BUFFER: &str = "panedeck";
const LIST_FORMAT: &str =
    "#{session_name}\t#{pane_id}\t#{pane_current_command}\t#{pane_width}\t#{pane_height}";
const CURSOR_FORMAT: &str = "#{cursor_x},#{cursor_y},#{cursor_flag}";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaneTarget {
    pub session: String,
    pub pane_id: String,
}

impl PaneTarget {
    pub fn new(session: impl Into<String>, pane_id: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            pane_id: pane_id.into(),
        }
    }

    /// `-t` argument.  Pane ids (`%N`) are global; anything else is
    /// qualified with the session.
    pub fn arg(&self) -> String {
        if self.pane_id.starts_with('%') {
            self.pane_id.clone()
        } else {
            format!("{}:{}", self.session, self.pane_id)
        }
    }
}

impl From<&PaneRecord> for PaneTarget {
    fn from(p: &PaneRecord) -> Self {
        Self::new(&p.session, &p.pane_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPos {
    pub row: u16,
    pub col: u16,
    pub visible: bool,
}

/// Rendered pane text (with escapes) plus where its cursor is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaneSnapshot {
    pub content: String,
    pub cursor: Option<CursorPos>,
}

fn command(program: &str, args: &[&str], piped_stdin: bool) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if piped_stdin {
        cmd.stdin(std::process::Stdio::piped());
    }
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    // An early return (failed stdin write) drops the child; reap it.
    cmd.kill_on_drop(true);
    cmd
}

async fn run(args: &[&str], stdin: Option<&[u8]>) -> DeckResult<String> {
    let mut child = command(TMUX, args, stdin.is_some()).spawn()?;
    if let (Some(data), Some(mut pipe)) = (stdin, child.stdin.take()) {
        pipe.write_all(data).await?;
        // Closing the pipe lets load-buffer see EOF.
        drop(pipe);
    }
    let output = child.wait_with_output().await?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(classify(args, output.status.to_string(), stderr))
}

fn classify(args: &[&str], status: String, stderr: String) -> DeckError {
    let gone = ["can't find", "no server running", "session not found", "no such"]
        .iter()
        .any(|needle| stderr.contains(needle));
    if gone {
        let target = args
            .iter()
            .position(|a| *a == "-t")
            .and_then(|i| args.get(i + 1))
            .unwrap_or(&"?");
        return DeckError::SessionGone((*target).to_string());
    }
    DeckError::Command {
        program: TMUX.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        status,
        stderr,
    }
}

/// Named key (`Enter`, `C-c`, `Up`, ...).
pub async fn send_key(target: &PaneTarget, key: &str) -> DeckResult<()> {
    let t = target.arg();
    run(&["send-keys", "-t", t.as_str(), key], None).await?;
    Ok(())
}

/// Text typed as-is (`-l`: no key-name lookup).
pub async fn send_literal(target: &PaneTarget, text: &str) -> DeckResult<()> {
    let t = target.arg();
    run(&["send-keys", "-t", t.as_str(), "-l", text], None).await?;
    Ok(())
}

/// Multi-line or long text goes through a buffer so the pane's application
/// sees one bracketed paste instead of a burst of keystrokes.
pub async fn send_paste(target: &PaneTarget, text: &str) -> DeckResult<()> {
    let t = target.arg();
    run(&["load-buffer", "-b", PASTE_BUFFER, "-"], Some(text.as_bytes())).await?;
    run(&["paste-buffer", "-b", PASTE_BUFFER, "-t", t.as_str(), "-d", "-p"], None).await?;
    Ok(())
}

pub async fn send_inputs(target: &PaneTarget, inputs: &[PaneInput]) -> DeckResult<()> {
    for input in inputs {
        match input {
            PaneInput::Key(key) => send_key(target, key).await?,
            PaneInput::Literal(text) => send_literal(target, text).await?,
            PaneInput::Paste(text) => send_paste(target, text).await?,
        }
    }
    Ok(())
}

/// Sends to panes one batch at a time, in submission order.  A keystroke
/// never overtakes the one typed before it, however slow tmux is.
pub struct SendQueue {
    tx: mpsc::UnboundedSender<(PaneTarget, Vec<PaneInput>)>,
}

impl SendQueue {
    /// Start the worker.  `send` delivers one batch; `done` sees each result
    /// as it completes.  Must be called inside a tokio runtime.
    pub fn spawn<S, Fut, D>(send: S, done: D) -> Self
    where
        S: Fn(PaneTarget, Vec<PaneInput>) -> Fut + Send + 'static,
        Fut: Future<Output = DeckResult<()>> + Send + 'static,
        D: Fn(PaneTarget, DeckResult<()>) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<(PaneTarget, Vec<PaneInput>)>();
        tokio::spawn(async move {
            while let Some((target, inputs)) = rx.recv().await {
                let result = send(target.clone(), inputs).await;
                done(target, result);
            }
            debug!("tmux: send queue closed");
        });
        Self { tx }
    }

    /// Queue a batch.  False once the worker is gone.
    pub fn push(&self, target: PaneTarget, inputs: Vec<PaneInput>) -> bool {
        self.tx.send((target, inputs)).is_ok()
    }
}

/// Visible pane contents with SGR escapes kept.
pub async fn capture_pane(target: &PaneTarget) -> DeckResult<String> {
    let t = target.arg();
    let out = run(&["capture-pane", "-p", "-e", "-t", t.as_str()], None).await?;
    Ok(out.trim_end_matches('\n').to_string())
}

pub async fn cursor_position(target: &PaneTarget) -> DeckResult<CursorPos> {
    let t = target.arg();
    let out = run(&["display-message", "-p", "-t", t.as_str(), CURSOR_FORMAT], None).await?;
    parse_cursor(&out)
}

/// Content and cursor in one go.  A failed cursor query only loses the
/// cursor overlay.
pub async fn snapshot(target: &PaneTarget) -> DeckResult<PaneSnapshot> {
    let content = capture_pane(target).await?;
    let cursor = match cursor_position(target).await {
        Ok(pos) => Some(pos),
        Err(DeckError::SessionGone(t)) => return Err(DeckError::SessionGone(t)),
        Err(e) => {
            warn!("tmux: cursor query failed for {}: {}", target.arg(), e);
            None
        }
    };
    Ok(PaneSnapshot { content, cursor })
}

pub async fn list_panes() -> DeckResult<Vec<PaneRecord>> {
    let out = run(&["list-panes", "-a", "-F", LIST_FORMAT], None).await?;
    let panes = parse_panes(&out)?;
    debug!("tmux: {} panes", panes.len());
    Ok(panes)
}

fn parse_cursor(out: &str) -> DeckResult<CursorPos> {
    let fields: Vec<&str> = out.trim().split(',').collect();
    let num = |s: &str| {
        s.parse::<u16>()
            .map_err(|_| DeckError::Parse(format!("cursor field {s:?} in {out:?}")))
    };
    match fields.as_slice() {
        [x, y, flag] => Ok(CursorPos {
            col: num(*x)?,
            row: num(*y)?,
            visible: *flag == "1",
        }),
        _ => Err(DeckError::Parse(format!("cursor line {out:?}"))),
    }
}

fn parse_panes(out: &str) -> DeckResult<Vec<PaneRecord>> {
    out.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            let f: Vec<&str> = line.split('\t').collect();
            if f.len() != 5 {
                return Err(DeckError::Parse(format!("pane line {line:?}")));
            }
            let dim = |s: &str| {
                s.parse::<u16>()
                    .map_err(|_| DeckError::Parse(format!("pane size {s:?}")))
            };
            Ok(PaneRecord {
                session: f[0].to_string(),
                pane_id: f[1].to_string(),
                command: f[2].to_string(),
                width: dim(f[3])?,
                height: dim(f[4])?,
            })
        })
        .collect()
}
