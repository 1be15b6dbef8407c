//! Errors from the collaborators the UI drives (tmux, issue files).
//!
//! Rendering never fails; these only surface at view boundaries, where they
//! turn into an error state or a toast.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("{program} {} exited with {status}: {stderr}", .args.join(" "))]
    Command {
        program: String,
        args: Vec<String>,
        status: String,
        stderr: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("session {0} is gone")]
    SessionGone(String),
}

pub type DeckResult<T> = Result<T, DeckError>;
