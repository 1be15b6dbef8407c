//! Data providers behind narrow query interfaces.
//!
//! The UI never embeds query logic: it asks a provider for plain records
//! and renders whatever comes back.  Calls may block, so the app runs them
//! on the blocking pool.

use std::path::Path;

use anyhow::Context;
use panedeck_proto::records::{IssueFile, IssueRecord};
use tracing::info;

pub trait IssueSource: Send + Sync {
    fn list(&self) -> anyhow::Result<Vec<IssueRecord>>;

    /// Issues whose id or title matches `query`, best match first.
    fn search(&self, query: &str) -> anyhow::Result<Vec<IssueRecord>>;

    /// `Ok(None)` when no issue has this id.
    fn get(&self, id: &str) -> anyhow::Result<Option<IssueRecord>>;
}

/// Issues held in memory, loaded from a TOML file or built in.
#[derive(Debug, Clone, Default)]
pub struct MemoryIssues {
    issues: Vec<IssueRecord>,
}

impl MemoryIssues {
    pub fn new(issues: Vec<IssueRecord>) -> Self {
        Self { issues }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading issues from {}", path.display()))?;
        let file: IssueFile = toml::from_str(&content)
            .with_context(|| format!("parsing issues in {}", path.display()))?;
        info!("provider: {} issues from {}", file.issues.len(), path.display());
        Ok(Self::new(file.issues))
    }

    /// A small built-in set so the dashboard has something to show.
    pub fn sample() -> Self {
        let issue = |id: &str, title: &str, status: &str, kind: &str, priority: &str, points: u32| IssueRecord {
            id: id.into(),
            title: title.into(),
            status: status.into(),
            kind: kind.into(),
            priority: priority.into(),
            points,
            parent_id: None,
            labels: Vec::new(),
            description: String::new(),
        };
        let mut issues = vec![
            issue("pd-001", "Modal buttons misaligned after resize", "open", "bug", "P1", 2),
            issue("pd-002", "Search results jump while typing", "in_progress", "bug", "P1", 3),
            issue("pd-003", "Adaptive polling for pane previews", "open", "feature", "P2", 5),
            issue("pd-004", "Double-escape detaches from live pane", "closed", "feature", "P2", 2),
            issue("pd-005", "Sidebar toggle keeps cursor visible", "open", "task", "P3", 1),
            issue("pd-006", "Toast stack overlaps keys bar", "open", "bug", "P3", 1),
        ];
        issues[2].labels = vec!["tmux".into(), "perf".into()];
        issues[2].description =
            "Poll fast right after input and back off while the pane is idle.".into();
        issues[4].parent_id = Some("pd-003".into());
        Self::new(issues)
    }
}

impl IssueSource for MemoryIssues {
    fn list(&self) -> anyhow::Result<Vec<IssueRecord>> {
        Ok(self.issues.clone())
    }

    fn search(&self, query: &str) -> anyhow::Result<Vec<IssueRecord>> {
        let q = query.trim().to_lowercase();
        let mut hits: Vec<&IssueRecord> = self.issues.iter().filter(|i| i.matches(&q)).collect();
        // Id hits rank above title hits
        hits.sort_by_key(|i| !i.id.to_lowercase().contains(&q));
        Ok(hits.into_iter().cloned().collect())
    }

    fn get(&self, id: &str) -> anyhow::Result<Option<IssueRecord>> {
        Ok(self.issues.iter().find(|i| i.id == id).cloned())
    }
}
