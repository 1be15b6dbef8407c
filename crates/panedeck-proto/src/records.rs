//! Plain records handed to the UI by data providers.
//!
//! Providers own the query logic; the UI only renders these values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl IssueRecord {
    /// `[status]  type  priority  Np`, skipping empty parts.
    pub fn meta_line(&self) -> String {
        let mut parts = Vec::new();
        if !self.status.is_empty() {
            parts.push(format!("[{}]", self.status));
        }
        if !self.kind.is_empty() {
            parts.push(self.kind.clone());
        }
        if !self.priority.is_empty() {
            parts.push(self.priority.clone());
        }
        if self.points > 0 {
            parts.push(format!("{}p", self.points));
        }
        parts.join("  ")
    }

    /// Case-insensitive match against id and title.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.id.to_lowercase().contains(&q) || self.title.to_lowercase().contains(&q)
    }
}

/// Container used by TOML issue files (`[[issues]]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFile {
    #[serde(default)]
    pub issues: Vec<IssueRecord>,
}

/// One addressable pane of a terminal multiplexer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneRecord {
    pub session: String,
    pub pane_id: String,
    pub command: String,
    pub width: u16,
    pub height: u16,
}

impl PaneRecord {
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.session, self.pane_id, self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue() -> IssueRecord {
        IssueRecord {
            id: "td-1a2b".into(),
            title: "Fix modal hit regions".into(),
            status: "open".into(),
            kind: "bug".into(),
            priority: "P1".into(),
            points: 3,
            parent_id: None,
            labels: vec![],
            description: String::new(),
        }
    }

    #[test]
    fn test_meta_line() {
        assert_eq!(issue().meta_line(), "[open]  bug  P1  3p");
        let mut bare = issue();
        bare.status.clear();
        bare.points = 0;
        assert_eq!(bare.meta_line(), "bug  P1");
    }

    #[test]
    fn test_matches_id_and_title() {
        let i = issue();
        assert!(i.matches("1A2B"));
        assert!(i.matches("modal"));
        assert!(i.matches("  "));
        assert!(!i.matches("worktree"));
    }

    #[test]
    fn test_issue_file_from_toml() {
        let file: IssueFile = toml::from_str(
            r#"
[[issues]]
id = "td-1"
title = "First"
type = "task"
labels = ["ui"]
"#,
        )
        .unwrap();
        assert_eq!(file.issues.len(), 1);
        assert_eq!(file.issues[0].kind, "task");
        assert_eq!(file.issues[0].labels, vec!["ui".to_string()]);
    }
}
