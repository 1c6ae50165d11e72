//! Topic struct -- the unit of follow-up exploration work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{TopicKind, TopicState};
use crate::normalize::canonical_key;

/// Base branch used when a diff topic names none.
pub const DEFAULT_DIFF_BASE: &str = "main";

/// A queued exploration topic, as persisted in `topics.json`.
///
/// The canonical key is never stored; it is derived from `kind` and `target`
/// with [`Topic::canonical_key`] so that a hand-edited file cannot carry a
/// key that disagrees with its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub kind: TopicKind,

    pub target: String,

    /// Human-readable description surfaced alongside the target.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// Key of the explanation that surfaced this topic. `None` for seeds.
    #[serde(rename = "source", default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,

    #[serde(default)]
    pub state: TopicState,

    /// Insertion sequence number; strictly increasing, never reused.
    pub order: u64,

    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl Topic {
    /// Returns the deduplication key for this topic.
    pub fn canonical_key(&self) -> String {
        canonical_key(&self.kind, &self.target)
    }

    /// Returns `true` if the topic is still waiting to be explored.
    pub fn is_pending(&self) -> bool {
        self.state == TopicState::Pending
    }

    /// Target as shown to users; diff ranges are spelled out.
    pub fn display_target(&self) -> String {
        match self.kind {
            TopicKind::Diff => DiffRange::from_target(&self.target).to_string(),
            _ => self.target.clone(),
        }
    }

    /// Short display label, e.g. `[file] src/auth/client.py`.
    pub fn label(&self) -> String {
        format!("[{}] {}", self.kind, self.display_target())
    }
}

/// A topic that has passed normalization but is not yet in a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTopic {
    pub kind: TopicKind,
    /// Canonical target (canonical path, `path:symbol`, diff range, or text).
    pub target: String,
    pub title: String,
    pub key: String,
}

impl NormalizedTopic {
    /// Attaches a title, replacing any existing one.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Diff ranges
// ---------------------------------------------------------------------------

/// The `(branch, base)` pair a diff topic refers to.
///
/// An empty branch means the staged changes of the working tree. Stored in
/// topic targets as `"<branch>...<base>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiffRange {
    pub branch: String,
    pub base: String,
}

impl DiffRange {
    /// Creates a range for `branch` against `base`.
    pub fn new(branch: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            base: base.into(),
        }
    }

    /// Staged changes against the default base.
    pub fn staged() -> Self {
        Self::new("", DEFAULT_DIFF_BASE)
    }

    /// Returns `true` if this range means staged changes.
    pub fn is_staged(&self) -> bool {
        self.branch.is_empty()
    }

    /// Parses a stored target (`branch...base`). A bare string is taken as a
    /// branch against the default base.
    pub fn from_target(target: &str) -> Self {
        match target.split_once("...") {
            Some((branch, base)) => {
                let base = base.trim();
                Self::new(
                    branch.trim(),
                    if base.is_empty() { DEFAULT_DIFF_BASE } else { base },
                )
            }
            None => Self::new(target.trim(), DEFAULT_DIFF_BASE),
        }
    }

    /// Serialized target form.
    pub fn to_target(&self) -> String {
        format!("{}...{}", self.branch, self.base)
    }

    /// Canonical key: `diff:<branch>-><base>`.
    pub fn key(&self) -> String {
        format!("diff:{}->{}", self.branch, self.base)
    }

    /// Label used in file names and messages: the branch, or `staged`.
    pub fn label(&self) -> &str {
        if self.is_staged() {
            "staged"
        } else {
            &self.branch
        }
    }
}

impl std::fmt::Display for DiffRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_staged() {
            write!(f, "staged changes (base {})", self.base)
        } else {
            write!(f, "{} against {}", self.branch, self.base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(kind: TopicKind, target: &str) -> Topic {
        Topic {
            kind,
            target: target.to_string(),
            title: String::new(),
            source_ref: Some("repo:.".into()),
            state: TopicState::Pending,
            order: 3,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn serializes_source_and_order() {
        let t = topic(TopicKind::File, "src/auth/client.py");
        let json: serde_json::Value = serde_json::to_value(&t).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["target"], "src/auth/client.py");
        assert_eq!(json["state"], "pending");
        assert_eq!(json["source"], "repo:.");
        assert_eq!(json["order"], 3);
        assert!(json.get("title").is_none());
    }

    #[test]
    fn deserializes_minimal_record() {
        let json = r#"{"kind":"file","target":"src/a.py","order":0}"#;
        let t: Topic = serde_json::from_str(json).unwrap();
        assert_eq!(t.state, TopicState::Pending);
        assert!(t.source_ref.is_none());
        assert_eq!(t.canonical_key(), "file:src/a.py");
    }

    #[test]
    fn label_formats_diff_ranges() {
        let t = topic(TopicKind::Diff, "feature/login...main");
        assert_eq!(t.label(), "[diff] feature/login against main");
        let staged = topic(TopicKind::Diff, "...main");
        assert_eq!(staged.label(), "[diff] staged changes (base main)");
    }

    #[test]
    fn diff_range_target_roundtrip() {
        let r = DiffRange::new("feature/x", "develop");
        assert_eq!(r.to_target(), "feature/x...develop");
        assert_eq!(DiffRange::from_target(&r.to_target()), r);
        assert_eq!(r.key(), "diff:feature/x->develop");
    }

    #[test]
    fn diff_range_bare_target_is_branch() {
        let r = DiffRange::from_target("hotfix");
        assert_eq!(r, DiffRange::new("hotfix", "main"));
        assert_eq!(DiffRange::staged().key(), "diff:->main");
        assert_eq!(DiffRange::staged().label(), "staged");
    }
}
