//! Output formatting helpers for the `explain` CLI.
//!
//! Explanations go to stdout as plain markdown; progress goes to stderr.
//! Under `--json` stdout carries one JSON document instead.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use explain_core::Topic;
use explain_storage::QueueCounts;

/// JSON view of a queued topic, with its canonical key spelled out.
#[derive(Debug, Serialize)]
pub struct TopicView {
    pub key: String,
    pub kind: String,
    pub target: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub state: String,
    pub order: u64,
    pub added_at: String,
}

impl TopicView {
    pub fn from_topic(topic: &Topic) -> Self {
        Self {
            key: topic.canonical_key(),
            kind: topic.kind.to_string(),
            target: topic.target.clone(),
            title: topic.title.clone(),
            source: topic.source_ref.clone(),
            state: topic.state.as_str().to_string(),
            order: topic.order,
            added_at: topic.added_at.to_rfc3339(),
        }
    }
}

/// JSON result of an explanation (a seed or `next`).
#[derive(Debug, Serialize)]
pub struct ExplanationView<'a> {
    pub topic: TopicView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Follow-up topics newly queued.
    pub added: usize,
    pub counts: QueueCounts,
    pub explanation: &'a str,
}

pub fn display_path(path: Option<&Path>) -> Option<String> {
    path.map(|p| p.display().to_string())
}

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print explanation text to stdout, ending with a newline.
pub fn output_text(text: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = handle.write_all(text.as_bytes());
    if !text.ends_with('\n') {
        let _ = writeln!(handle);
    }
}

/// The `Queued N new topic(s) (M pending)` progress line.
pub fn queued_message(added: usize, pending: usize) -> Option<String> {
    (added > 0).then(|| format!("Queued {added} new topic(s) ({pending} pending)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use explain_core::{TopicKind, TopicState};

    #[test]
    fn topic_view_json() {
        let topic = Topic {
            kind: TopicKind::Function,
            target: "./src/a.py:run".into(),
            title: String::new(),
            source_ref: Some("repo:.".into()),
            state: TopicState::Pending,
            order: 3,
            added_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        };
        let json = serde_json::to_value(TopicView::from_topic(&topic)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "function:src/a.py:run",
                "kind": "function",
                "target": "./src/a.py:run",
                "source": "repo:.",
                "state": "pending",
                "order": 3,
                "added_at": "2026-01-02T03:04:05+00:00",
            })
        );
    }

    #[test]
    fn queued_message_only_when_added() {
        assert_eq!(queued_message(0, 4), None);
        assert_eq!(
            queued_message(2, 5).as_deref(),
            Some("Queued 2 new topic(s) (5 pending)")
        );
    }
}
