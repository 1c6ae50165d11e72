//! Human-readable rendering of the exploration queue.

use std::fmt::Write;

use explain_core::{Topic, TopicState};

use crate::styles::Styler;

/// Shown when nothing was ever queued.
pub const EMPTY_QUEUE_MESSAGE: &str = "No topics queued. Run an explanation to discover topics.";

/// Renders the queue listing for `explain topics`.
///
/// `topics` is the whole queue in order. Pending topics are numbered in the
/// order `next` will visit them; finished topics are listed only when
/// `include_all` is set. The summary line always counts every state.
pub fn render_topics(topics: &[&Topic], include_all: bool, s: &Styler) -> String {
    if topics.is_empty() {
        return format!("{EMPTY_QUEUE_MESSAGE}\n");
    }

    let by_state = |state| topics.iter().filter(move |t| t.state == state);
    let pending: Vec<&&Topic> = by_state(TopicState::Pending).collect();
    let done: Vec<&&Topic> = by_state(TopicState::Done).collect();
    let skipped: Vec<&&Topic> = by_state(TopicState::Skipped).collect();

    let mut out = String::new();
    if pending.is_empty() {
        out.push_str("No pending topics.\n");
    } else {
        let _ = writeln!(out, "{}\n", s.header(&format!("Pending ({}):", pending.len())));
        for (i, topic) in pending.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {i}. {} {}",
                s.kind_tag(&topic.kind),
                s.bold(&topic.display_target())
            );
            if !topic.title.is_empty() {
                let _ = writeln!(out, "     {}", topic.title);
            }
            if let Some(source) = &topic.source_ref {
                let _ = writeln!(out, "     {}", s.muted(&format!("(from {source})")));
            }
            out.push('\n');
        }
    }

    if include_all {
        for (name, group) in [("Done", &done), ("Skipped", &skipped)] {
            if group.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n{}\n", s.header(&format!("{name} ({}):", group.len())));
            for topic in group {
                let _ = write!(
                    out,
                    "  {} {} {}",
                    s.state_icon(topic.state),
                    s.kind_tag(&topic.kind),
                    topic.display_target()
                );
                if !topic.title.is_empty() {
                    let _ = write!(out, " {}", s.muted(&format!("- {}", topic.title)));
                }
                out.push('\n');
            }
        }
    }

    let _ = writeln!(
        out,
        "\n{} pending, {} done, {} skipped",
        pending.len(),
        done.len(),
        skipped.len()
    );
    out
}

/// One-line summary of a topic, e.g. `[file] src/a.py (from repo:.)`.
pub fn render_topic_line(topic: &Topic, s: &Styler) -> String {
    let mut line = format!("{} {}", s.kind_tag(&topic.kind), topic.display_target());
    if let Some(source) = &topic.source_ref {
        line.push(' ');
        line.push_str(&s.muted(&format!("(from {source})")));
    }
    line
}
