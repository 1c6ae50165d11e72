//! `explain topics` -- show the exploration queue.

use anyhow::Result;
use serde::Serialize;

use explain_storage::QueueCounts;
use explain_ui::{Styler, render_topics};

use crate::cli::TopicsArgs;
use crate::context::RuntimeContext;
use crate::output::{TopicView, output_json};

#[derive(Serialize)]
struct TopicsView {
    topics: Vec<TopicView>,
    counts: QueueCounts,
}

/// Execute the `explain topics` command.
///
/// Read-only: the queue is not locked and never written.
pub fn run(ctx: &RuntimeContext, args: &TopicsArgs) -> Result<()> {
    let ws = ctx.workspace()?;
    let queue = ws.load_queue()?;

    if ctx.json {
        output_json(&TopicsView {
            topics: queue.all(args.all).into_iter().map(TopicView::from_topic).collect(),
            counts: queue.counts(),
        });
        return Ok(());
    }

    print!("{}", render_topics(&queue.all(true), args.all, &Styler::detect()));
    Ok(())
}
