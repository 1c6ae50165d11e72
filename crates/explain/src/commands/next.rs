//! `explain next` -- explain or skip the front of the queue.

use anyhow::Result;

use explain_session::{NextOutcome, Session};
use explain_ui::{Styler, render_topic_line};

use crate::cli::NextArgs;
use crate::context::RuntimeContext;
use crate::explainer::CliExplainer;
use crate::output::{
    ExplanationView, TopicView, display_path, output_json, output_text, queued_message,
};

/// Execute the `explain next` command.
///
/// A topic whose explanation fails stays pending; the queue is only written
/// after the topic was explained or skipped.
pub fn run(ctx: &RuntimeContext, args: &NextArgs) -> Result<()> {
    let ws = ctx.workspace()?;
    let _lock = ws.lock()?;
    let queue = ws.load_queue()?;
    let mut session = Session::new(queue, ws.normalizer());

    if !args.skip && !ctx.json {
        if let Ok(front) = session.queue().pop_front() {
            let styler = Styler::detect();
            ctx.status(format!("Next topic: {}", render_topic_line(front, &styler)));
            if !front.title.is_empty() {
                ctx.status(format!("  {}", front.title));
            }
            ctx.status("");
        }
    }

    let mut explainer = CliExplainer::new(ctx, &ws);
    let outcome = session.next(args.skip, &mut explainer).map_err(|e| {
        let retry = e.is_explanation_failed() || e.is_unroutable();
        let err = anyhow::Error::new(e);
        if retry {
            err.context("topic left pending; run `explain next --skip` to move past it")
        } else {
            err
        }
    })?;

    let mut queue = session.into_queue();
    ws.save_queue(&mut queue)?;
    let counts = queue.counts();

    match outcome {
        NextOutcome::Skipped { topic, up_next } => {
            if ctx.json {
                output_json(&serde_json::json!({
                    "skipped": TopicView::from_topic(&topic),
                    "next": up_next.as_ref().map(TopicView::from_topic),
                    "counts": counts,
                }));
            } else {
                match up_next {
                    Some(next) => println!("Skipped. Next: {}", next.label()),
                    None => println!("Skipped. No more pending topics."),
                }
            }
        }
        NextOutcome::Explained {
            topic,
            explanation,
            added,
        } => {
            if ctx.json {
                output_json(&ExplanationView {
                    topic: TopicView::from_topic(&topic),
                    output: display_path(explanation.output_path.as_deref()),
                    added,
                    counts,
                    explanation: &explanation.text,
                });
            } else {
                if let Some(message) = queued_message(added, counts.pending) {
                    ctx.status(message);
                }
                output_text(&explanation.text);
                ctx.status(remaining_message(counts.pending));
            }
        }
    }
    Ok(())
}

fn remaining_message(pending: usize) -> String {
    if pending == 0 {
        "\nNo more topics. Exploration complete.".to_string()
    } else {
        format!("\n{pending} topic(s) remaining. Run `explain next` to continue.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_wording() {
        assert_eq!(
            remaining_message(0),
            "\nNo more topics. Exploration complete."
        );
        assert_eq!(
            remaining_message(2),
            "\n2 topic(s) remaining. Run `explain next` to continue."
        );
    }
}
