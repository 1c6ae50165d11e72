//! Shared flow of the seed commands (`repo`, `file`, `function`, `diff`).

use anyhow::{Context, Result};

use explain_core::TopicKind;
use explain_session::{ExplainError, SessionError, Session};

use crate::context::{RuntimeContext, Workspace};
use crate::explainer::CliExplainer;
use crate::output::{ExplanationView, TopicView, display_path, output_json, output_text, queued_message};

/// Explains a user-chosen target, records it as done and queues its
/// follow-up topics.
///
/// The queue is only written once the explanation succeeded.
pub fn run(ctx: &RuntimeContext, ws: &Workspace, kind: TopicKind, target: &str) -> Result<()> {
    let _lock = ws.lock()?;
    let queue = ws.load_queue()?;
    let mut session = Session::new(queue, ws.normalizer());
    let mut explainer = CliExplainer::new(ctx, ws);

    let outcome = match session.seed(kind.clone(), target, &mut explainer) {
        Ok(outcome) => outcome,
        Err(e) if kind == TopicKind::Diff && is_nothing_to_explain(&e) => {
            ctx.status("No changes to explain.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut queue = session.into_queue();
    ws.save_queue(&mut queue)?;
    let counts = queue.counts();

    if ctx.json {
        let topic = queue
            .get(&outcome.topic.key)
            .map(TopicView::from_topic)
            .context("seed topic missing from queue")?;
        output_json(&ExplanationView {
            topic,
            output: display_path(outcome.explanation.output_path.as_deref()),
            added: outcome.added,
            counts,
            explanation: &outcome.explanation.text,
        });
    } else {
        if let Some(message) = queued_message(outcome.added, counts.pending) {
            ctx.status(message);
        }
        output_text(&outcome.explanation.text);
    }
    Ok(())
}

pub fn is_nothing_to_explain(e: &SessionError) -> bool {
    matches!(
        e,
        SessionError::ExplanationFailed {
            source: ExplainError::NothingToExplain(_),
            ..
        }
    )
}
