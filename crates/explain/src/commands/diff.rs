//! `explain diff` -- explain a branch or the staged changes.

use anyhow::Result;

use explain_core::TopicKind;

use crate::cli::DiffArgs;
use crate::commands::seed;
use crate::context::RuntimeContext;

/// Execute the `explain diff` command.
pub fn run(ctx: &RuntimeContext, args: &DiffArgs) -> Result<()> {
    let ws = ctx.workspace()?;
    seed::run(ctx, &ws, TopicKind::Diff, &range_text(args))
}

/// The range in git's `base...branch` spelling, or `staged`.
fn range_text(args: &DiffArgs) -> String {
    match &args.branch {
        Some(branch) => format!("{}...{branch}", args.base),
        None => "staged".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explain_core::{DiffRange, Normalizer};

    #[test]
    fn range_text_normalizes_to_branch_and_base() {
        let args = DiffArgs {
            branch: Some("feature/x".into()),
            base: "develop".into(),
        };
        let topic = Normalizer::new()
            .normalize(&TopicKind::Diff, &range_text(&args))
            .unwrap();
        assert_eq!(
            DiffRange::from_target(&topic.target),
            DiffRange::new("feature/x", "develop")
        );

        let staged = DiffArgs {
            branch: None,
            base: "main".into(),
        };
        let topic = Normalizer::new()
            .normalize(&TopicKind::Diff, &range_text(&staged))
            .unwrap();
        assert!(DiffRange::from_target(&topic.target).is_staged());
    }
}
