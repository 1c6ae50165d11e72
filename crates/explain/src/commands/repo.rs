//! `explain repo` -- repository architecture overview.

use anyhow::Result;

use explain_core::TopicKind;

use crate::cli::RepoArgs;
use crate::commands::seed;
use crate::context::RuntimeContext;

/// Execute the `explain repo` command.
pub fn run(ctx: &RuntimeContext, args: &RepoArgs) -> Result<()> {
    let ws = ctx.workspace_at(args.path.as_deref().or(ctx.repo.as_deref()))?;
    let target = ws.repo_root.to_string_lossy().into_owned();
    seed::run(ctx, &ws, TopicKind::Repo, &target)
}
