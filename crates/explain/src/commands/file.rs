//! `explain file` -- explain one file.

use anyhow::{Result, bail};

use explain_core::TopicKind;

use crate::cli::FileArgs;
use crate::commands::seed;
use crate::context::RuntimeContext;

/// Execute the `explain file` command.
pub fn run(ctx: &RuntimeContext, args: &FileArgs) -> Result<()> {
    let path = ctx.absolute(&args.path);
    if !path.is_file() {
        bail!("file not found: {}", args.path.display());
    }
    let ws = ctx.workspace()?;
    seed::run(ctx, &ws, TopicKind::File, &path.to_string_lossy())
}
