//! `explain function` -- explain one function or class.

use std::path::Path;

use anyhow::{Result, bail};

use explain_core::TopicKind;

use crate::cli::FunctionArgs;
use crate::commands::seed;
use crate::context::RuntimeContext;

/// Execute the `explain function` command.
pub fn run(ctx: &RuntimeContext, args: &FunctionArgs) -> Result<()> {
    let Some((file, symbol)) = args
        .target
        .rsplit_once(':')
        .filter(|(f, s)| !f.is_empty() && !s.is_empty())
    else {
        bail!("TARGET must be FILE_PATH:SYMBOL_NAME (e.g., src/auth.py:login)");
    };

    let path = ctx.absolute(Path::new(file));
    if !path.is_file() {
        bail!("file not found: {file}");
    }
    let ws = ctx.workspace()?;
    let target = format!("{}:{symbol}", path.to_string_lossy());
    seed::run(ctx, &ws, TopicKind::Function, &target)
}
