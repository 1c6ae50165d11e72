//! `explain completion` -- generate shell completion scripts.

use std::io::stdout;

use anyhow::Result;
use clap::CommandFactory;

use crate::cli::{Cli, CompletionArgs};

/// Execute the `explain completion` command.
pub fn run(args: &CompletionArgs) -> Result<()> {
    clap_complete::generate(args.shell, &mut Cli::command(), "explain", &mut stdout());
    Ok(())
}
