//! `explain install-skill` -- write the agent skill file.

use std::fs;

use anyhow::{Context, Result};

use crate::cli::InstallSkillArgs;
use crate::context::RuntimeContext;
use crate::skill::{DEFAULT_SKILL_DIR, SKILL_FILE_NAME, skill_markdown};

/// Execute the `explain install-skill` command.
pub fn run(ctx: &RuntimeContext, args: &InstallSkillArgs) -> Result<()> {
    let dir = match &args.skill_dir {
        Some(dir) => ctx.cwd.join(dir),
        None => ctx.cwd.join(DEFAULT_SKILL_DIR),
    };
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join(SKILL_FILE_NAME);
    let content = skill_markdown().context("failed to render skill frontmatter")?;
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;

    println!("Installed skill to {}", path.display());
    Ok(())
}
