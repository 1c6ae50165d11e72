//! Git command execution.

use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors that can occur when running git commands.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git binary could not be found or spawned.
    #[error("failed to execute git: {0}")]
    SpawnError(#[from] std::io::Error),

    /// The git command exited with a non-zero status.
    #[error("git {args} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        /// The arguments, joined with spaces.
        args: String,
        /// The exit code, or `None` if the process was killed by a signal.
        code: Option<i32>,
        stderr: String,
    },
}

/// A specialized `Result` type for git operations.
pub type Result<T> = std::result::Result<T, GitError>;

/// Runs `git <args>` in `cwd` and returns stdout with trailing whitespace
/// removed.
///
/// # Errors
///
/// Returns [`GitError::SpawnError`] if `git` cannot be started, or
/// [`GitError::CommandFailed`] if it exits with a non-zero status.
pub fn git_command(args: &[&str], cwd: &Path) -> Result<String> {
    debug!(?args, cwd = %cwd.display(), "git");
    let output = Command::new("git").args(args).current_dir(cwd).output()?;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            args: args.join(" "),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}
