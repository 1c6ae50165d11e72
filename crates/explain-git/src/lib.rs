//! Git plumbing for explain.
//!
//! Repository-root discovery and the diff / commit-log queries used when
//! explaining branches and staged changes. Everything shells out to `git`.

pub mod commands;
pub mod diff;
pub mod gitdir;

pub use commands::{GitError, Result, git_command};
pub use diff::{changed_files, commit_log, diff};
pub use gitdir::{find_git_root, get_git_root_via_command, resolve_repo_root};
