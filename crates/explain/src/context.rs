//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds what every command handler needs: global
//! flags and the working directory. [`Workspace`] adds the resolved
//! repository root, configuration and output directory for commands that
//! touch the queue.

use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use explain_config::{ConfigOverrides, ExplainConfig, ensure_output_dir, load_config};
use explain_core::Normalizer;
use explain_git::resolve_repo_root;
use explain_lockfile::QueueLock;
use explain_storage::{JsonFileStore, QueueStorage, TopicQueue};

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Directory the command was started in.
    pub cwd: PathBuf,

    /// `--repo`, if given.
    pub repo: Option<PathBuf>,

    /// Command-line configuration overrides (`--model`, `--output-dir`).
    pub overrides: ConfigOverrides,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress progress messages.
    pub quiet: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            cwd: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            repo: global.repo.clone(),
            overrides: ConfigOverrides {
                model: global.model.clone(),
                output_dir: global.output_dir.clone(),
            },
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// Opens the workspace for `--repo` (or the current repository).
    pub fn workspace(&self) -> Result<Workspace> {
        self.workspace_at(self.repo.as_deref())
    }

    /// Opens the workspace rooted at `repo`, resolved against the cwd.
    pub fn workspace_at(&self, repo: Option<&Path>) -> Result<Workspace> {
        let repo_root = resolve_repo_root(repo, &self.cwd);
        if !repo_root.is_dir() {
            anyhow::bail!("repository not found: {}", repo_root.display());
        }
        let config = load_config(&repo_root, &self.overrides)
            .with_context(|| format!("failed to load configuration for {}", repo_root.display()))?;
        let output_dir = config.output_dir_in(&self.cwd);
        debug!(
            repo_root = %repo_root.display(),
            output_dir = %output_dir.display(),
            model = %config.model,
            "workspace opened"
        );
        Ok(Workspace {
            repo_root,
            config,
            output_dir,
        })
    }

    /// Prints a progress line to stderr unless `--quiet`.
    pub fn status(&self, message: impl Display) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    /// Resolves a user-supplied path against the cwd, following symlinks
    /// when the path exists.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        let joined = self.cwd.join(path);
        joined.canonicalize().unwrap_or(joined)
    }
}

/// A repository, its configuration and where its queue lives.
#[derive(Debug)]
pub struct Workspace {
    pub repo_root: PathBuf,
    pub config: ExplainConfig,
    pub output_dir: PathBuf,
}

impl Workspace {
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::in_dir(&self.output_dir)
    }

    /// A normalizer that makes paths under the repository relative to it.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::with_repo_root(&self.repo_root)
    }

    /// Takes the single-writer lock on the output directory.
    pub fn lock(&self) -> Result<QueueLock> {
        ensure_output_dir(&self.output_dir)?;
        QueueLock::try_acquire(&self.output_dir).map_err(|e| {
            let held = e.is_held();
            let err = anyhow::Error::new(e);
            if held {
                err.context("another explain command is updating this queue; try again when it finishes")
            } else {
                err
            }
        })
    }

    pub fn load_queue(&self) -> Result<TopicQueue> {
        let store = self.store();
        TopicQueue::load(&store).with_context(|| format!("failed to load {}", store.location()))
    }

    /// Writes the queue back if it changed.
    pub fn save_queue(&self, queue: &mut TopicQueue) -> Result<()> {
        let store = self.store();
        queue
            .save(&store)
            .with_context(|| format!("failed to save {}", store.location()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(cwd: &Path) -> RuntimeContext {
        RuntimeContext {
            cwd: cwd.to_path_buf(),
            repo: None,
            overrides: ConfigOverrides::default(),
            json: false,
            verbose: false,
            quiet: true,
        }
    }

    #[test]
    fn explicit_repo_and_relative_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("project")).unwrap();
        let ctx = ctx(dir.path());

        let ws = ctx.workspace_at(Some(Path::new("project"))).unwrap();
        assert_eq!(ws.repo_root, dir.path().join("project").canonicalize().unwrap());
        assert_eq!(ws.output_dir, dir.path().join("explanations"));
        assert!(ws.store().path().ends_with("explanations/topics.json"));
    }

    #[test]
    fn missing_repo_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ctx(dir.path())
            .workspace_at(Some(Path::new("nope")))
            .unwrap_err();
        assert!(err.to_string().contains("repository not found"));
    }

    #[test]
    fn second_lock_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        let ws = ctx.workspace_at(Some(dir.path())).unwrap();
        let _held = ws.lock().unwrap();
        let err = ws.lock().unwrap_err();
        assert!(format!("{err:#}").contains("another explain command"));
    }
}
