//! Clap CLI definitions for the `explain` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use explain_core::DEFAULT_DIFF_BASE;

/// explain -- AI-powered code explanation with an exploration queue.
///
/// Every explanation ends with follow-up topics; they are queued so that
/// `explain next` walks a codebase one topic at a time.
#[derive(Parser, Debug)]
#[command(
    name = "explain",
    about = "AI-powered code explanation with an exploration queue",
    long_about = "Explain a repository, file, function or diff with an AI model. \
                  Each explanation surfaces follow-up topics, which are queued so \
                  that `explain next` keeps the exploration going.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Model to use (default: claude, or `model` in .explain.yaml).
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Output directory for explanations and the queue (default: ./explanations).
    #[arg(short = 'd', long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Repository root (default: enclosing git repository, else cwd).
    #[arg(short = 'r', long, global = true)]
    pub repo: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress progress messages (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // ===== Seeds =====
    /// Generate a high-level repository architecture overview.
    Repo(RepoArgs),

    /// Explain a file's purpose, structure, and key patterns.
    File(FileArgs),

    /// Explain a specific function or class.
    Function(FunctionArgs),

    /// Explain what changed in a diff and why.
    Diff(DiffArgs),

    // ===== Exploration queue =====
    /// Show the exploration queue.
    Topics(TopicsArgs),

    /// Explain (or skip) the next topic in the exploration queue.
    Next(NextArgs),

    // ===== Setup =====
    /// Install the code-explainer agent skill file.
    InstallSkill(InstallSkillArgs),

    /// Generate shell completion scripts.
    Completion(CompletionArgs),
}

#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Repository to describe (default: --repo, else the current repository).
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// File to explain.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct FunctionArgs {
    /// FILE_PATH:SYMBOL_NAME (e.g. src/auth/client.py:login).
    #[arg(value_name = "FILE:SYMBOL")]
    pub target: String,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Branch to explain (default: staged changes).
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// Base branch to diff against.
    #[arg(long, default_value = DEFAULT_DIFF_BASE)]
    pub base: String,
}

#[derive(Args, Debug)]
pub struct TopicsArgs {
    /// Show all topics including done and skipped.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct NextArgs {
    /// Skip the next topic instead of explaining it.
    #[arg(long)]
    pub skip: bool,
}

#[derive(Args, Debug)]
pub struct InstallSkillArgs {
    /// Target directory for SKILL.md (default: .claude/skills/code-explainer).
    #[arg(long)]
    pub skill_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}
