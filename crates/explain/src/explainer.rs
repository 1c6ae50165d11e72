//! [`CliExplainer`] -- the concrete explainer behind every command.
//!
//! For a route it gathers repository context, renders the matching prompt,
//! runs the configured model and writes the reply to
//! `<output-dir>/<name>.md`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use explain_core::Route;
use explain_session::{ExplainError, Explainer, Explanation};

use crate::context::{RuntimeContext, Workspace};
use crate::inspect;
use crate::model::ModelRunner;
use crate::prompts::{DiffPrompt, FilePrompt, FunctionPrompt, GeneralPrompt, RepoPrompt};

/// Tree depth for repository overviews.
const REPO_TREE_DEPTH: usize = 4;
/// Tree depth given as context for a single file.
const FILE_TREE_DEPTH: usize = 2;
/// Tree depth given as context for a general topic.
const GENERAL_TREE_DEPTH: usize = 3;

const SLUG_MAX_CHARS: usize = 60;

pub struct CliExplainer<'a> {
    ctx: &'a RuntimeContext,
    ws: &'a Workspace,
}

/// A rendered prompt and where its reply goes.
struct Request {
    prompt: String,
    output_name: String,
}

impl<'a> CliExplainer<'a> {
    pub fn new(ctx: &'a RuntimeContext, ws: &'a Workspace) -> Self {
        Self { ctx, ws }
    }

    fn root(&self) -> &Path {
        &self.ws.repo_root
    }

    fn prepare(&self, route: &Route) -> Result<Request, ExplainError> {
        let prompt = match route {
            Route::Repo { path } => self.repo_prompt(path),
            Route::File { path } => self.file_prompt(path)?,
            Route::Function { path, symbol } => self.function_prompt(path, symbol)?,
            Route::Diff(range) => {
                let branch = (!range.is_staged()).then_some(range.branch.as_str());
                let diff = explain_git::diff(branch, &range.base, self.root())
                    .map_err(|e| ExplainError::Git(e.to_string()))?;
                if diff.trim().is_empty() {
                    return Err(ExplainError::NothingToExplain(
                        "no changes to explain".to_string(),
                    ));
                }
                let log = explain_git::commit_log(branch, &range.base, self.root());
                let changed = explain_git::changed_files(&diff);
                self.ctx.status(format!(
                    "Explaining {} changes ({} files)...",
                    range.label(),
                    changed.len()
                ));
                DiffPrompt {
                    diff: &diff,
                    commit_log: Some(&log),
                    changed_files: &changed,
                }
                .render()
            }
            Route::General { subject } => {
                self.ctx.status(format!("Exploring: {subject}..."));
                let tree = inspect::repo_tree(self.root(), GENERAL_TREE_DEPTH);
                let config = inspect::project_config(self.root());
                GeneralPrompt {
                    subject,
                    tree: &tree,
                    config: config.as_ref().map(|(_, content)| content.as_str()),
                }
                .render()
            }
        };
        Ok(Request {
            prompt,
            output_name: output_name(route),
        })
    }

    fn repo_prompt(&self, path: &str) -> String {
        let mut dir = self.root().join(path);
        if !dir.is_dir() {
            dir = self.root().to_path_buf();
        }
        self.ctx
            .status(format!("Analyzing repository at {}...", dir.display()));

        let tree = inspect::repo_tree(&dir, REPO_TREE_DEPTH);
        let config = inspect::project_config(&dir);
        if let Some((name, _)) = &config {
            self.ctx.status(format!("Found config: {name}"));
        }
        let config = config.map(|(_, content)| content);
        let readme = inspect::readme(&dir);
        let entry_points = inspect::entry_points(&dir, config.as_deref());

        RepoPrompt {
            tree: &tree,
            config: config.as_deref(),
            readme: readme.as_deref(),
            entry_points: &entry_points,
        }
        .render()
    }

    fn file_prompt(&self, path: &str) -> Result<String, ExplainError> {
        let abs = self.root().join(path);
        let content = read_source(&abs, path)?;
        self.ctx.status(format!("Explaining {path}..."));

        let imports = inspect::imports(&content);
        let imported_by = inspect::imported_by(self.root(), &abs);
        let tree = inspect::repo_tree(self.root(), FILE_TREE_DEPTH);
        Ok(FilePrompt {
            path,
            content: &content,
            imports: &imports,
            imported_by: &imported_by,
            repo_context: Some(&tree),
        }
        .render())
    }

    fn function_prompt(&self, path: &str, symbol: &str) -> Result<String, ExplainError> {
        let abs = self.root().join(path);
        let content = read_source(&abs, path)?;
        let source = inspect::extract_symbol(&content, symbol).ok_or_else(|| {
            ExplainError::NothingToExplain(format!("symbol '{symbol}' not found in {path}"))
        })?;
        self.ctx
            .status(format!("Explaining {symbol} from {path}..."));

        let related = inspect::related_tests(self.root(), &abs, Some(symbol));
        Ok(FunctionPrompt {
            path,
            symbol,
            source: &source,
            full_file: Some(&content),
            related_tests: &related,
        }
        .render())
    }
}

impl Explainer for CliExplainer<'_> {
    fn explain(&mut self, route: &Route) -> Result<Explanation, ExplainError> {
        let runner = ModelRunner::from_config(&self.ws.config)?;
        runner.locate()?;
        let request = self.prepare(route)?;

        self.ctx.status(format!("Running {}...", runner.name()));
        let text = runner.run(&request.prompt)?;

        let path = self.ws.output_dir.join(&request.output_name);
        save_explanation(&path, &text)?;
        self.ctx.status(format!("Saved to {}", path.display()));
        Ok(Explanation::new(text).with_output_path(path))
    }
}

/// Reads a source file named in a topic. A missing or binary file means
/// there is nothing to explain rather than an I/O failure.
fn read_source(abs: &Path, shown: &str) -> Result<String, ExplainError> {
    if !abs.is_file() {
        return Err(ExplainError::NothingToExplain(format!(
            "file not found: {shown}"
        )));
    }
    fs::read_to_string(abs).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => {
            ExplainError::NothingToExplain(format!("{shown} is not a UTF-8 text file"))
        }
        _ => ExplainError::io(format!("failed to read {shown}"), e),
    })
}

fn save_explanation(path: &Path, text: &str) -> Result<(), ExplainError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ExplainError::io(format!("failed to create {}", parent.display()), e))?;
    }
    fs::write(path, text)
        .map_err(|e| ExplainError::io(format!("failed to write {}", path.display()), e))
}

/// File name an explanation of `route` is saved under.
pub fn output_name(route: &Route) -> String {
    match route {
        Route::File { path } => format!("{}.md", sanitize_path(path)),
        Route::Function { path, symbol } => format!("{}-{symbol}.md", sanitize_path(path)),
        Route::Repo { path } if path == "." => "repo-overview.md".to_string(),
        Route::Repo { path } => format!("repo-{}.md", sanitize_path(path)),
        Route::Diff(range) => format!("diff-{}.md", range.label().replace(['/', '\\'], "-")),
        Route::General { subject } => format!("topic-{}.md", slugify(subject)),
    }
}

/// `src/auth/client.py` -> `src-auth-client`.
pub fn sanitize_path(path: &str) -> String {
    let p = Path::new(path);
    let stemmed: PathBuf = if p.extension().is_some() {
        p.with_extension("")
    } else {
        p.to_path_buf()
    };
    stemmed
        .to_string_lossy()
        .replace(['/', '\\'], "-")
        .trim_start_matches('-')
        .to_string()
}

/// Lowercase alphanumeric words joined by `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.chars().take(SLUG_MAX_CHARS).collect();
    match slug.trim_end_matches('-') {
        "" => "untitled".to_string(),
        s => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explain_core::DiffRange;
    use pretty_assertions::assert_eq;

    #[test]
    fn output_names() {
        let file = Route::File {
            path: "src/auth/client.py".into(),
        };
        assert_eq!(output_name(&file), "src-auth-client.md");

        let function = Route::Function {
            path: "src/auth/client.py".into(),
            symbol: "login".into(),
        };
        assert_eq!(output_name(&function), "src-auth-client-login.md");

        let root = Route::Repo { path: ".".into() };
        assert_eq!(output_name(&root), "repo-overview.md");
        let sub = Route::Repo {
            path: "crates/explain-core".into(),
        };
        assert_eq!(output_name(&sub), "repo-crates-explain-core.md");

        assert_eq!(
            output_name(&Route::Diff(DiffRange::new("feature/login", "main"))),
            "diff-feature-login.md"
        );
        assert_eq!(output_name(&Route::Diff(DiffRange::staged())), "diff-staged.md");

        let general = Route::General {
            subject: "How do retries work?".into(),
        };
        assert_eq!(output_name(&general), "topic-how-do-retries-work.md");
    }

    #[test]
    fn sanitize_keeps_dotted_dirs() {
        assert_eq!(sanitize_path("/abs/pkg/mod.rs"), "abs-pkg-mod");
        assert_eq!(sanitize_path(".github/workflows"), ".github-workflows");
        assert_eq!(sanitize_path("Makefile"), "Makefile");
    }

    #[test]
    fn slug_edges() {
        assert_eq!(slugify("error-handling-strategy"), "error-handling-strategy");
        assert_eq!(slugify("  --  "), "untitled");
        assert_eq!(slugify(&"a ".repeat(100)).len(), SLUG_MAX_CHARS - 1);
    }

    #[test]
    fn missing_and_binary_sources() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_source(&dir.path().join("nope.py"), "nope.py").unwrap_err();
        assert!(matches!(missing, ExplainError::NothingToExplain(_)));

        let bin = dir.path().join("blob.bin");
        fs::write(&bin, [0xff, 0xfe, 0x00]).unwrap();
        let binary = read_source(&bin, "blob.bin").unwrap_err();
        assert!(!binary.is_retryable());
    }
}
