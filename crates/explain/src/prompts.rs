//! Prompt templates, one per handler.
//!
//! Every prompt ends with [`TOPICS_INSTRUCTIONS`] so the model's reply
//! carries a "Topics to Explore" section for the queue.

/// Asks the model for follow-up topics in the format the topic parser reads.
pub const TOPICS_INSTRUCTIONS: &str = r###"
## Topics to Explore

After your explanation, add a section titled "## Topics to Explore".
List 3-5 things the reader should explore next to deepen their understanding.
Each item MUST use this exact format:

- [kind] `target` — Description

Where:
- **kind** is one of: file, function, repo, diff, general
- **target** is the exploration target:
  - For file: the file path (e.g., `src/auth/client.py`)
  - For function: file:symbol (e.g., `src/auth/client.py:login`)
  - For repo: a directory of the repository (e.g., `src/plugins`)
  - For diff: a branch name (e.g., `feature/retry`)
  - For general: a short label (e.g., `dataverse-integration`)
- **Description** explains why this is worth exploring

Example:
- [file] `src/workflow/executor.py` — Orchestrates the plan-execute-synthesize loop
- [function] `src/router.py:route_request` — Decides which agent handles each request
- [general] `error-handling-strategy` — How failures propagate across agent boundaries
"###;

const REVIEWER: &str = "You are a senior software engineer explaining code to a colleague.";
const ONBOARDER: &str =
    "You are a senior software engineer explaining a codebase to a new team member.";

/// Line-oriented prompt builder.
#[derive(Default)]
struct Sections(Vec<String>);

impl Sections {
    fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.0.push(line.into());
        self
    }

    fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    fn heading(&mut self, title: &str) -> &mut Self {
        self.line(format!("## {title}")).blank()
    }

    fn code(&mut self, lang: &str, body: &str) -> &mut Self {
        self.line(format!("```{lang}")).line(body).line("```")
    }

    fn bullets<S: AsRef<str>>(&mut self, items: &[S], quoted: bool) -> &mut Self {
        for item in items {
            let item = item.as_ref();
            if quoted {
                self.line(format!("- `{item}`"));
            } else {
                self.line(format!("- {item}"));
            }
        }
        self
    }

    fn numbered(&mut self, intro: &str, points: &[&str]) -> &mut Self {
        self.line(intro.to_string()).blank();
        for (i, point) in points.iter().enumerate() {
            self.line(format!("{}. {point}", i + 1));
        }
        self.blank()
    }

    fn finish(&mut self) -> String {
        self.line(TOPICS_INSTRUCTIONS);
        self.0.join("\n")
    }
}

/// Inputs for a repository overview.
#[derive(Debug, Default)]
pub struct RepoPrompt<'a> {
    pub tree: &'a str,
    pub config: Option<&'a str>,
    pub readme: Option<&'a str>,
    pub entry_points: &'a [String],
}

impl RepoPrompt<'_> {
    pub fn render(&self) -> String {
        let mut s = Sections::default();
        s.line(ONBOARDER)
            .line("Provide a clear, structured overview of this repository.")
            .blank()
            .heading("Directory Structure")
            .code("", self.tree);
        if let Some(config) = self.config {
            s.blank().heading("Project Configuration").code("", config);
        }
        if let Some(readme) = self.readme {
            s.blank().heading("README").line(readme);
        }
        if !self.entry_points.is_empty() {
            s.blank().heading("Entry Points").bullets(self.entry_points, false);
        }
        s.blank().heading("Instructions").numbered(
            "Write a comprehensive overview covering:",
            &[
                "**Purpose**: What does this project do? What problem does it solve?",
                "**Architecture**: High-level architecture and design patterns used",
                "**Key Components**: The most important modules/packages and their roles",
                "**Data Flow**: How data flows through the system",
                "**Dependencies**: Notable external dependencies and why they're used",
                "**Entry Points**: How the application is started/invoked",
                "**Configuration**: How the project is configured",
            ],
        );
        s.line("Format your response as markdown with clear sections and headers.")
            .line("Be specific — reference actual file and directory names from the tree.")
            .line("Focus on helping someone new understand the codebase quickly.")
            .finish()
    }
}

/// Inputs for a single-file explanation.
#[derive(Debug, Default)]
pub struct FilePrompt<'a> {
    pub path: &'a str,
    pub content: &'a str,
    pub imports: &'a [String],
    pub imported_by: &'a [String],
    pub repo_context: Option<&'a str>,
}

impl FilePrompt<'_> {
    pub fn render(&self) -> String {
        let mut s = Sections::default();
        s.line(REVIEWER)
            .line(format!("Explain the following file: `{}`", self.path))
            .blank();
        if let Some(tree) = self.repo_context {
            s.heading("Repository Context").code("", tree).blank();
        }
        s.heading("File Content")
            .code(crate::inspect::guess_language(self.path), self.content)
            .blank();
        if !self.imports.is_empty() {
            s.heading("Imports").bullets(self.imports, true).blank();
        }
        if !self.imported_by.is_empty() {
            s.heading("Imported By").bullets(self.imported_by, true).blank();
        }
        s.heading("Instructions").numbered(
            "Explain this file covering:",
            &[
                "**Purpose**: What is this file's role in the project?",
                "**Key Components**: Important classes, functions, and constants",
                "**Patterns**: Design patterns or idioms used",
                "**Dependencies**: What it depends on and what depends on it",
                "**Flow**: How the code executes (control flow, data transformations)",
            ],
        );
        s.line("Format your response as markdown.")
            .line("Be concrete — reference specific functions, classes, and line-level details.")
            .finish()
    }
}

/// Inputs for a function or class explanation.
#[derive(Debug, Default)]
pub struct FunctionPrompt<'a> {
    pub path: &'a str,
    pub symbol: &'a str,
    pub source: &'a str,
    pub full_file: Option<&'a str>,
    pub related_tests: &'a [String],
}

impl FunctionPrompt<'_> {
    pub fn render(&self) -> String {
        let lang = crate::inspect::guess_language(self.path);
        let mut s = Sections::default();
        s.line(REVIEWER)
            .line(format!(
                "Explain the following symbol `{}` from `{}`.",
                self.symbol, self.path
            ))
            .blank()
            .heading("Source Code")
            .code(lang, self.source)
            .blank();
        if let Some(full) = self.full_file {
            s.heading("Full File Context")
                .line(format!(
                    "The symbol is defined in `{}`. Here is the full file for context:",
                    self.path
                ))
                .blank()
                .code(lang, full)
                .blank();
        }
        if !self.related_tests.is_empty() {
            s.heading("Related Tests").bullets(self.related_tests, true).blank();
        }
        s.heading("Instructions").numbered(
            "Explain this function/class covering:",
            &[
                "**Purpose**: What does it do and why does it exist?",
                "**Parameters**: What each parameter means and expected types/values",
                "**Return Value**: What it returns and when",
                "**Algorithm**: Step-by-step walkthrough of the logic",
                "**Side Effects**: Any mutations, I/O, or state changes",
                "**Error Handling**: How errors are handled or propagated",
                "**Usage**: How this is typically called (based on context)",
            ],
        );
        s.line("Format your response as markdown.")
            .line("Be precise — explain the actual logic, not just paraphrase the code.")
            .finish()
    }
}

/// Inputs for a diff explanation.
#[derive(Debug, Default)]
pub struct DiffPrompt<'a> {
    pub diff: &'a str,
    pub commit_log: Option<&'a str>,
    pub changed_files: &'a [String],
}

impl DiffPrompt<'_> {
    pub fn render(&self) -> String {
        let mut s = Sections::default();
        s.line("You are a senior software engineer explaining code changes to a colleague.")
            .line("Explain what changed in this diff and why.")
            .blank();
        if let Some(log) = self.commit_log.filter(|l| !l.trim().is_empty()) {
            s.heading("Commit History").code("", log.trim_end()).blank();
        }
        if !self.changed_files.is_empty() {
            s.heading("Changed Files").bullets(self.changed_files, true).blank();
        }
        s.heading("Diff")
            .code("diff", self.diff)
            .blank()
            .heading("Instructions")
            .numbered(
                "Explain these changes covering:",
                &[
                    "**Summary**: One-paragraph overview of what changed",
                    "**Motivation**: Why were these changes made? (infer from commit messages and code)",
                    "**File-by-File Breakdown**: For each changed file, explain what changed and why",
                    "**Impact**: What behavior changes as a result?",
                    "**Risks**: Any potential issues or things to watch out for",
                ],
            );
        s.line("Format your response as markdown.")
            .line("Focus on the 'why' — don't just describe what lines were added/removed.")
            .finish()
    }
}

/// Inputs for a free-form topic, answered from repository context.
#[derive(Debug, Default)]
pub struct GeneralPrompt<'a> {
    pub subject: &'a str,
    pub tree: &'a str,
    pub config: Option<&'a str>,
}

impl GeneralPrompt<'_> {
    pub fn render(&self) -> String {
        let mut s = Sections::default();
        s.line(ONBOARDER)
            .line(format!("The reader wants to understand: **{}**", self.subject))
            .blank()
            .heading("Repository Structure")
            .code("", self.tree)
            .blank();
        if let Some(config) = self.config {
            s.heading("Project Configuration").code("", config).blank();
        }
        s.heading("Instructions")
            .line(format!(
                "Explain **{}** in the context of this codebase.",
                self.subject
            ))
            .line("Reference specific files, modules, and patterns.")
            .line("If you can identify the relevant source files, include key code snippets.")
            .blank()
            .line("Format your response as markdown.")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explain_core::{TopicKind, parse_topics};

    #[test]
    fn every_prompt_asks_for_topics() {
        let prompts = [
            RepoPrompt {
                tree: "p/",
                ..Default::default()
            }
            .render(),
            FilePrompt {
                path: "a.py",
                content: "x = 1",
                ..Default::default()
            }
            .render(),
            FunctionPrompt {
                path: "a.py",
                symbol: "f",
                source: "def f(): pass",
                ..Default::default()
            }
            .render(),
            DiffPrompt {
                diff: "+x",
                ..Default::default()
            }
            .render(),
            GeneralPrompt {
                subject: "retries",
                tree: "p/",
                ..Default::default()
            }
            .render(),
        ];
        for prompt in prompts {
            assert!(prompt.ends_with(TOPICS_INSTRUCTIONS), "{prompt}");
        }
    }

    #[test]
    fn instruction_examples_parse_as_topics() {
        let topics = parse_topics(TOPICS_INSTRUCTIONS);
        let kinds: Vec<TopicKind> = topics.iter().map(|t| t.hint.clone()).collect();
        assert!(kinds.contains(&TopicKind::File));
        assert!(kinds.contains(&TopicKind::Function));
        assert!(kinds.contains(&TopicKind::General));
    }

    #[test]
    fn repo_prompt_sections() {
        let entry_points = vec!["src/main.rs".to_string()];
        let prompt = RepoPrompt {
            tree: "proj/\n└── src",
            config: Some("[package]"),
            readme: None,
            entry_points: &entry_points,
        }
        .render();
        assert!(prompt.starts_with(ONBOARDER));
        assert!(prompt.contains("## Directory Structure\n\n```\nproj/\n└── src\n```"));
        assert!(prompt.contains("## Project Configuration\n\n```\n[package]\n```"));
        assert!(prompt.contains("## Entry Points\n\n- src/main.rs\n"));
        assert!(!prompt.contains("## README"));
        assert!(prompt.contains("1. **Purpose**"));
    }

    #[test]
    fn file_prompt_fences_with_language() {
        let imports = vec!["import os".to_string()];
        let prompt = FilePrompt {
            path: "src/a.py",
            content: "import os",
            imports: &imports,
            ..Default::default()
        }
        .render();
        assert!(prompt.contains("Explain the following file: `src/a.py`"));
        assert!(prompt.contains("```python\nimport os\n```"));
        assert!(prompt.contains("## Imports\n\n- `import os`\n"));
        assert!(!prompt.contains("## Imported By"));
    }

    #[test]
    fn diff_prompt_skips_empty_log() {
        let prompt = DiffPrompt {
            diff: "+x",
            commit_log: Some("\n"),
            changed_files: &[],
        }
        .render();
        assert!(!prompt.contains("## Commit History"));
        assert!(prompt.contains("```diff\n+x\n```"));
    }
}
