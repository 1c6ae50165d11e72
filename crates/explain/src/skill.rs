//! The agent skill description written by `explain install-skill`.

use serde::Serialize;

/// Directory the skill is installed into, relative to the cwd.
pub const DEFAULT_SKILL_DIR: &str = ".claude/skills/code-explainer";

pub const SKILL_FILE_NAME: &str = "SKILL.md";

/// YAML frontmatter of the skill file.
#[derive(Debug, Serialize)]
struct Frontmatter {
    name: &'static str,
    description: &'static str,
    #[serde(rename = "argument-hint")]
    argument_hint: &'static str,
    #[serde(rename = "allowed-tools")]
    allowed_tools: &'static str,
}

const FRONTMATTER: Frontmatter = Frontmatter {
    name: "code-explainer",
    description: "AI-powered code explanation with exploration queue for codebase onboarding",
    argument_hint: "[repo|file|function|diff|topics|next] [options]",
    allowed_tools: "Bash(explain *), Read",
};

const BODY: &str = r#"You are running AI-powered code explanations using the `explain` CLI tool. This tool provides just-in-time education about unfamiliar codebases. Each explanation surfaces follow-up topics, building a connected exploration session rather than isolated documents.

## How to Run

Run `explain $ARGUMENTS`. If the binary is missing, install it with `cargo install --path crates/explain` from a checkout.

## Exploration Workflow

```bash
explain repo ~/git/some-project    # start here
explain topics                      # see what was surfaced
explain next                        # explore next topic
explain next                        # keep going
explain next --skip                 # skip one
explain topics --all                # see progress
```

## Commands

- `repo [PATH]` — Repository architecture overview
- `file FILE` — Explain a file
- `function FILE:SYMBOL` — Explain a function or class
- `diff [-b BRANCH] [--base BASE]` — Explain changes (default: staged)
- `topics [--all]` — Show exploration queue
- `next [--skip]` — Explain or skip next topic

## Common Options

- `-m, --model` — Model (default: claude)
- `-d, --output-dir` — Output dir (default: ./explanations/)
- `-r, --repo` — Repo root (default: enclosing git repository)
- `--json` — Machine-readable output for `topics` and `next`

Explanations are saved as markdown in the output directory; the queue lives in `topics.json` next to them.
"#;

/// Renders `SKILL.md`: YAML frontmatter followed by the usage guide.
pub fn skill_markdown() -> Result<String, serde_yaml::Error> {
    let frontmatter = serde_yaml::to_string(&FRONTMATTER)?;
    Ok(format!("---\n{frontmatter}---\n\n{BODY}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontmatter_round_trips() {
        let doc = skill_markdown().unwrap();
        let rest = doc.strip_prefix("---\n").unwrap();
        let (yaml, body) = rest.split_once("\n---\n").unwrap();

        let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(value["name"].as_str(), Some("code-explainer"));
        assert_eq!(
            value["argument-hint"].as_str(),
            Some("[repo|file|function|diff|topics|next] [options]")
        );
        assert_eq!(value["allowed-tools"].as_str(), Some("Bash(explain *), Read"));
        assert!(body.contains("## Exploration Workflow"));
    }
}
