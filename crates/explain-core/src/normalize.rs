//! Topic normalization: raw `(kind, target)` pairs to canonical topics.
//!
//! All path handling is lexical. Nothing here touches the filesystem, so a
//! key computed today matches the key computed on the next load even if the
//! file has since been moved or deleted.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::enums::TopicKind;
use crate::parser::RawTopic;
use crate::topic::{DEFAULT_DIFF_BASE, DiffRange, NormalizedTopic};

/// Maximum number of characters of a general topic's text used in its key.
pub const GENERAL_KEY_MAX_CHARS: usize = 80;

/// Reasons a candidate cannot become a topic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("topic target is empty")]
    EmptyTarget,

    #[error("function target '{0}' must be PATH:SYMBOL")]
    MalformedFunction(String),

    #[error("unknown topic kind '{0}'")]
    UnknownKind(String),
}

/// Converts raw candidates into [`NormalizedTopic`]s.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    repo_root: Option<String>,
}

impl Normalizer {
    /// A normalizer that leaves absolute paths absolute.
    pub fn new() -> Self {
        Self::default()
    }

    /// A normalizer that rewrites absolute paths under `root` relative to it.
    pub fn with_repo_root(root: impl AsRef<Path>) -> Self {
        Self {
            repo_root: Some(canonical_path(&root.as_ref().to_string_lossy())),
        }
    }

    /// Returns the configured repository root, if any.
    pub fn repo_root(&self) -> Option<PathBuf> {
        self.repo_root.as_ref().map(PathBuf::from)
    }

    /// Normalizes a parsed candidate, carrying its title along.
    pub fn normalize_raw(&self, raw: &RawTopic) -> Result<NormalizedTopic, NormalizeError> {
        self.normalize(&raw.hint, &raw.raw_target)
            .map(|t| t.with_title(raw.title.clone()))
    }

    /// Normalizes every candidate, dropping (and logging) the ones that fail.
    pub fn normalize_all(&self, raws: &[RawTopic]) -> Vec<NormalizedTopic> {
        raws.iter()
            .filter_map(|raw| match self.normalize_raw(raw) {
                Ok(topic) => Some(topic),
                Err(e) => {
                    debug!(raw_target = %raw.raw_target, kind = %raw.hint, error = %e, "dropping topic candidate");
                    None
                }
            })
            .collect()
    }

    /// Normalizes a single `(kind, target)` pair.
    pub fn normalize(
        &self,
        kind: &TopicKind,
        raw_target: &str,
    ) -> Result<NormalizedTopic, NormalizeError> {
        let raw = raw_target.trim();
        if raw.is_empty() {
            return Err(NormalizeError::EmptyTarget);
        }

        let target = match kind {
            TopicKind::File | TopicKind::Repo => self.relative_path(raw),
            TopicKind::Function => {
                let (path, symbol) = raw
                    .rsplit_once(':')
                    .map(|(p, s)| (p.trim(), s.trim()))
                    .filter(|(p, s)| !p.is_empty() && !s.is_empty())
                    .ok_or_else(|| NormalizeError::MalformedFunction(raw.to_string()))?;
                format!("{}:{}", self.relative_path(path), symbol)
            }
            TopicKind::Diff => DiffRange::from_text(raw).to_target(),
            TopicKind::General => raw.to_string(),
            TopicKind::Unknown(other) => return Err(NormalizeError::UnknownKind(other.clone())),
        };

        Ok(NormalizedTopic {
            key: canonical_key(kind, &target),
            kind: kind.clone(),
            target,
            title: String::new(),
        })
    }

    /// Canonicalizes `raw` and strips the repository root prefix when present.
    fn relative_path(&self, raw: &str) -> String {
        let path = canonical_path(raw);
        let Some(root) = self.repo_root.as_deref() else {
            return path;
        };
        if path == root {
            return ".".to_string();
        }
        match path.strip_prefix(root) {
            Some(rest) if rest.starts_with('/') => rest[1..].to_string(),
            _ if root == "/" && path.starts_with('/') => path[1..].to_string(),
            _ => path,
        }
    }
}

/// Lexically canonicalizes a path: `\` becomes `/`, `.` segments and
/// trailing slashes are removed, and `..` collapses the previous segment.
///
/// An empty relative result is `"."`. Leading `..` segments of a relative
/// path are kept; `..` above `/` is dropped.
pub fn canonical_path(raw: &str) -> String {
    let unified = raw.trim().replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Key text for a general topic: trimmed, whitespace-collapsed, lowercased
/// and cut to [`GENERAL_KEY_MAX_CHARS`] characters.
pub fn general_key_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .take(GENERAL_KEY_MAX_CHARS)
        .collect()
}

/// Derives the canonical key for a `(kind, target)` pair.
///
/// Targets are re-canonicalized so records written by older versions (or by
/// hand) with `./` prefixes or trailing slashes still collide with their
/// canonical form.
pub fn canonical_key(kind: &TopicKind, target: &str) -> String {
    match kind {
        TopicKind::File => format!("file:{}", canonical_path(target)),
        TopicKind::Repo => format!("repo:{}", canonical_path(target)),
        TopicKind::Function => match target.rsplit_once(':') {
            Some((path, symbol)) => {
                format!("function:{}:{}", canonical_path(path), symbol.trim())
            }
            None => format!("function:{}", target.trim()),
        },
        TopicKind::Diff => DiffRange::from_target(target).key(),
        TopicKind::General => format!("general:{}", general_key_text(target)),
        TopicKind::Unknown(other) => format!("{other}:{}", target.trim()),
    }
}

// ---------------------------------------------------------------------------
// Diff text parsing
// ---------------------------------------------------------------------------

/// Words that follow "branch" in prose without naming one.
const NOT_A_BRANCH: &[&str] = &[
    "a", "an", "and", "changes", "for", "in", "is", "of", "on", "or", "that", "the", "this", "to",
    "with",
];

impl DiffRange {
    /// Extracts a range from free text such as `branch feature/login against
    /// develop`, `main...feature/x`, or a bare branch name.
    ///
    /// Anything unrecognized falls back to staged changes against
    /// [`DEFAULT_DIFF_BASE`].
    pub fn from_text(text: &str) -> Self {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| matches!(c, '`' | '"' | '\'' | ',' | ';' | '(' | ')'))
                    .to_string()
            })
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.len() == 1 {
            let only = tokens[0].as_str();
            if only.contains("...") {
                return Self::from_git_range(only, "...");
            }
            if only.contains("..") {
                return Self::from_git_range(only, "..");
            }
            if only.contains("->") {
                let (branch, base) = only.split_once("->").unwrap_or((only, ""));
                return Self::new(branch, or_default_base(base));
            }
            if matches!(only.to_lowercase().as_str(), "staged" | "diff" | "changes") {
                return Self::staged();
            }
            return Self::new(only, DEFAULT_DIFF_BASE);
        }

        for token in &tokens {
            if let Some(sep) = ["...", ".."].into_iter().find(|sep| token.contains(*sep)) {
                let (base, branch) = token.split_once(sep).unwrap_or(("", ""));
                if !base.is_empty() && !branch.is_empty() {
                    return Self::new(branch, base);
                }
            }
        }

        let mut range = Self::staged();
        for pair in tokens.windows(2) {
            let keyword = pair[0].to_lowercase();
            let value = pair[1].trim_end_matches(['.', ':']);
            if value.is_empty() || NOT_A_BRANCH.contains(&value.to_lowercase().as_str()) {
                continue;
            }
            match keyword.as_str() {
                "branch" if range.branch.is_empty() => range.branch = value.to_string(),
                "against" | "vs" | "vs." | "base" | "onto" => range.base = value.to_string(),
                _ => {}
            }
        }
        range
    }

    /// `base...branch` / `base..branch`, git's own spelling.
    fn from_git_range(token: &str, sep: &str) -> Self {
        match token.split_once(sep) {
            Some((base, branch)) if !branch.is_empty() => Self::new(branch, or_default_base(base)),
            Some((base, _)) => Self::new(base, DEFAULT_DIFF_BASE),
            None => Self::new(token, DEFAULT_DIFF_BASE),
        }
    }
}

fn or_default_base(base: &str) -> &str {
    if base.trim().is_empty() {
        DEFAULT_DIFF_BASE
    } else {
        base.trim()
    }
}
