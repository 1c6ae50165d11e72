//! Extraction of follow-up topics from explanation text.
//!
//! Explanations end with a markdown section such as:
//!
//! ```text
//! ## Topics to Explore
//!
//! - [file] `src/workflow/executor.py` — How the plan executor dispatches tasks
//! - [function] `src/router.py:route_request` — The routing logic
//! - refactor the retry logic
//! ```
//!
//! Entries with a `[kind]` tag declare their kind; untagged entries are
//! classified by shape. Parsing is a single pass that materializes the whole
//! candidate list before anything is queued.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::enums::TopicKind;

/// A candidate topic as it appeared in the text, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTopic {
    /// Declared (`[kind]` tag) or inferred kind.
    pub hint: TopicKind,
    pub raw_target: String,
    /// Description following the target, if any.
    pub title: String,
}

impl RawTopic {
    pub fn new(hint: TopicKind, raw_target: impl Into<String>) -> Self {
        Self {
            hint,
            raw_target: raw_target.into(),
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:\s+(.*?))?\s*#*\s*$").expect("valid heading regex"));

static TOPICS_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\*\*)?topics?\s+to\s+explore(?:\*\*)?\s*:?$").expect("valid title regex")
});

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.+?)\s*$").expect("valid list regex"));

static KIND_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([A-Za-z_]+)\]\s*(.*)$").expect("valid tag regex"));

static BACKTICK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid backtick regex"));

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("valid symbol regex"));

static DIFF_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:diffs?|branch(?:es)?|changes)\b").expect("valid diff regex"));

static REPO_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:repo|repository|codebase)\b").expect("valid repo regex"));

/// Separators allowed between a backticked target and its description.
const TITLE_SEPARATORS: &[char] = &['—', '–', '-', ':'];

/// Parses the "Topics to Explore" section of `text` into candidates.
///
/// Returns an empty list when the section is missing. Candidates keep their
/// order of appearance; repeated raw targets are reported once.
pub fn parse_topics(text: &str) -> Vec<RawTopic> {
    let mut seen = HashSet::new();
    topic_section_entries(text)
        .into_iter()
        .filter_map(|entry| classify_entry(&entry))
        .filter(|raw| seen.insert(raw.raw_target.clone()))
        .collect()
}

/// Returns the list-entry texts inside the first "Topics to Explore" section.
fn topic_section_entries(text: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut section_level: Option<usize> = None;
    let mut fence: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            continue;
        }
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            fence = Some(&trimmed[..3]);
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            let level = caps[1].len();
            match section_level {
                Some(open) if level <= open => break,
                Some(_) => continue,
                None if TOPICS_TITLE_RE.is_match(caps.get(2).map_or("", |m| m.as_str())) => {
                    section_level = Some(level)
                }
                None => {}
            }
            continue;
        }

        if section_level.is_some() {
            if let Some(caps) = LIST_ITEM_RE.captures(line) {
                entries.push(caps[1].to_string());
            }
        }
    }

    entries
}

/// Turns one list entry into a candidate, or `None` if nothing usable remains.
fn classify_entry(entry: &str) -> Option<RawTopic> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    if let Some(caps) = KIND_TAG_RE.captures(entry) {
        let rest = caps[2].trim();
        if let Some(kind) = TopicKind::parse_tag(&caps[1]) {
            let (target, title) = split_target_and_title(rest);
            return Some(RawTopic::new(kind, target).with_title(title));
        }
        return classify_untagged(rest);
    }

    classify_untagged(entry)
}

fn classify_untagged(entry: &str) -> Option<RawTopic> {
    if entry.is_empty() {
        return None;
    }

    let spans: Vec<&str> = BACKTICK_RE
        .captures_iter(entry)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .collect();
    let title = if spans.is_empty() {
        String::new()
    } else {
        split_target_and_title(entry).1
    };

    let tokens: Vec<&str> = if spans.is_empty() {
        entry.split_whitespace().map(trim_token).collect()
    } else {
        spans
    };

    let (kind, target) = classify_shape(entry, &tokens);
    Some(RawTopic::new(kind, target).with_title(title))
}

/// Applies the shape heuristics; the first matching rule wins.
fn classify_shape(entry: &str, tokens: &[&str]) -> (TopicKind, String) {
    if let Some(token) = tokens.iter().find(|t| looks_like_function(t)) {
        return (TopicKind::Function, (*token).to_string());
    }
    if let Some(token) = tokens.iter().find(|t| looks_like_file(t)) {
        return (TopicKind::File, (*token).to_string());
    }
    if DIFF_WORD_RE.is_match(entry) {
        return (TopicKind::Diff, entry.to_string());
    }
    if REPO_WORD_RE.is_match(entry) {
        if let Some(token) = tokens.iter().find(|t| looks_like_dir(t)) {
            return (TopicKind::Repo, (*token).to_string());
        }
    }
    (TopicKind::General, entry.to_string())
}

/// Separators between a bare (unbackticked) target and its description.
const BARE_TITLE_SEPARATORS: &[&str] = &[" — ", " – ", " - ", ": "];

/// Splits `` `target` — description `` into its two halves. Without a
/// backticked span the text is cut at the first separator in
/// [`BARE_TITLE_SEPARATORS`], or taken whole as the target.
fn split_target_and_title(text: &str) -> (String, String) {
    match BACKTICK_RE.captures(text) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let target = caps[1].trim().to_string();
            let title = text[whole.end..]
                .trim_start()
                .trim_start_matches(TITLE_SEPARATORS)
                .trim()
                .to_string();
            (target, title)
        }
        None => {
            let cut = BARE_TITLE_SEPARATORS
                .iter()
                .filter_map(|sep| text.find(sep).map(|at| (at, sep.len())))
                .min_by_key(|&(at, _)| at);
            match cut {
                Some((at, len)) => (
                    text[..at].trim().to_string(),
                    text[at + len..].trim().to_string(),
                ),
                None => (text.trim().to_string(), String::new()),
            }
        }
    }
}

/// Strips prose punctuation around a whitespace token.
fn trim_token(token: &str) -> &str {
    let token = token.trim_matches(|c: char| matches!(c, ',' | ';' | '(' | ')' | '"' | '\'' | '*'));
    if token.chars().all(|c| c == '.') {
        return token;
    }
    token.trim_end_matches(|c: char| {
        matches!(c, '.' | ':' | '?' | '!' | ',' | ';' | ')' | '"' | '\'' | '*')
    })
}

fn is_pathish(token: &str) -> bool {
    !token.is_empty()
        && !token.contains("://")
        && !token.starts_with('-')
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/' | '\\' | '~' | '@' | '+'))
}

fn has_extension(token: &str) -> bool {
    let last = token.rsplit(['/', '\\']).next().unwrap_or(token);
    match last.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && (1..=10).contains(&ext.len())
                && (stem.len() > 1 || ext.len() > 1)
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

fn looks_like_file(token: &str) -> bool {
    is_pathish(token)
        && !token.ends_with('/')
        && token != "."
        && token != ".."
        && (token.contains('/') || token.contains('\\') || has_extension(token))
}

fn looks_like_dir(token: &str) -> bool {
    is_pathish(token)
        && (token == "."
            || token == ".."
            || token.ends_with('/')
            || token.contains('/')
            || token.starts_with('~'))
}

fn looks_like_function(token: &str) -> bool {
    match token.rsplit_once(':') {
        Some((path, symbol)) => SYMBOL_RE.is_match(symbol) && looks_like_file(path),
        None => false,
    }
}
