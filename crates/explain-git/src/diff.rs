//! Diff and commit-log queries for diff explanations.

use std::path::Path;

use tracing::debug;

use crate::commands::{Result, git_command};

/// Context lines included around each hunk.
pub const DIFF_CONTEXT_LINES: u32 = 10;

/// Maximum number of commits listed in a commit log.
pub const COMMIT_LOG_LIMIT: u32 = 20;

/// Returns the diff of `branch` against `base` (`git diff base...branch`),
/// or of the staged changes when `branch` is `None`.
pub fn diff(branch: Option<&str>, base: &str, cwd: &Path) -> Result<String> {
    let context = format!("-U{DIFF_CONTEXT_LINES}");
    match branch {
        Some(branch) => {
            let range = format!("{base}...{branch}");
            git_command(&["diff", &context, &range], cwd)
        }
        None => git_command(&["diff", "--staged", &context], cwd),
    }
}

/// One-line commit summaries on `branch` since it left `base`. Empty for
/// staged changes or when git fails.
pub fn commit_log(branch: Option<&str>, base: &str, cwd: &Path) -> String {
    let Some(branch) = branch else {
        return String::new();
    };
    let max = format!("--max-count={COMMIT_LOG_LIMIT}");
    let range = format!("{base}...{branch}");
    git_command(&["log", "--oneline", &max, &range], cwd).unwrap_or_else(|e| {
        debug!(error = %e, "commit log unavailable");
        String::new()
    })
}

/// Paths of the files a unified diff touches, from its `+++ b/` lines.
/// Deleted files (`/dev/null`) are not listed.
pub fn changed_files(diff: &str) -> Vec<String> {
    diff.lines()
        .filter_map(|line| line.strip_prefix("+++ b/"))
        .filter(|path| *path != "/dev/null")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::git_available;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn git(dir: &Path, args: &[&str]) {
        let mut full = vec!["-c", "user.name=Test", "-c", "user.email=test@example.com"];
        full.extend_from_slice(args);
        git_command(&full, dir).unwrap();
    }

    #[test]
    fn changed_files_from_patch() {
        let patch = "\
diff --git a/src/a.rs b/src/a.rs
--- a/src/a.rs
+++ b/src/a.rs
@@ -1 +1 @@
-old
+new
diff --git a/gone.rs b/gone.rs
--- a/gone.rs
+++ /dev/null
diff --git a/new.rs b/new.rs
--- /dev/null
+++ b/new.rs
";
        assert_eq!(changed_files(patch), ["src/a.rs", "new.rs"]);
    }

    #[test]
    fn staged_and_branch_diffs() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        git(root, &["init", "-q", "-b", "main"]);
        fs::write(root.join("a.txt"), "one\n").unwrap();
        git(root, &["add", "a.txt"]);
        git(root, &["commit", "-q", "-m", "first"]);

        fs::write(root.join("a.txt"), "one\ntwo\n").unwrap();
        git(root, &["add", "a.txt"]);
        let staged = diff(None, "main", root).unwrap();
        assert!(staged.contains("+two"));
        assert_eq!(changed_files(&staged), ["a.txt"]);

        git(root, &["checkout", "-q", "-b", "feature"]);
        git(root, &["commit", "-q", "-m", "add two"]);
        let branch = diff(Some("feature"), "main", root).unwrap();
        assert!(branch.contains("+two"));
        assert!(commit_log(Some("feature"), "main", root).contains("add two"));
        assert!(commit_log(None, "main", root).is_empty());
    }

    #[test]
    fn unknown_base_is_an_error() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        assert!(diff(Some("nope"), "also-nope", dir.path()).is_err());
        assert!(commit_log(Some("nope"), "also-nope", dir.path()).is_empty());
    }
}
