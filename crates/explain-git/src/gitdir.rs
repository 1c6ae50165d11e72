//! Repository root discovery.

use std::path::{Path, PathBuf};

use crate::commands::git_command;

/// Walks up from `start` looking for `.git` (a directory, or a file for
/// worktrees). Returns the directory containing it.
///
/// Purely filesystem based; see [`get_git_root_via_command`] for git's own
/// answer.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Asks `git rev-parse --show-toplevel`. `None` outside a repository or
/// without git.
pub fn get_git_root_via_command(cwd: &Path) -> Option<PathBuf> {
    git_command(&["rev-parse", "--show-toplevel"], cwd)
        .ok()
        .map(|out| PathBuf::from(normalize_git_path(&out)))
}

/// Resolves the repository root for `explicit` (the `--repo` flag) or the
/// current directory.
///
/// An explicit path is used as given, made absolute. Otherwise the enclosing
/// git repository is preferred, falling back to `cwd` itself so that
/// explaining a plain directory still works.
pub fn resolve_repo_root(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(path) = explicit {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
        return joined.canonicalize().unwrap_or(joined);
    }
    find_git_root(cwd)
        .or_else(|| get_git_root_via_command(cwd))
        .unwrap_or_else(|| cwd.to_path_buf())
}

/// Converts MSYS-style (`/c/Users/...`) and forward-slash paths from git on
/// Windows to native form. A no-op elsewhere.
fn normalize_git_path(path: &str) -> String {
    if std::path::MAIN_SEPARATOR != '\\' {
        return path.to_string();
    }

    let path = path.trim();
    let bytes = path.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b'/' && bytes[1].is_ascii_alphabetic() {
        let drive = bytes[1].to_ascii_uppercase() as char;
        return format!("{drive}:{}", path[2..].replace('/', "\\"));
    }
    path.replace('/', "\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_root_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();

        let root = find_git_root(&nested).unwrap();
        assert_eq!(root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn explicit_repo_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("proj")).unwrap();
        let root = resolve_repo_root(Some(Path::new("proj")), dir.path());
        assert_eq!(root, dir.path().join("proj").canonicalize().unwrap());
    }

    #[test]
    fn plain_directory_falls_back_to_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let root = resolve_repo_root(None, dir.path());
        // The temp dir may itself sit inside a repository on some machines.
        assert!(dir.path().canonicalize().unwrap().starts_with(&root) || root == dir.path());
    }

    #[test]
    fn normalize_is_noop_on_unix() {
        if std::path::MAIN_SEPARATOR != '\\' {
            assert_eq!(normalize_git_path("/home/user/repo"), "/home/user/repo");
        }
    }
}
