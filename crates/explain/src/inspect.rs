//! Read-only repository inspection that feeds the prompts.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

/// Directories never shown in trees or searched for related files.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "__pycache__",
    ".tox",
    ".venv",
    "venv",
    ".env",
    "env",
    ".eggs",
    "dist",
    "build",
    "target",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "htmlcov",
    ".coverage",
];

/// Compiled artifacts left out of trees.
const SKIP_EXTENSIONS: &[&str] = &["pyc", "pyo", "so", "o", "a", "dylib"];

/// Project manifests, most specific first.
pub const CONFIG_FILES: &[&str] = &[
    "pyproject.toml",
    "package.json",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Makefile",
];

const README_FILES: &[&str] = &["README.md", "README.rst", "README.txt", "README"];

const ENTRY_POINT_CANDIDATES: &[&str] = &[
    "src/main.rs",
    "src/main.py",
    "main.py",
    "app.py",
    "src/app.py",
    "manage.py",
    "setup.py",
    "cli.py",
    "main.go",
];

/// Deepest directory level searched for importers and tests.
const MAX_SEARCH_DEPTH: usize = 12;

/// Most related test files listed for a symbol.
const MAX_RELATED_TESTS: usize = 20;

/// Reads a UTF-8 text file; `None` if it is missing, unreadable or binary.
pub fn read_text(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn is_skipped(name: &str, is_dir: bool) -> bool {
    // Dotted entries such as `.env` are skipped whether file or directory.
    if SKIP_DIRS.contains(&name) && (is_dir || name.starts_with('.')) {
        return true;
    }
    if is_dir {
        return name.ends_with(".egg-info");
    }
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SKIP_EXTENSIONS.contains(&ext))
}

struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Directories first, then by name.
fn list_dir(dir: &Path) -> Vec<Entry> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut entries: Vec<Entry> = read
        .filter_map(|e| e.ok())
        .map(|e| {
            let path = e.path();
            Entry {
                name: e.file_name().to_string_lossy().into_owned(),
                is_dir: path.is_dir(),
                path,
            }
        })
        .filter(|e| !is_skipped(&e.name, e.is_dir))
        .collect();
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    entries
}

/// Renders a directory tree of `root` down to `max_depth` levels.
///
/// ```text
/// project/
/// ├── src
/// │   └── main.rs
/// └── Cargo.toml
/// ```
pub fn repo_tree(root: &Path, max_depth: usize) -> String {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut lines = vec![format!("{name}/")];
    walk_tree(root, "", 1, max_depth, &mut lines);
    lines.join("\n")
}

fn walk_tree(dir: &Path, prefix: &str, depth: usize, max_depth: usize, lines: &mut Vec<String>) {
    if depth > max_depth {
        return;
    }
    let entries = list_dir(dir);
    let last = entries.len().saturating_sub(1);
    for (i, entry) in entries.iter().enumerate() {
        let is_last = i == last;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{}", entry.name));
        if entry.is_dir {
            let extension = if is_last { "    " } else { "│   " };
            walk_tree(&entry.path, &format!("{prefix}{extension}"), depth + 1, max_depth, lines);
        }
    }
}

/// Calls `visit` with every file under `root`, skipping [`SKIP_DIRS`].
fn walk_files(root: &Path, visit: &mut dyn FnMut(&Path)) {
    fn go(dir: &Path, depth: usize, visit: &mut dyn FnMut(&Path)) {
        if depth > MAX_SEARCH_DEPTH {
            return;
        }
        for entry in list_dir(dir) {
            if entry.is_dir {
                go(&entry.path, depth + 1, visit);
            } else {
                visit(&entry.path);
            }
        }
    }
    go(root, 1, visit);
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// The first project manifest found in `root`, with its contents.
pub fn project_config(root: &Path) -> Option<(&'static str, String)> {
    CONFIG_FILES
        .iter()
        .find_map(|name| read_text(&root.join(name)).map(|content| (*name, content)))
}

/// The README in `root`, if any.
pub fn readme(root: &Path) -> Option<String> {
    README_FILES.iter().find_map(|name| read_text(&root.join(name)))
}

/// Conventional entry-point files present in `root`, plus the
/// `[project.scripts]` lines of a pyproject manifest.
pub fn entry_points(root: &Path, config: Option<&str>) -> Vec<String> {
    let mut found: Vec<String> = ENTRY_POINT_CANDIDATES
        .iter()
        .filter(|candidate| root.join(candidate).is_file())
        .map(|candidate| candidate.to_string())
        .collect();

    if let Some(config) = config {
        let scripts = config
            .lines()
            .skip_while(|line| !line.contains("[project.scripts]"))
            .skip(1)
            .take_while(|line| !line.starts_with('['))
            .filter(|line| line.contains('='))
            .map(|line| line.trim().to_string());
        found.extend(scripts);
    }
    found
}

fn is_import_line(line: &str) -> bool {
    ["import ", "from ", "use ", "#include "]
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Import statements of a source file.
pub fn imports(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| is_import_line(line))
        .map(str::to_string)
        .collect()
}

/// Files under `root` with the same extension as `file` whose imports
/// mention its stem.
pub fn imported_by(root: &Path, file: &Path) -> Vec<String> {
    let (Some(stem), Some(ext)) = (
        file.file_stem().and_then(|s| s.to_str()),
        file.extension().and_then(|s| s.to_str()),
    ) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    walk_files(root, &mut |path| {
        if path == file || path.extension().and_then(|e| e.to_str()) != Some(ext) {
            return;
        }
        let Some(content) = read_text(path) else {
            return;
        };
        if imports(&content).iter().any(|line| line.contains(stem)) {
            found.push(relative(path, root));
        }
    });
    found
}

/// Extracts the definition of `symbol` from `content`.
///
/// Definitions ending in `:` (Python) extend over the more-indented lines
/// that follow. Anything else is taken to be brace-delimited and extends to
/// the matching close brace, or to the first `;` when no brace opens.
/// Attribute, decorator and doc-comment lines directly above are included.
pub fn extract_symbol(content: &str, symbol: &str) -> Option<String> {
    let pattern = format!(
        r"^\s*(?:(?:pub(?:\([^)]*\))?|export|default|async|static|public|private|protected|unsafe|const|extern)\s+)*(?:def|class|fn|struct|enum|trait|impl|type|func|function|interface)\s+{}\b",
        regex::escape(symbol)
    );
    let definition = Regex::new(&pattern).ok()?;

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.iter().position(|line| definition.is_match(line))?;

    let mut first = start;
    while first > 0 {
        let above = lines[first - 1].trim_start();
        if above.starts_with('@') || above.starts_with("#[") || above.starts_with("///") {
            first -= 1;
        } else {
            break;
        }
    }

    let end = if lines[start].trim_end().ends_with(':') {
        indented_block_end(&lines, start)
    } else {
        brace_block_end(&lines, start)
    };
    Some(lines[first..=end].join("\n"))
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn indented_block_end(lines: &[&str], start: usize) -> usize {
    let base = indent_of(lines[start]);
    let mut end = start;
    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if indent_of(line) <= base {
            break;
        }
        end = i;
    }
    end
}

fn brace_block_end(lines: &[&str], start: usize) -> usize {
    let mut depth = 0i32;
    let mut opened = false;
    for (i, line) in lines.iter().enumerate().skip(start) {
        for c in line.chars() {
            match c {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                ';' if !opened => return i,
                _ => {}
            }
        }
        if opened && depth <= 0 {
            return i;
        }
    }
    lines.len() - 1
}

fn is_test_file(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    stem.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with("_tests")
        || stem.ends_with(".test")
        || stem.ends_with(".spec")
        || path.components().any(|c| c.as_os_str() == "tests")
}

/// Test files related to `file`: named after it, or mentioning `symbol`.
pub fn related_tests(root: &Path, file: &Path, symbol: Option<&str>) -> Vec<String> {
    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let mut found = Vec::new();
    walk_files(root, &mut |path| {
        if found.len() >= MAX_RELATED_TESTS || path == file {
            return;
        }
        let rel = relative(path, root);
        if !is_test_file(Path::new(&rel)) {
            return;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let named_after = !stem.is_empty() && name.contains(stem);
        let mentions = || symbol.is_some_and(|s| read_text(path).is_some_and(|c| c.contains(s)));
        if named_after || mentions() {
            found.push(rel);
        }
    });
    found
}

/// Fence language for syntax highlighting, from the file extension.
pub fn guess_language(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match ext {
        "py" => "python",
        "js" => "javascript",
        "ts" => "typescript",
        "tsx" => "tsx",
        "jsx" => "jsx",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "rb" => "ruby",
        "sh" => "bash",
        "yml" | "yaml" => "yaml",
        "toml" => "toml",
        "json" => "json",
        "md" => "markdown",
        "sql" => "sql",
        "html" => "html",
        "css" => "css",
        "c" | "h" => "c",
        "cpp" | "hpp" | "cc" => "cpp",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn tree_sorts_dirs_first_and_skips_noise() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        write(&root, "src/main.rs", "");
        write(&root, "src/lib.rs", "");
        write(&root, "Cargo.toml", "");
        write(&root, "target/debug/x", "");
        write(&root, ".git/HEAD", "");
        write(&root, "mod.pyc", "");
        write(&root, ".env", "");

        assert_eq!(
            repo_tree(&root, 4),
            "proj/\n├── src\n│   ├── lib.rs\n│   └── main.rs\n└── Cargo.toml"
        );
        assert_eq!(repo_tree(&root, 1), "proj/\n├── src\n└── Cargo.toml");
    }

    #[test]
    fn config_readme_and_entry_points() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "Makefile", "all:");
        write(
            root,
            "pyproject.toml",
            "[project]\nname = \"x\"\n\n[project.scripts]\nexplain = \"x.cli:main\"\n\n[tool.ruff]\nline = 1\n",
        );
        write(root, "README.rst", "hello");
        write(root, "main.py", "");

        let (name, content) = project_config(root).unwrap();
        assert_eq!(name, "pyproject.toml");
        assert_eq!(readme(root).as_deref(), Some("hello"));
        assert_eq!(
            entry_points(root, Some(&content)),
            vec!["main.py".to_string(), "explain = \"x.cli:main\"".to_string()]
        );
    }

    #[test]
    fn finds_imports_and_importers() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "pkg/client.py", "import os\nfrom typing import Any\n\nx = 1\n");
        write(root, "pkg/app.py", "from pkg.client import x\n");
        write(root, "pkg/other.py", "import json\n");

        let client = root.join("pkg/client.py");
        assert_eq!(
            imports(&read_text(&client).unwrap()),
            vec!["import os", "from typing import Any"]
        );
        assert_eq!(imported_by(root, &client), vec!["pkg/app.py"]);
    }

    #[test]
    fn extracts_python_definitions() {
        let src = "import x\n\n@cached\ndef login(user):\n    if user:\n        return 1\n\n    return 0\n\ndef other():\n    pass\n";
        assert_eq!(
            extract_symbol(src, "login").unwrap(),
            "@cached\ndef login(user):\n    if user:\n        return 1\n\n    return 0"
        );

        let class = "class Client:\n    def go(self):\n        pass\nx = 1\n";
        assert_eq!(
            extract_symbol(class, "Client").unwrap(),
            "class Client:\n    def go(self):\n        pass"
        );
        assert_eq!(extract_symbol(class, "go").unwrap(), "    def go(self):\n        pass");
    }

    #[test]
    fn extracts_brace_definitions() {
        let src = "/// Adds.\npub fn add(a: i32, b: i32) -> i32 {\n    if a > 0 {\n        a + b\n    } else {\n        b\n    }\n}\n\nfn other() {}\npub struct Unit;\n";
        assert_eq!(
            extract_symbol(src, "add").unwrap(),
            "/// Adds.\npub fn add(a: i32, b: i32) -> i32 {\n    if a > 0 {\n        a + b\n    } else {\n        b\n    }\n}"
        );
        assert_eq!(extract_symbol(src, "other").unwrap(), "fn other() {}");
        assert_eq!(extract_symbol(src, "Unit").unwrap(), "pub struct Unit;");
    }

    #[test]
    fn symbol_must_match_whole_name() {
        let src = "def login_user():\n    pass\n";
        assert_eq!(extract_symbol(src, "login"), None);
        assert_eq!(extract_symbol(src, "missing"), None);
    }

    #[test]
    fn related_tests_by_name_or_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/auth.py", "def login():\n    pass\n");
        write(root, "tests/test_auth.py", "");
        write(root, "tests/test_flow.py", "from src.auth import login\n");
        write(root, "tests/test_misc.py", "");
        write(root, "src/helpers.py", "login()\n");

        let found = related_tests(root, &root.join("src/auth.py"), Some("login"));
        assert_eq!(found, vec!["tests/test_auth.py", "tests/test_flow.py"]);
    }

    #[test]
    fn languages() {
        assert_eq!(guess_language("src/a.py"), "python");
        assert_eq!(guess_language("lib.rs"), "rust");
        assert_eq!(guess_language("Makefile"), "");
    }
}
