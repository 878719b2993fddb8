//! Architectural Enforcement Integration Tests
//!
//! Source scans that keep production code honest:
//! - no sleep calls (wait on I/O or timers, never poll)
//! - no blocking I/O inside async functions
//! - the core library stays free of terminal and CLI dependencies
//!
//! This library holds the scanner shared by the tests in `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["conductor/core/src", "conductor/cli/src"];

/// Integration test directories, relative to the workspace root
pub const INTEGRATION_TEST_DIRS: &[&str] = &["conductor/core/tests"];

/// Workspace root, independent of the directory tests run from
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Kind of function a line sits in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnKind {
    /// Plain `fn`
    Sync,
    /// `async fn`
    Async,
}

/// Classify a line as a function signature
///
/// Handles visibility (`pub`, `pub(crate)`, ...) and the `const`/`unsafe`
/// qualifiers. Closures and `fn` pointer types are not signatures.
pub fn fn_signature(line: &str) -> Option<FnKind> {
    let mut rest = line.trim_start();

    if let Some(after) = rest.strip_prefix("pub") {
        rest = match after.strip_prefix('(') {
            Some(inner) => inner.split_once(')').map_or("", |(_, tail)| tail),
            None => after,
        }
        .trim_start();
    }
    for qualifier in ["const ", "unsafe "] {
        if let Some(after) = rest.strip_prefix(qualifier) {
            rest = after.trim_start();
        }
    }

    if rest.starts_with("async fn ") {
        Some(FnKind::Async)
    } else if rest.starts_with("fn ") {
        Some(FnKind::Sync)
    } else {
        None
    }
}

/// Code part of a line, with any `//` comment removed
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// A scanned source file
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// All lines of the file
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Read a file; `None` if it cannot be read
    pub fn read(root: &Path, path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        Some(Self {
            path: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
            lines: content.lines().map(str::to_string).collect(),
        })
    }

    /// Index of the `#[cfg(test)]` line, where production code ends
    pub fn test_module_start(&self) -> usize {
        self.lines
            .iter()
            .position(|l| l.trim_start().starts_with("#[cfg(test)]"))
            .unwrap_or(self.lines.len())
    }

    /// Production lines as `(index, code)` with comments stripped
    pub fn production_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines[..self.test_module_start()]
            .iter()
            .enumerate()
            .map(|(idx, line)| (idx, code_part(line)))
    }

    /// All lines as `(index, code)` with comments stripped
    pub fn all_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(idx, line)| (idx, code_part(line)))
    }

    /// Kind of the nearest function signature at or above `idx`
    ///
    /// `None` at module level (before any function in the file).
    pub fn enclosing_fn(&self, idx: usize) -> Option<FnKind> {
        self.lines[..=idx]
            .iter()
            .rev()
            .find_map(|line| fn_signature(code_part(line)))
    }

    /// Format a violation at `idx`
    pub fn violation(&self, idx: usize, what: &str) -> String {
        format!(
            "{}:{} - {}: {}",
            self.path.display(),
            idx + 1,
            what,
            self.lines[idx].trim()
        )
    }
}

/// Every `.rs` file under the given workspace-relative directories
pub fn sources_in(dirs: &[&str]) -> Vec<SourceFile> {
    let root = workspace_root();
    let mut files = Vec::new();

    for dir in dirs {
        let path = root.join(dir);
        assert!(path.exists(), "scan directory missing: {}", path.display());

        for entry in walkdir::WalkDir::new(&path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
                if let Some(file) = SourceFile::read(&root, entry.path()) {
                    files.push(file);
                }
            }
        }
    }
    files
}

/// Print violations and fail
pub fn report(title: &str, hints: &[&str], violations: &[String]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n{title}\n");
    for violation in violations {
        eprintln!("  {violation}");
    }
    eprintln!();
    for hint in hints {
        eprintln!("  {hint}");
    }

    panic!(
        "\nFound {} violation(s). Fix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_signature_kinds() {
        assert_eq!(fn_signature("fn main() {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("    pub fn new() -> Self {"), Some(FnKind::Sync));
        assert_eq!(
            fn_signature("pub(crate) async fn run(&self) {"),
            Some(FnKind::Async)
        );
        assert_eq!(fn_signature("    async fn chat(&self) {"), Some(FnKind::Async));
        assert_eq!(fn_signature("pub const fn zero() -> u8 {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("let f = |x| x + 1;"), None);
        assert_eq!(fn_signature("    fnord();"), None);
    }

    #[test]
    fn test_enclosing_fn() {
        let file = SourceFile {
            path: PathBuf::from("x.rs"),
            lines: [
                "use std::fs;",
                "pub fn load() {",
                "    std::fs::read_to_string(\"a\");",
                "}",
                "async fn serve() {",
                "    std::fs::read_to_string(\"b\");",
                "}",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        };

        assert_eq!(file.enclosing_fn(0), None);
        assert_eq!(file.enclosing_fn(2), Some(FnKind::Sync));
        assert_eq!(file.enclosing_fn(5), Some(FnKind::Async));
    }

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let file = SourceFile {
            path: PathBuf::from("x.rs"),
            lines: ["fn a() {} // note", "#[cfg(test)]", "mod tests {}"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        };

        let lines: Vec<_> = file.production_lines().collect();
        assert_eq!(lines, vec![(0, "fn a() {} ")]);
    }

    #[test]
    fn test_workspace_root_contains_core() {
        assert!(workspace_root().join("conductor/core/Cargo.toml").exists());
    }
}
