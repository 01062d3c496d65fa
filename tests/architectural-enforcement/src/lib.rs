//! Architectural Enforcement
//!
//! Source scanners shared by the integration tests in `tests/`. They walk
//! the Keepsake crates and report lines that break a house rule:
//! - No sleeping in production code (rituals wait on absolute deadlines)
//! - No `unwrap()` / `expect()` outside tests in the core library
//! - No global mutable state; collaborators are injected
//! - No blocking filesystem calls in the core outside configuration loading
//!
//! Test modules (everything after a `#[cfg(test)]` line) and comments are
//! ignored.

use std::fs;
use std::path::{Path, PathBuf};

/// One offending line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Trimmed source text
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Workspace root, resolved from this crate's manifest
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Source directory of a workspace crate, e.g. `keepsake/core/src`
#[must_use]
pub fn crate_src(relative: &str) -> PathBuf {
    workspace_root().join(relative)
}

/// Every `.rs` file under `dir`
#[must_use]
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Production lines of a source text with their 1-based numbers
///
/// Stops at the first `#[cfg(test)]`; strips `//` comments.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .collect()
}

/// Scan production code under `dir` for lines matching `rule`
///
/// `allow` exempts whole files by path suffix.
pub fn scan<R>(dir: &Path, allow: &[&str], rule: R) -> Vec<Violation>
where
    R: Fn(&str) -> bool,
{
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        if allow.iter().any(|suffix| path.ends_with(suffix)) {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (line, code) in production_lines(&content) {
            if rule(code) {
                violations.push(Violation {
                    path: path.clone(),
                    line,
                    text: code.trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Panic with a readable report if any violation was found
pub fn assert_clean(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n{rule}: {} violation(s)", violations.len());
    for violation in violations {
        eprintln!("  {violation}");
    }
    panic!("{rule}: found {} violation(s)", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {}\n// x.unwrap()\nfn b() { c(); } // d.unwrap()\n#[cfg(test)]\nmod tests {}\n";
        let lines = production_lines(source);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], (2, ""));
        assert!(!lines[2].1.contains("unwrap"));
    }

    #[test]
    fn test_workspace_root_has_core() {
        assert!(crate_src("keepsake/core/src").join("lib.rs").exists());
    }
}
