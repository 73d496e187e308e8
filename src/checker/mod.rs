//! Local static analysis of Python snippets.
//!
//! The checker parses a snippet with tree-sitter and runs a list of
//! node-local [`Check`]s over the tree. A snippet that does not parse is
//! itself a finding: it yields exactly one HIGH report carrying the
//! parser's line and message, and no other check runs.
//!
//! Nothing here touches the network.

mod parse;
mod rules;

pub use parse::{language, parse_python, ParseError, ParsedSnippet};
pub use rules::{BareExceptCheck, Check, BARE_EXCEPT_FIX, BARE_EXCEPT_MESSAGE};

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::models::{BugReport, Severity};

/// Directory names never descended into when collecting files.
const SKIPPED_DIRS: &[&str] = &["venv", ".venv", "__pycache__", "node_modules", "site-packages"];

/// Runs a fixed set of checks over Python snippets.
pub struct StaticChecker {
    checks: Vec<Box<dyn Check>>,
}

impl Default for StaticChecker {
    fn default() -> Self {
        Self::new(vec![Box::new(BareExceptCheck)])
    }
}

impl StaticChecker {
    pub fn new(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    /// Check a snippet of source code.
    pub fn check(&self, source: &str) -> Vec<BugReport> {
        let parsed = match parse_python(source) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(line = e.line, message = %e.message, "snippet failed to parse");
                return vec![syntax_error_report(&e)];
            }
        };

        let mut reports = Vec::new();
        for check in &self.checks {
            let found = check.check(&parsed);
            tracing::trace!(check = check.id(), findings = found.len(), "check finished");
            reports.extend(found);
        }
        reports.sort_by_key(|r| r.line_number);
        reports
    }

    /// Read a file and check its contents.
    pub fn check_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<Vec<BugReport>> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Ok(self.check(&source))
    }
}

/// Convert a parse failure into a finding.
pub fn syntax_error_report(err: &ParseError) -> BugReport {
    BugReport::new(
        err.line,
        Severity::High,
        format!("Syntax Error: {}", err.message),
    )
}

/// Collect Python files under `root`. A file path is returned as-is.
pub fn collect_python_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.iter().any(|d| name == *d)
        })
    {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("py")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_runs_bare_except() {
        let reports = StaticChecker::default().check("try:\n    pass\nexcept:\n    pass\n");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].description, BARE_EXCEPT_MESSAGE);
    }

    #[test]
    fn test_syntax_error_becomes_high_finding() {
        let reports = StaticChecker::default().check("def f(:");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].severity, Severity::High);
        assert!(reports[0].description.starts_with("Syntax Error: "));
        assert!(reports[0].fix_suggestion.is_none());
    }

    #[test]
    fn test_invalid_snippet_skips_other_checks() {
        // The bare except would be a finding if the snippet parsed.
        let source = "try:\n    x = 1\nexcept:\n    pass\ndef broken(:\n";
        let reports = StaticChecker::default().check(source);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].severity, Severity::High);
    }

    #[test]
    fn test_no_checks_means_no_findings() {
        let checker = StaticChecker::new(Vec::new());
        assert!(checker.check("try:\n    pass\nexcept:\n    pass\n").is_empty());
    }

    #[test]
    fn test_collect_python_files_skips_hidden_and_venv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git").join("hook.py"), "x = 1\n").unwrap();
        std::fs::create_dir(dir.path().join("venv")).unwrap();
        std::fs::write(dir.path().join("venv").join("lib.py"), "x = 1\n").unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg").join("b.py"), "y = 2\n").unwrap();

        let files = collect_python_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.py", "b.py"]);
    }

    #[test]
    fn test_collect_python_files_accepts_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.py");
        std::fs::write(&file, "pass\n").unwrap();
        assert_eq!(collect_python_files(&file).unwrap(), vec![file]);
    }
}
