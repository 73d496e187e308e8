//! Turning free-form model text into typed results.
//!
//! Model output has no agreed structure, so suggestion and bug-report
//! extraction yield nothing. Callers treat an empty collection as a normal
//! outcome. Only fenced code blocks are pulled out, for refactoring.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{BugReport, CodeSuggestion};

lazy_static! {
    /// First fenced block, optionally tagged `python`.
    static ref CODE_BLOCK: Regex =
        Regex::new(r"(?s)```(?:python)?\r?\n(.*?)\r?\n```").expect("valid regex");
}

/// Extract completion suggestions from model text.
pub fn parse_suggestions(_text: &str) -> Vec<CodeSuggestion> {
    Vec::new()
}

/// Extract bug reports from model text.
pub fn parse_bug_reports(_text: &str) -> Vec<BugReport> {
    Vec::new()
}

/// Return the body of the first fenced code block, or the text unchanged.
pub fn extract_code(text: &str) -> String {
    CODE_BLOCK
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| text.to_string())
}
