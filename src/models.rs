//! Value types produced by the assistant.

use serde::{Deserialize, Serialize};

/// Severity levels for bug reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// A code suggestion returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSuggestion {
    pub code: String,
    /// Model confidence in [0, 1].
    pub confidence: f64,
    pub explanation: String,
    pub category: String,
}

impl CodeSuggestion {
    /// Create a suggestion, clamping `confidence` into [0, 1].
    pub fn new(
        code: impl Into<String>,
        confidence: f64,
        explanation: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            code: code.into(),
            confidence,
            explanation: explanation.into(),
            category: category.into(),
        }
    }
}

/// A detected bug or code issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugReport {
    /// 1-indexed line, or 0 when unknown.
    pub line_number: usize,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_suggestion: Option<String>,
}

impl BugReport {
    pub fn new(line_number: usize, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            line_number,
            severity,
            description: description.into(),
            fix_suggestion: None,
        }
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix_suggestion = Some(fix.into());
        self
    }
}

/// Check if any report in the list is at or above the given severity.
pub fn any_at_least(reports: &[BugReport], severity: Severity) -> bool {
    reports.iter().any(|r| r.severity >= severity)
}
