//! Output formatting for assistant results.
//!
//! Findings can be written as:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration
//!
//! Suggestions and text replies support pretty and JSON.

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::checker::BARE_EXCEPT_MESSAGE;
use crate::models::{BugReport, CodeSuggestion, Severity};

/// Findings for one analyzed input.
#[derive(Debug, Clone, Default)]
pub struct FileFindings {
    /// File path, or `<stdin>`.
    pub file: String,
    pub findings: Vec<BugReport>,
}

/// Rule identifier for a finding, derived from its description.
pub fn rule_id(report: &BugReport) -> &'static str {
    if report.description.starts_with("Syntax Error") {
        "syntax_error"
    } else if report.description == BARE_EXCEPT_MESSAGE {
        "bare_except"
    } else {
        "ai_finding"
    }
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFindingsReport {
    pub version: String,
    pub files_scanned: usize,
    pub findings: Vec<JsonFinding>,
    /// Set when the model call failed and only static findings are shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFinding {
    pub rule: String,
    pub file: String,
    pub line: usize,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_suggestion: Option<String>,
}

pub fn build_json_findings(
    results: &[FileFindings],
    remote_error: Option<&str>,
) -> JsonFindingsReport {
    let findings = results
        .iter()
        .flat_map(|r| {
            r.findings.iter().map(move |f| JsonFinding {
                rule: rule_id(f).to_string(),
                file: r.file.clone(),
                line: f.line_number,
                severity: f.severity,
                description: f.description.clone(),
                fix_suggestion: f.fix_suggestion.clone(),
            })
        })
        .collect();

    JsonFindingsReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        files_scanned: results.len(),
        findings,
        remote_error: remote_error.map(str::to_string),
    }
}

pub fn write_json_findings(
    results: &[FileFindings],
    remote_error: Option<&str>,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json_findings(results, remote_error))?;
    println!("{}", json);
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuggestions {
    pub model: String,
    pub suggestions: Vec<CodeSuggestion>,
}

pub fn write_json_suggestions(model: &str, suggestions: &[CodeSuggestion]) -> anyhow::Result<()> {
    let report = JsonSuggestions {
        model: model.to_string(),
        suggestions: suggestions.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonText {
    pub task: String,
    pub model: String,
    pub text: String,
}

pub fn write_json_text(task: &str, model: &str, text: &str) -> anyhow::Result<()> {
    let report = JsonText {
        task: task.to_string(),
        model: model.to_string(),
        text: text.to_string(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "codeassist";

#[derive(Serialize, Deserialize)]
struct SarifReport {
    version: String,
    #[serde(rename = "$schema")]
    schema: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
struct SarifRule {
    id: String,
    name: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
struct SarifRuleConfig {
    level: String,
}

#[derive(Serialize, Deserialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifact,
    region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
struct SarifArtifact {
    uri: String,
}

#[derive(Serialize, Deserialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
}

/// Rule metadata for SARIF output.
struct RuleInfo {
    name: &'static str,
    short_description: &'static str,
    default_level: &'static str,
}

fn get_rule_info(rule_id: &str) -> RuleInfo {
    match rule_id {
        "bare_except" => RuleInfo {
            name: "BareExcept",
            short_description: "Detects except clauses that catch every exception",
            default_level: "warning",
        },
        "syntax_error" => RuleInfo {
            name: "SyntaxError",
            short_description: "The snippet is not valid Python",
            default_level: "error",
        },
        _ => RuleInfo {
            name: "AiFinding",
            short_description: "Issue reported by the language model",
            default_level: "note",
        },
    }
}

fn map_severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

/// Render findings as a SARIF document.
pub fn render_sarif(results: &[FileFindings]) -> anyhow::Result<String> {
    let rule_set: BTreeSet<&'static str> = results
        .iter()
        .flat_map(|r| r.findings.iter().map(rule_id))
        .collect();

    let rules = rule_set
        .iter()
        .map(|id| {
            let info = get_rule_info(id);
            SarifRule {
                id: id.to_string(),
                name: info.name.to_string(),
                short_description: SarifMessage {
                    text: info.short_description.to_string(),
                },
                default_config: SarifRuleConfig {
                    level: info.default_level.to_string(),
                },
            }
        })
        .collect();

    let sarif_results = results
        .iter()
        .flat_map(|r| {
            r.findings.iter().map(move |f| SarifResult {
                rule_id: rule_id(f).to_string(),
                level: map_severity_to_level(f.severity).to_string(),
                message: SarifMessage {
                    text: f.description.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifact {
                            uri: r.file.replace('\\', "/"),
                        },
                        region: SarifRegion {
                            // SARIF lines are 1-based; unknown lines point at the top.
                            start_line: f.line_number.max(1),
                        },
                    },
                }],
            })
        })
        .collect();

    let report = SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results: sarif_results,
        }],
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn write_sarif(results: &[FileFindings]) -> anyhow::Result<()> {
    println!("{}", render_sarif(results)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header(subtitle: &str) {
    println!();
    print!("  ");
    print!("{}", "codeassist".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    print!("  {}", "Task: ".dimmed());
    println!("{}", subtitle);
    println!();
}

/// Write findings in pretty (human-readable) format.
pub fn write_pretty_findings(results: &[FileFindings], remote_error: Option<&str>) {
    write_header("analyze");

    let total: usize = results.iter().map(|r| r.findings.len()).sum();
    if total == 0 {
        println!("  {}  no issues found in {} input(s)", "✓".green(), results.len());
    } else {
        println!("  {} ({}):", "Findings".bold(), total);
        println!();
        for r in results {
            for f in &r.findings {
                write_severity_tag(f.severity);
                print!("   ");
                print!("{:<14}", rule_id(f).dimmed());
                print!("{}", r.file.blue());
                if f.line_number > 0 {
                    print!("{}", format!(":{}", f.line_number).dimmed());
                }
                println!();
                println!("             {}", f.description);
                if let Some(fix) = &f.fix_suggestion {
                    println!("             {} {}", "fix:".dimmed(), fix.green());
                }
                println!();
            }
        }
    }

    if let Some(err) = remote_error {
        println!();
        println!(
            "  {} {}",
            "AI analysis unavailable:".yellow(),
            err.dimmed()
        );
    }
    println!();
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::High => print!("    {} ", "HIGH  ".red()),
        Severity::Medium => print!("    {} ", "MEDIUM".yellow()),
        Severity::Low => print!("    {} ", "LOW   ".blue()),
    }
}

pub fn write_pretty_suggestions(suggestions: &[CodeSuggestion]) {
    write_header("complete");

    if suggestions.is_empty() {
        println!("  {}", "No suggestions returned.".dimmed());
        println!();
        return;
    }

    for (i, s) in suggestions.iter().enumerate() {
        print!("  {}", format!("Suggestion {}", i + 1).bold());
        if !s.category.is_empty() {
            print!(" {}", format!("[{}]", s.category).dimmed());
        }
        println!(" {}", format!("({:.0}%)", s.confidence * 100.0).dimmed());
        for line in s.code.lines() {
            println!("    {}", line);
        }
        if !s.explanation.is_empty() {
            println!("  {}", s.explanation.dimmed());
        }
        println!();
    }
}

pub fn write_pretty_text(task: &str, text: &str) {
    write_header(task);
    if text.is_empty() {
        println!("  {}", "No response.".dimmed());
    } else {
        println!("{}", text);
    }
    println!();
}
