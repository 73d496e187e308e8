//! Node-local checks run over a parsed snippet.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};

use super::parse::{language, ParsedSnippet};
use crate::models::{BugReport, Severity};

/// Description attached to every bare except finding.
pub const BARE_EXCEPT_MESSAGE: &str = "Bare except clause - specify exception type";

/// Remediation attached to every bare except finding.
pub const BARE_EXCEPT_FIX: &str = "except Exception as e:";

const EXCEPT_QUERY: &str = r#"
(except_clause) @except
"#;

/// A single static check.
pub trait Check: Send + Sync {
    /// Short identifier (e.g., "bare_except").
    fn id(&self) -> &'static str;

    /// Run the check and return its findings in source order.
    fn check(&self, parsed: &ParsedSnippet) -> Vec<BugReport>;
}

/// Flags `except:` clauses that catch everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct BareExceptCheck;

impl Check for BareExceptCheck {
    fn id(&self) -> &'static str {
        "bare_except"
    }

    fn check(&self, parsed: &ParsedSnippet) -> Vec<BugReport> {
        let query = match Query::new(&language(), EXCEPT_QUERY) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(error = %e, "except_clause query failed to compile");
                return Vec::new();
            }
        };

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut reports = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                if is_bare(capture.node) {
                    reports.push(
                        BugReport::new(
                            capture.node.start_position().row + 1,
                            Severity::Medium,
                            BARE_EXCEPT_MESSAGE,
                        )
                        .with_fix(BARE_EXCEPT_FIX),
                    );
                }
            }
        }

        reports
    }
}

/// An except clause is bare when its keyword is immediately followed by `:`.
fn is_bare(node: Node) -> bool {
    let mut cursor = node.walk();
    let mut children = node
        .children(&mut cursor)
        .filter(|child| child.kind() != "comment");

    match (children.next(), children.next()) {
        (Some(keyword), Some(next)) => keyword.kind() == "except" && next.kind() == ":",
        _ => false,
    }
}
