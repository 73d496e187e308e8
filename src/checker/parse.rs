//! Python snippet parsing with tree-sitter.

use thiserror::Error;
use tree_sitter::{Language, Node, Parser};

/// A snippet that could not be parsed as valid Python.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-indexed line of the first syntax error, or 0 when unknown.
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn unknown(message: impl Into<String>) -> Self {
        Self {
            line: 0,
            message: message.into(),
        }
    }
}

/// Holds a parsed tree-sitter tree and the source it was built from.
pub struct ParsedSnippet {
    pub tree: tree_sitter::Tree,
    pub source: Vec<u8>,
}

/// The tree-sitter Python grammar.
pub fn language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

/// Parse a Python snippet.
///
/// tree-sitter recovers from syntax errors by inserting ERROR and MISSING
/// nodes, so a tree is rejected whenever it contains either kind. The first
/// such node in document order determines the reported line.
pub fn parse_python(source: &str) -> Result<ParsedSnippet, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .map_err(|e| ParseError::unknown(format!("grammar unavailable: {}", e)))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::unknown("parser produced no tree"))?;

    if tree.root_node().has_error() {
        return Err(first_error(tree.root_node())
            .map(|node| ParseError {
                line: node.start_position().row + 1,
                message: describe_error(node),
            })
            .unwrap_or_else(|| ParseError::unknown("invalid syntax")));
    }

    // The grammar still accepts some Python 2 forms that Python 3 rejects.
    if let Some(node) = first_legacy_node(tree.root_node()) {
        return Err(ParseError {
            line: node.start_position().row + 1,
            message: "invalid syntax".to_string(),
        });
    }

    tracing::debug!(bytes = source.len(), "parsed snippet");

    Ok(ParsedSnippet {
        tree,
        source: source.as_bytes().to_vec(),
    })
}

/// Find the first ERROR or MISSING node in pre-order.
fn first_error(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        // Only descend into subtrees that contain an error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Find the first Python 2 only construct in pre-order: `print x`,
/// `exec code`, or `except E, name:`.
fn first_legacy_node(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if is_legacy(node) {
            return Some(node);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn is_legacy(node: Node) -> bool {
    match node.kind() {
        "print_statement" | "exec_statement" => true,
        "except_clause" => {
            let mut cursor = node.walk();
            let has_comma = node.children(&mut cursor).any(|child| child.kind() == ",");
            has_comma
        }
        _ => false,
    }
}

fn describe_error(node: Node) -> String {
    if node.is_missing() {
        format!("expected '{}'", node.kind())
    } else {
        "invalid syntax".to_string()
    }
}
