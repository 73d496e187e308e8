//! codeassist - a thin AI code assistant client.
//!
//! Source code is wrapped in a task-specific prompt and forwarded to an
//! OpenAI-compatible chat completions endpoint; the model's text is relayed
//! back. One check runs locally: bare `except:` clauses in Python snippets
//! are found by walking the tree-sitter syntax tree.
//!
//! # Architecture
//!
//! - `checker`: tree-sitter parsing and static checks
//! - `llm`: prompt templates and the dispatcher boundary
//! - `response`: extraction of typed results from model text
//! - `assistant`: the capability facade (complete, analyze, refactor, ...)
//! - `config`: YAML + environment configuration
//! - `report`: output formatting (pretty, JSON, SARIF)
//!
//! # Example
//!
//! ```no_run
//! use codeassist::{CodeAssistant, RefactorStyle};
//!
//! let assistant = CodeAssistant::new("sk-...", "gpt-4");
//! for bug in assistant.analyze("try:\n    x = 1\nexcept:\n    pass") {
//!     println!("Line {}: [{}] {}", bug.line_number, bug.severity, bug.description);
//! }
//! let cleaner = assistant.refactor("def calc(x,y):\n    return x+y", RefactorStyle::Readability);
//! println!("{}", cleaner);
//! ```

pub mod assistant;
pub mod checker;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod report;
pub mod response;

pub use assistant::CodeAssistant;
pub use checker::{ParseError, StaticChecker};
pub use config::{Config, ConfigError};
pub use llm::{
    Dispatcher, OpenAiDispatcher, PromptRequest, RefactorStyle, RemoteCallError, Task, TaskOptions,
};
pub use models::{BugReport, CodeSuggestion, Severity};
