//! Prompt templates and sampling options for each task.

use serde::{Deserialize, Serialize};

/// The capabilities exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Complete,
    Analyze,
    Refactor,
    Document,
    Explain,
}

impl Task {
    pub const ALL: [Task; 5] = [
        Task::Complete,
        Task::Analyze,
        Task::Refactor,
        Task::Document,
        Task::Explain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Complete => "complete",
            Task::Analyze => "analyze",
            Task::Refactor => "refactor",
            Task::Document => "document",
            Task::Explain => "explain",
        }
    }

    /// System role message sent with every request for this task.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Task::Complete => "You are an expert programming assistant.",
            Task::Analyze => "You are a security and code quality expert.",
            Task::Refactor => "You are a code refactoring expert.",
            Task::Document => "You are a technical documentation expert.",
            Task::Explain => "You are a patient coding instructor.",
        }
    }

    /// Sampling defaults for this task.
    pub fn default_options(&self) -> TaskOptions {
        let (temperature, max_tokens) = match self {
            Task::Complete => (0.7, 500),
            Task::Analyze => (0.3, 500),
            Task::Refactor => (0.5, 1000),
            Task::Document => (0.6, 800),
            Task::Explain => (0.6, 500),
        };
        TaskOptions {
            temperature,
            max_tokens,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Task::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown task: {}", s))
    }
}

/// Principles a refactoring should follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefactorStyle {
    #[default]
    CleanCode,
    Performance,
    Readability,
}

impl RefactorStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefactorStyle::CleanCode => "clean_code",
            RefactorStyle::Performance => "performance",
            RefactorStyle::Readability => "readability",
        }
    }
}

impl std::fmt::Display for RefactorStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RefactorStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "clean_code" => Ok(RefactorStyle::CleanCode),
            "performance" => Ok(RefactorStyle::Performance),
            "readability" => Ok(RefactorStyle::Readability),
            _ => Err(format!(
                "unknown refactor style {:?}, must be 'clean_code', 'performance', or 'readability'",
                s
            )),
        }
    }
}

/// Sampling options passed through to the provider verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A fully-built chat request: one system message, one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub task: Task,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl PromptRequest {
    fn new(task: Task, user: String) -> Self {
        let options = task.default_options();
        Self {
            task,
            system: task.system_prompt().to_string(),
            user,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }

    pub fn complete(code_context: &str, max_suggestions: usize) -> Self {
        Self::new(
            Task::Complete,
            format!(
                "Complete the following code with best practices:\n\n{}\n\nProvide {} different completion suggestions.",
                code_context, max_suggestions
            ),
        )
    }

    pub fn analyze(code: &str) -> Self {
        Self::new(
            Task::Analyze,
            format!(
                "Analyze this code for bugs, security issues, and problems:\n\n{}\n\nList any issues found with severity and line numbers.",
                code
            ),
        )
    }

    pub fn refactor(code: &str, style: RefactorStyle) -> Self {
        Self::new(
            Task::Refactor,
            format!(
                "Refactor this code following {} principles:\n\n{}\n\nProvide the refactored version with improvements.",
                style, code
            ),
        )
    }

    pub fn document(code: &str) -> Self {
        Self::new(
            Task::Document,
            format!(
                "Generate comprehensive documentation for this code:\n\n{}\n\n\
                 Include:\n- Overview\n- Parameters/Arguments\n- Return values\n- Usage examples\n- Edge cases",
                code
            ),
        )
    }

    pub fn explain(code: &str) -> Self {
        Self::new(
            Task::Explain,
            format!(
                "Explain this code in simple terms:\n\n{}\n\nProvide a clear, beginner-friendly explanation.",
                code
            ),
        )
    }

    /// Replace the sampling options.
    pub fn with_options(mut self, options: TaskOptions) -> Self {
        self.temperature = options.temperature;
        self.max_tokens = options.max_tokens;
        self
    }
}
