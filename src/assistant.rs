//! The code assistant facade.
//!
//! Each capability comes in two forms. The `try_*` methods return the
//! dispatcher's error so callers can decide what to do with it. The plain
//! methods never fail: they log the error and fall back to a safe default
//! (an empty collection, empty text, or the input code for refactoring).

use crate::checker::StaticChecker;
use crate::config::Config;
use crate::llm::{
    Dispatcher, OpenAiDispatcher, PromptRequest, RefactorStyle, RemoteCallError, Task, TaskOptions,
};
use crate::models::{BugReport, CodeSuggestion};
use crate::response;

/// Forwards code to a language model and runs local checks.
pub struct CodeAssistant<D: Dispatcher = OpenAiDispatcher> {
    dispatcher: D,
    checker: StaticChecker,
    options: [TaskOptions; 5],
}

impl CodeAssistant<OpenAiDispatcher> {
    /// Create an assistant talking to the OpenAI API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_dispatcher(OpenAiDispatcher::new(api_key, model))
    }

    /// Create an assistant from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut dispatcher = OpenAiDispatcher::new(config.api_key.clone(), config.model.clone())
            .with_api_base(config.api_base.clone());
        if let Some(timeout) = config.timeout() {
            dispatcher = dispatcher.with_timeout(timeout);
        }

        let mut assistant = Self::with_dispatcher(dispatcher);
        for task in Task::ALL {
            assistant.set_options(task, config.task_options(task));
        }
        assistant
    }
}

impl<D: Dispatcher> CodeAssistant<D> {
    pub fn with_dispatcher(dispatcher: D) -> Self {
        Self {
            dispatcher,
            checker: StaticChecker::default(),
            options: Task::ALL.map(|t| t.default_options()),
        }
    }

    /// Override sampling options for one task.
    pub fn set_options(&mut self, task: Task, options: TaskOptions) {
        self.options[task_index(task)] = options;
    }

    pub fn options(&self, task: Task) -> TaskOptions {
        self.options[task_index(task)]
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn model(&self) -> &str {
        self.dispatcher.model()
    }

    fn send(&self, request: PromptRequest) -> Result<String, RemoteCallError> {
        let options = self.options(request.task);
        let request = request.with_options(options);
        self.dispatcher.dispatch(&request)
    }

    /// Generate completions for `code_context`.
    pub fn try_complete(
        &self,
        code_context: &str,
        max_suggestions: usize,
    ) -> Result<Vec<CodeSuggestion>, RemoteCallError> {
        let text = self.send(PromptRequest::complete(code_context, max_suggestions))?;
        let mut suggestions = response::parse_suggestions(&text);
        suggestions.truncate(max_suggestions);
        Ok(suggestions)
    }

    pub fn complete(&self, code_context: &str, max_suggestions: usize) -> Vec<CodeSuggestion> {
        self.try_complete(code_context, max_suggestions)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "error generating code completion");
                Vec::new()
            })
    }

    /// Static findings only. Never touches the network.
    pub fn check(&self, code: &str) -> Vec<BugReport> {
        self.checker.check(code)
    }

    /// Ask the model for bug reports.
    pub fn try_ai_findings(&self, code: &str) -> Result<Vec<BugReport>, RemoteCallError> {
        let text = self.send(PromptRequest::analyze(code))?;
        Ok(response::parse_bug_reports(&text))
    }

    /// Static findings followed by model findings. Fails only if the model
    /// call fails.
    pub fn try_analyze(&self, code: &str) -> Result<Vec<BugReport>, RemoteCallError> {
        let mut reports = self.check(code);
        reports.extend(self.try_ai_findings(code)?);
        Ok(reports)
    }

    /// Static findings followed by model findings, plus the model error if
    /// the call failed. The static findings are kept either way.
    pub fn analyze_partial(&self, code: &str) -> (Vec<BugReport>, Option<RemoteCallError>) {
        let mut reports = self.check(code);
        match self.try_ai_findings(code) {
            Ok(ai) => {
                reports.extend(ai);
                (reports, None)
            }
            Err(e) => (reports, Some(e)),
        }
    }

    /// Static findings followed by model findings. On a failed model call
    /// the static findings are still returned.
    pub fn analyze(&self, code: &str) -> Vec<BugReport> {
        let (reports, error) = self.analyze_partial(code);
        if let Some(e) = error {
            tracing::warn!(error = %e, "error in AI bug detection");
        }
        reports
    }

    /// Refactor `code`, returning the first fenced block of the reply (or
    /// the whole reply when there is none).
    pub fn try_refactor(&self, code: &str, style: RefactorStyle) -> Result<String, RemoteCallError> {
        let text = self.send(PromptRequest::refactor(code, style))?;
        Ok(response::extract_code(&text))
    }

    pub fn refactor(&self, code: &str, style: RefactorStyle) -> String {
        self.try_refactor(code, style).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "error refactoring code");
            code.to_string()
        })
    }

    pub fn try_document(&self, code: &str) -> Result<String, RemoteCallError> {
        self.send(PromptRequest::document(code))
    }

    pub fn document(&self, code: &str) -> String {
        self.try_document(code).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "error generating documentation");
            String::new()
        })
    }

    pub fn try_explain(&self, code: &str) -> Result<String, RemoteCallError> {
        self.send(PromptRequest::explain(code))
    }

    pub fn explain(&self, code: &str) -> String {
        self.try_explain(code).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "error explaining code");
            String::new()
        })
    }
}

fn task_index(task: Task) -> usize {
    match task {
        Task::Complete => 0,
        Task::Analyze => 1,
        Task::Refactor => 2,
        Task::Document => 3,
        Task::Explain => 4,
    }
}
