//! OpenAI-compatible chat completions client.
//!
//! Sends: POST {api_base}/chat/completions

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Dispatcher, PromptRequest, RemoteCallError};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking dispatcher backed by an async reqwest client.
///
/// Each call spins up a short-lived tokio runtime. When the caller is
/// already on a runtime thread, the request runs on a scoped thread that
/// owns its own runtime so the caller's runtime is never blocked on.
pub struct OpenAiDispatcher {
    http: Client,
    api_key: String,
    model: String,
    api_base: String,
    timeout: Option<Duration>,
}

impl OpenAiDispatcher {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent(concat!("codeassist/", env!("CARGO_PKG_VERSION")))
            // Each call runs on its own runtime; pooled connections would
            // outlive the runtime that drives them.
            .pool_max_idle_per_host(0)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: None,
        }
    }

    /// Point the client at a different OpenAI-compatible endpoint.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Abort requests that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    async fn send(&self, request: &PromptRequest) -> Result<String, RemoteCallError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut builder = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(map_transport)?;

        let status = response.status().as_u16();
        match status {
            200..=299 => {}
            429 => return Err(RemoteCallError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                return Err(RemoteCallError::Status { status, body });
            }
        }

        let text = response.text().await.map_err(map_transport)?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| RemoteCallError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(RemoteCallError::EmptyResponse)
    }

    fn send_blocking(&self, request: &PromptRequest) -> Result<String, RemoteCallError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RemoteCallError::Runtime)?;
        runtime.block_on(self.send(request))
    }
}

fn map_transport(e: reqwest::Error) -> RemoteCallError {
    if e.is_timeout() {
        RemoteCallError::Timeout
    } else {
        RemoteCallError::Network(e)
    }
}

impl Dispatcher for OpenAiDispatcher {
    fn dispatch(&self, request: &PromptRequest) -> Result<String, RemoteCallError> {
        tracing::debug!(
            task = %request.task,
            model = %self.model,
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "sending chat completion request"
        );

        let result = if tokio::runtime::Handle::try_current().is_ok() {
            std::thread::scope(|scope| {
                scope
                    .spawn(|| self.send_blocking(request))
                    .join()
                    .unwrap_or_else(|_| {
                        Err(RemoteCallError::Runtime(std::io::Error::new(
                            std::io::ErrorKind::Other,
                            "request thread panicked",
                        )))
                    })
            })
        } else {
            self.send_blocking(request)
        };

        if let Ok(text) = &result {
            tracing::debug!(task = %request.task, chars = text.len(), "received response");
        }
        result
    }

    fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OpenAiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiDispatcher")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
