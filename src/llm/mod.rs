//! Boundary to the remote text-generation service.
//!
//! Every capability is one [`PromptRequest`] handed to a [`Dispatcher`],
//! which returns the model's text or a [`RemoteCallError`]. Dispatchers
//! send exactly one request per call: no retry, batching or streaming.

mod openai;
mod prompts;

pub use openai::{OpenAiDispatcher, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use prompts::{PromptRequest, RefactorStyle, Task, TaskOptions};

use thiserror::Error;

/// Errors that can occur during a remote call.
#[derive(Error, Debug)]
pub enum RemoteCallError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by provider")]
    RateLimited,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("response contained no message content")]
    EmptyResponse,
    #[error("async runtime unavailable: {0}")]
    Runtime(#[source] std::io::Error),
}

impl RemoteCallError {
    /// Whether the provider rejected the credential.
    pub fn is_auth(&self) -> bool {
        matches!(self, RemoteCallError::Status { status: 401 | 403, .. })
    }
}

/// Something that can turn a prompt into model text.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, request: &PromptRequest) -> Result<String, RemoteCallError>;

    /// The model identifier requests are sent to.
    fn model(&self) -> &str;
}

impl<D: Dispatcher + ?Sized> Dispatcher for Box<D> {
    fn dispatch(&self, request: &PromptRequest) -> Result<String, RemoteCallError> {
        (**self).dispatch(request)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
