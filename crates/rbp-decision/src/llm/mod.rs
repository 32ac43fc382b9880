//! A narrow capability the Decision Kernel depends on: send a chat-style
//! conversation to an LLM and get text back. Two concrete shapes are
//! supplemented from the original source's `llm_service` package.

mod gemini;
mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("no API key configured")]
    NoKey,
    #[error("request error: {0}")]
    Request(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response shape: {0}")]
    BadResponse(String),
}

/// Request/token counters, mirroring the original source's
/// `BaseLLMClient.get_statistics`.
#[derive(Debug, Default)]
pub struct Statistics {
    pub requests: u64,
    pub failures: u64,
}

#[derive(Default)]
pub(crate) struct Counters {
    requests: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn record(&self, ok: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> Statistics {
        Statistics {
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// The capability the Decision Kernel calls through.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(
        &self,
        messages: &[Message],
        temperature: Option<f32>,
        max_tokens: Option<u32>,
        timeout: Duration,
    ) -> Result<String, LlmError>;

    fn statistics(&self) -> Statistics;
}

/// Which provider shape to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAiCompatible,
    Gemini,
}

impl Provider {
    /// Resolves from the `LLM_PROVIDER` env var (or a per-session override),
    /// defaulting to the OpenAI-compatible shape.
    pub fn resolve(override_name: Option<&str>) -> Self {
        let name = override_name
            .map(str::to_string)
            .or_else(|| std::env::var("LLM_PROVIDER").ok())
            .unwrap_or_default();
        match name.to_lowercase().as_str() {
            "gemini" => Provider::Gemini,
            _ => Provider::OpenAiCompatible,
        }
    }
}

/// Builds a concrete client for `provider`. `base_url`/`model` are only
/// meaningful for the OpenAI-compatible shape; Gemini's endpoint is fixed
/// but its model name is still configurable.
pub fn build(provider: Provider, api_key: String, base_url: Option<String>, model: String) -> Arc<dyn LlmClient> {
    match provider {
        Provider::OpenAiCompatible => Arc::new(OpenAiClient::new(api_key, base_url, model)),
        Provider::Gemini => Arc::new(GeminiClient::new(api_key, model)),
    }
}
