//! Text generation behind the agents.
//!
//! Agents depend on [`CompletionProvider`]; [`ChatClient`] is the production
//! implementation speaking the OpenAI-compatible chat completions protocol.

mod client;
mod error;
mod types;

pub use client::{ChatClient, LlmConfig, RetryPolicy};
pub use error::{LlmError, LlmResult};
pub use types::*;

use async_trait::async_trait;

/// One generation call: a system prompt plus a single user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    /// Ask the model for a JSON object response.
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn json(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            json_mode: true,
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the raw text of the first completion choice.
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String>;
}
