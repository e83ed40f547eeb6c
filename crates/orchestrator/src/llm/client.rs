use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use super::error::{LlmError, LlmResult};
use super::types::*;
use super::{CompletionProvider, CompletionRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: "dummy-key".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Exponential backoff for rate limits and server errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 60_000,
        }
    }
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
///
/// No request timeout is set: a hung call blocks its caller until the server
/// answers or the connection drops.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    config: LlmConfig,
    retry: RetryPolicy,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn with_retry<T, F, Fut>(&self, operation: F, operation_name: &str) -> LlmResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = LlmResult<T>>,
    {
        let mut retries = 0;
        let mut backoff_ms = self.retry.initial_backoff_ms;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(LlmError::RateLimited { retry_after }) => {
                    if retries >= self.retry.max_retries {
                        error!(
                            operation = operation_name,
                            retries, "Giving up after repeated rate limiting"
                        );
                        return Err(LlmError::RateLimited { retry_after });
                    }

                    let wait_ms = retry_after
                        .map(|s| s.saturating_mul(1000))
                        .unwrap_or(backoff_ms)
                        .min(self.retry.max_backoff_ms);
                    warn!(
                        operation = operation_name,
                        wait_ms,
                        attempt = retries + 1,
                        max_retries = self.retry.max_retries,
                        "Rate limited, retrying"
                    );

                    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                    retries += 1;
                    backoff_ms = (backoff_ms * 2).min(self.retry.max_backoff_ms);
                }
                Err(LlmError::Api {
                    ref message,
                    status_code: Some(code),
                }) if code >= 500 => {
                    if retries >= self.retry.max_retries {
                        error!(
                            operation = operation_name,
                            retries,
                            status = code,
                            error = %message,
                            "Giving up after repeated server errors"
                        );
                        return Err(LlmError::Api {
                            message: message.clone(),
                            status_code: Some(code),
                        });
                    }

                    warn!(
                        operation = operation_name,
                        status = code,
                        wait_ms = backoff_ms,
                        attempt = retries + 1,
                        max_retries = self.retry.max_retries,
                        "Server error, retrying"
                    );

                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    retries += 1;
                    backoff_ms = (backoff_ms * 2).min(self.retry.max_backoff_ms);
                }
                Err(e) => {
                    if retries > 0 {
                        info!(operation = operation_name, retries, error = %e, "Failed after retries");
                    }
                    return Err(e);
                }
            }
        }
    }

    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        response_format: Option<ResponseFormat>,
    ) -> LlmResult<String> {
        self.with_retry(
            || async {
                self.chat_completion_inner(messages.clone(), response_format.clone())
                    .await
            },
            "chat_completion",
        )
        .await
    }

    async fn chat_completion_inner(
        &self,
        messages: Vec<ChatMessage>,
        response_format: Option<ResponseFormat>,
    ) -> LlmResult<String> {
        debug!(
            messages = messages.len(),
            model = %self.config.model,
            "Requesting chat completion"
        );

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: Some(self.config.max_tokens),
            response_format,
            stream: false,
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());
                return Err(LlmError::RateLimited { retry_after });
            }

            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::Api {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionProvider for ChatClient {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        let messages = vec![
            ChatMessage::system(request.system),
            ChatMessage::user(request.prompt),
        ];
        let format = request.json_mode.then(ResponseFormat::json_object);
        self.chat_completion(messages, format).await
    }
}
