use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("LLM rate limited, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Empty completion returned")]
    EmptyResponse,

    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),
}

pub type LlmResult<T> = Result<T, LlmError>;
