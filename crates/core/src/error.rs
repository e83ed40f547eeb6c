use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown agent type: {0}")]
    InvalidAgentType(String),

    #[error("Unknown status: {0}")]
    InvalidStatus(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
