use agentflow_core::{AgentType, CoreError};
use thiserror::Error;

/// Infrastructure-level failures of the orchestrator.
///
/// An agent reporting `success: false` is not an error here; it is recorded on
/// the task and the run continues. Anything in this enum aborts the current run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Planning failed: {0}")]
    PlanningFailed(String),

    #[error("Agent {0} not found")]
    AgentNotFound(AgentType),

    #[error("Database error: {0}")]
    Database(#[from] db::DbError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] CoreError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl OrchestratorError {
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// True when the error means a record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Database(db::DbError::ExecutionNotFound(_))
                | Self::Database(db::DbError::TaskNotFound(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
