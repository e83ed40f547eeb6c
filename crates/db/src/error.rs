use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored value: {0}")]
    Core(#[from] agentflow_core::CoreError),

    #[error("Execution not found: {0}")]
    ExecutionNotFound(Uuid),

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),
}
