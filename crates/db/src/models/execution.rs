use agentflow_core::{Execution, ExecutionStatus};
use uuid::Uuid;

use super::{datetime_to_millis, json_to_text, millis_to_datetime, text_to_json};
use crate::error::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExecutionRow {
    pub id: String,
    pub goal: String,
    pub status: String,
    pub result: Option<String>,
    pub error: Option<String>,
    pub metadata: Option<String>,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

impl ExecutionRow {
    pub fn into_domain(self) -> Result<Execution, DbError> {
        Ok(Execution {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            goal: self.goal,
            status: ExecutionStatus::parse(&self.status).unwrap_or_default(),
            result: text_to_json(self.result)?,
            error: self.error,
            metadata: text_to_json(self.metadata)?,
            created_at: millis_to_datetime(self.created_at),
            completed_at: self.completed_at.map(millis_to_datetime),
        })
    }
}

impl From<&Execution> for ExecutionRow {
    fn from(execution: &Execution) -> Self {
        Self {
            id: execution.id.to_string(),
            goal: execution.goal.clone(),
            status: execution.status.as_str().to_string(),
            result: json_to_text(&execution.result),
            error: execution.error.clone(),
            metadata: json_to_text(&execution.metadata),
            created_at: datetime_to_millis(execution.created_at),
            completed_at: execution.completed_at.map(datetime_to_millis),
        }
    }
}
