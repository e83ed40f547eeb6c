use agentflow_core::{AgentType, Task, TaskStatus};
use uuid::Uuid;

use super::{datetime_to_millis, json_to_text, millis_to_datetime, text_to_json};
use crate::error::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: String,
    pub execution_id: String,
    pub agent_type: String,
    pub description: String,
    pub status: String,
    pub task_order: i64,
    pub result: Option<String>,
    pub error: Option<String>,
    pub metadata: Option<String>,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl TaskRow {
    pub fn into_domain(self) -> Result<Task, DbError> {
        Ok(Task {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            execution_id: Uuid::parse_str(&self.execution_id).unwrap_or_default(),
            agent_type: self.agent_type.parse::<AgentType>()?,
            description: self.description,
            status: TaskStatus::parse(&self.status).unwrap_or_default(),
            order: self.task_order as i32,
            result: text_to_json(self.result)?,
            error: self.error,
            created_at: millis_to_datetime(self.created_at),
            started_at: self.started_at.map(millis_to_datetime),
            completed_at: self.completed_at.map(millis_to_datetime),
            metadata: text_to_json(self.metadata)?,
        })
    }
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            execution_id: task.execution_id.to_string(),
            agent_type: task.agent_type.as_str().to_string(),
            description: task.description.clone(),
            status: task.status.as_str().to_string(),
            task_order: i64::from(task.order),
            result: json_to_text(&task.result),
            error: task.error.clone(),
            metadata: json_to_text(&task.metadata),
            created_at: datetime_to_millis(task.created_at),
            started_at: task.started_at.map(datetime_to_millis),
            completed_at: task.completed_at.map(datetime_to_millis),
        }
    }
}
