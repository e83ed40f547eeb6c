use agentflow_core::ToolUsage;
use uuid::Uuid;

use super::{datetime_to_millis, json_to_text, millis_to_datetime, text_to_json};
use crate::error::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ToolUsageRow {
    pub id: String,
    pub execution_id: String,
    pub task_id: String,
    pub tool_name: String,
    pub input: Option<String>,
    pub output: Option<String>,
    pub success: bool,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
    pub timestamp: i64,
}

impl ToolUsageRow {
    pub fn into_domain(self) -> Result<ToolUsage, DbError> {
        Ok(ToolUsage {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            execution_id: Uuid::parse_str(&self.execution_id).unwrap_or_default(),
            task_id: Uuid::parse_str(&self.task_id).unwrap_or_default(),
            tool_name: self.tool_name,
            input: text_to_json(self.input)?,
            output: text_to_json(self.output)?,
            success: self.success,
            duration_ms: self.duration_ms,
            error: self.error,
            timestamp: millis_to_datetime(self.timestamp),
        })
    }
}

impl From<&ToolUsage> for ToolUsageRow {
    fn from(usage: &ToolUsage) -> Self {
        Self {
            id: usage.id.to_string(),
            execution_id: usage.execution_id.to_string(),
            task_id: usage.task_id.to_string(),
            tool_name: usage.tool_name.clone(),
            input: json_to_text(&usage.input),
            output: json_to_text(&usage.output),
            success: usage.success,
            duration_ms: usage.duration_ms,
            error: usage.error.clone(),
            timestamp: datetime_to_millis(usage.timestamp),
        }
    }
}
