use agentflow_core::{AgentLog, AgentType, LogLevel};
use uuid::Uuid;

use super::{datetime_to_millis, json_to_text, millis_to_datetime, text_to_json};
use crate::error::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentLogRow {
    pub id: String,
    pub execution_id: String,
    pub task_id: Option<String>,
    pub agent_type: String,
    pub action: String,
    pub input: Option<String>,
    pub output: Option<String>,
    pub reasoning: Option<String>,
    pub level: String,
    pub metadata: Option<String>,
    pub timestamp: i64,
}

impl AgentLogRow {
    pub fn into_domain(self) -> Result<AgentLog, DbError> {
        Ok(AgentLog {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            execution_id: Uuid::parse_str(&self.execution_id).unwrap_or_default(),
            task_id: self.task_id.and_then(|s| Uuid::parse_str(&s).ok()),
            agent_type: self.agent_type.parse::<AgentType>()?,
            action: self.action,
            input: text_to_json(self.input)?,
            output: text_to_json(self.output)?,
            reasoning: self.reasoning,
            level: LogLevel::parse(&self.level).unwrap_or_default(),
            timestamp: millis_to_datetime(self.timestamp),
            metadata: text_to_json(self.metadata)?,
        })
    }
}

impl From<&AgentLog> for AgentLogRow {
    fn from(log: &AgentLog) -> Self {
        Self {
            id: log.id.to_string(),
            execution_id: log.execution_id.to_string(),
            task_id: log.task_id.map(|id| id.to_string()),
            agent_type: log.agent_type.as_str().to_string(),
            action: log.action.clone(),
            input: json_to_text(&log.input),
            output: json_to_text(&log.output),
            reasoning: log.reasoning.clone(),
            level: log.level.as_str().to_string(),
            metadata: json_to_text(&log.metadata),
            timestamp: datetime_to_millis(log.timestamp),
        }
    }
}
