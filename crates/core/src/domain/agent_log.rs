use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::AgentType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Self::Info),
            "success" => Some(Self::Success),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Append-only record of one agent action. Never updated once written.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentLog {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub task_id: Option<Uuid>,
    pub agent_type: AgentType,
    pub action: String,
    #[schema(value_type = Option<Object>)]
    pub input: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub output: Option<Value>,
    pub reasoning: Option<String>,
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

impl AgentLog {
    pub fn new(
        execution_id: Uuid,
        agent_type: AgentType,
        action: impl Into<String>,
        level: LogLevel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            execution_id,
            task_id: None,
            agent_type,
            action: action.into(),
            input: None,
            output: None,
            reasoning: None,
            level,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_task(mut self, task_id: Uuid) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_output(mut self, output: Option<Value>) -> Self {
        self.output = output;
        self
    }

    pub fn with_reasoning(mut self, reasoning: Option<String>) -> Self {
        self.reasoning = reasoning;
        self
    }
}
