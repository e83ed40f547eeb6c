use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use super::AgentType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// One planned unit of work, assigned to a single agent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub agent_type: AgentType,
    pub description: String,
    pub status: TaskStatus,
    pub order: i32,
    #[schema(value_type = Option<Object>)]
    pub result: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

impl Task {
    pub fn new(
        execution_id: Uuid,
        agent_type: AgentType,
        description: impl Into<String>,
        order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            execution_id,
            agent_type,
            description: description.into(),
            status: TaskStatus::default(),
            order,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            metadata: None,
        }
    }

    /// Keep the planner's declared dependencies. They are informational only.
    pub fn with_dependencies(mut self, dependencies: &[String]) -> Self {
        if !dependencies.is_empty() {
            self.metadata = Some(json!({ "dependencies": dependencies }));
        }
        self
    }

    pub fn dependencies(&self) -> Vec<String> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("dependencies"))
            .and_then(|d| serde_json::from_value(d.clone()).ok())
            .unwrap_or_default()
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &UpdateTask) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(result) = &update.result {
            self.result = Some(result.clone());
        }
        if let Some(error) = &update.error {
            self.error = Some(error.clone());
        }
        if let Some(started_at) = update.started_at {
            self.started_at = Some(started_at);
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = Some(completed_at);
        }
    }
}

/// Partial update of a task; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub status: Option<TaskStatus>,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UpdateTask {
    pub fn running() -> Self {
        Self {
            status: Some(TaskStatus::Running),
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn completed(result: Option<Value>) -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            result,
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(TaskStatus::Failed),
            error: Some(error.into()),
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: Some(TaskStatus::Cancelled),
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }
}
