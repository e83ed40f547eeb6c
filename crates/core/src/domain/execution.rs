use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    #[default]
    Pending,
    Planning,
    Executing,
    Analyzing,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "planning" => Some(Self::Planning),
            "executing" => Some(Self::Executing),
            "analyzing" => Some(Self::Analyzing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One submitted goal and its overall run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: Uuid,
    pub goal: String,
    pub status: ExecutionStatus,
    #[schema(value_type = Option<Object>)]
    pub result: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

impl Execution {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal: goal.into(),
            status: ExecutionStatus::default(),
            result: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
            metadata: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Rejects goals that are empty after trimming. Content is not inspected further.
    pub fn validate_goal(goal: &str) -> Result<(), CoreError> {
        if goal.trim().is_empty() {
            return Err(CoreError::Validation("Goal cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &UpdateExecution) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(result) = &update.result {
            self.result = Some(result.clone());
        }
        if let Some(error) = &update.error {
            self.error = Some(error.clone());
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = Some(completed_at);
        }
    }
}

/// Partial update of an execution; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateExecution {
    pub status: Option<ExecutionStatus>,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UpdateExecution {
    pub fn status(status: ExecutionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn completed(result: Option<Value>) -> Self {
        Self {
            status: Some(ExecutionStatus::Completed),
            result,
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(ExecutionStatus::Failed),
            error: Some(error.into()),
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_execution_creation() {
        let execution = Execution::new("Summarize the news");

        assert_eq!(execution.goal, "Summarize the news");
        assert_eq!(execution.status, ExecutionStatus::Pending);
        assert!(execution.result.is_none());
        assert!(execution.completed_at.is_none());
    }

    #[test]
    fn test_validate_goal() {
        assert!(Execution::validate_goal("do it").is_ok());
        assert!(Execution::validate_goal("   ").is_err());
    }

    #[test]
    fn test_apply_completed_update() {
        let mut execution = Execution::new("goal");
        execution.apply(&UpdateExecution::completed(Some(json!({"summary": "ok"}))));

        assert_eq!(execution.status, ExecutionStatus::Completed);
        assert!(execution.completed_at.is_some());
        assert_eq!(execution.result, Some(json!({"summary": "ok"})));
        assert!(execution.error.is_none());
    }

    #[test]
    fn test_apply_failed_update() {
        let mut execution = Execution::new("goal");
        execution.apply(&UpdateExecution::status(ExecutionStatus::Planning));
        execution.apply(&UpdateExecution::failed("boom"));

        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert_eq!(execution.error.as_deref(), Some("boom"));
        assert!(execution.result.is_none());
    }

    #[test]
    fn test_execution_serializes_camel_case() {
        let json = serde_json::to_value(Execution::new("goal")).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("completedAt").is_some());
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ExecutionStatus::Completed.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(!ExecutionStatus::Executing.is_terminal());
        assert_eq!(ExecutionStatus::parse("analyzing"), Some(ExecutionStatus::Analyzing));
    }
}
