use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Record that a named tool was used while a task ran. Analytics input only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolUsage {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub task_id: Uuid,
    pub tool_name: String,
    #[schema(value_type = Option<Object>)]
    pub input: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub output: Option<Value>,
    pub success: bool,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ToolUsage {
    pub fn new(
        execution_id: Uuid,
        task_id: Uuid,
        tool_name: impl Into<String>,
        success: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            execution_id,
            task_id,
            tool_name: tool_name.into(),
            input: None,
            output: None,
            success,
            duration_ms: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_output(mut self, output: Option<Value>) -> Self {
        self.output = output;
        self
    }
}
