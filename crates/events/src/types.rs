use agentflow_core::{
    now_millis, AgentLog, AgentPerformance, AgentType, ExecutionStatus, Task,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Envelope wrapping all events with metadata.
///
/// Serialized flat: `{"id", "timestamp", "sequence", "type", "payload"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Position in the publisher's emission order.
    #[serde(default)]
    pub sequence: u64,
    #[serde(flatten)]
    pub event: Event,
}

impl EventEnvelope {
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sequence: 0,
            event,
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}

/// The four event shapes observers receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Event {
    ExecutionUpdate(ExecutionUpdate),
    /// Full current task record.
    TaskUpdate(Task),
    /// Full log record, including its level.
    Log(AgentLog),
    AgentPerformance(AgentPerformanceUpdate),
}

impl Event {
    /// Execution this event belongs to. Performance snapshots are global.
    pub fn execution_id(&self) -> Option<Uuid> {
        match self {
            Self::ExecutionUpdate(update) => Some(update.execution_id),
            Self::TaskUpdate(task) => Some(task.execution_id),
            Self::Log(log) => Some(log.execution_id),
            Self::AgentPerformance(_) => None,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ExecutionUpdate(_) => "execution_update",
            Self::TaskUpdate(_) => "task_update",
            Self::Log(_) => "log",
            Self::AgentPerformance(_) => "agent_performance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionUpdate {
    pub execution_id: Uuid,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_agent: Option<AgentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix milliseconds.
    pub timestamp: i64,
}

impl ExecutionUpdate {
    pub fn new(execution_id: Uuid, status: ExecutionStatus) -> Self {
        Self {
            execution_id,
            status,
            current_agent: None,
            current_task: None,
            error: None,
            timestamp: now_millis(),
        }
    }

    pub fn with_agent(mut self, agent: AgentType) -> Self {
        self.current_agent = Some(agent);
        self
    }

    pub fn with_task(mut self, description: impl Into<String>) -> Self {
        self.current_task = Some(description.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformanceUpdate {
    pub agent_type: AgentType,
    pub performance: AgentPerformance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_core::LogLevel;

    #[test]
    fn test_execution_update_wire_shape() {
        let execution_id = Uuid::new_v4();
        let event = Event::ExecutionUpdate(
            ExecutionUpdate::new(execution_id, ExecutionStatus::Executing)
                .with_agent(AgentType::Coder)
                .with_task("Write code"),
        );

        let json = serde_json::to_value(EventEnvelope::new(event)).unwrap();
        assert_eq!(json["type"], "execution_update");
        assert_eq!(json["payload"]["executionId"], execution_id.to_string());
        assert_eq!(json["payload"]["status"], "executing");
        assert_eq!(json["payload"]["currentAgent"], "coder");
        assert_eq!(json["payload"]["currentTask"], "Write code");
        assert!(json["payload"].get("error").is_none());
        assert!(json["payload"]["timestamp"].is_i64());
        assert!(json.get("id").is_some());
    }

    #[test]
    fn test_task_and_log_payloads_are_full_records() {
        let task = Task::new(Uuid::new_v4(), AgentType::Analyst, "Summarize", 0);
        let json = serde_json::to_value(Event::TaskUpdate(task.clone())).unwrap();
        assert_eq!(json["type"], "task_update");
        assert_eq!(json["payload"]["id"], task.id.to_string());
        assert_eq!(json["payload"]["status"], "pending");

        let log = AgentLog::new(task.execution_id, AgentType::Analyst, "x", LogLevel::Error);
        let json = serde_json::to_value(Event::Log(log)).unwrap();
        assert_eq!(json["type"], "log");
        assert_eq!(json["payload"]["level"], "error");
    }

    #[test]
    fn test_agent_performance_shape() {
        let event = Event::AgentPerformance(AgentPerformanceUpdate {
            agent_type: AgentType::Researcher,
            performance: AgentPerformance {
                tasks_completed: 3,
                success_rate: 75.0,
                avg_duration: 1200,
            },
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "agent_performance");
        assert_eq!(json["payload"]["agentType"], "researcher");
        assert_eq!(json["payload"]["performance"]["successRate"], 75.0);
        assert_eq!(event.execution_id(), None);
    }

    #[test]
    fn test_event_deserializes_from_wire() {
        let execution_id = Uuid::new_v4();
        let raw = serde_json::json!({
            "type": "execution_update",
            "payload": {
                "executionId": execution_id,
                "status": "failed",
                "error": "boom",
                "timestamp": 1
            }
        });

        let event: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(event.execution_id(), Some(execution_id));
        assert_eq!(event.event_type(), "execution_update");
    }
}
