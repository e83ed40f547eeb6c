use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::AgentType;

/// Aggregate performance of one agent type across all executions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub tasks_completed: i64,
    /// Percentage in `0..=100`.
    pub success_rate: f64,
    /// Milliseconds.
    pub avg_duration: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolStats {
    pub count: i64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_executions: i64,
    pub successful_executions: i64,
    pub failed_executions: i64,
    /// Mean wall time of finished executions, in milliseconds.
    pub avg_execution_time: i64,
    pub agent_performance: BTreeMap<String, AgentPerformance>,
    pub tool_usage_stats: BTreeMap<String, ToolStats>,
}

impl Analytics {
    /// Snapshot for one agent; zeros when the agent has never run a task.
    pub fn performance_for(&self, agent: AgentType) -> AgentPerformance {
        self.agent_performance
            .get(agent.as_str())
            .copied()
            .unwrap_or_default()
    }
}

/// `part / whole` as a percentage, 0 when `whole` is 0.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}
