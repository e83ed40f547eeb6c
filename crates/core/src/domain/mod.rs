mod agent;
mod agent_log;
mod analytics;
mod execution;
mod task;
mod tool_usage;

pub use agent::AgentType;
pub use agent_log::{AgentLog, LogLevel};
pub use analytics::{percentage, AgentPerformance, Analytics, ToolStats};
pub use execution::{Execution, ExecutionStatus, UpdateExecution};
pub use task::{Task, TaskStatus, UpdateTask};
pub use tool_usage::ToolUsage;

/// Milliseconds since the unix epoch, the unit used on the wire.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
