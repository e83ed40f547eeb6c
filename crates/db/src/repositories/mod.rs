mod agent_log_repository;
mod analytics_repository;
mod execution_repository;
mod task_repository;
mod tool_usage_repository;

pub use agent_log_repository::*;
pub use analytics_repository::*;
pub use execution_repository::*;
pub use task_repository::*;
pub use tool_usage_repository::*;
