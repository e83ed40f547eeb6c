use agentflow_core::{
    AgentLog, Analytics, Execution, Task, TaskStatus, ToolUsage, UpdateExecution, UpdateTask,
};
use async_trait::async_trait;
use db::{
    AgentLogRepository, AnalyticsRepository, DbError, ExecutionRepository, TaskRepository,
    ToolUsageRepository,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;

/// Durable records the orchestrator reads and writes.
///
/// Implementations must be safe to call from several executions at once.
/// `update_*` apply only the fields that are set and fail with a not-found
/// error when the id is unknown. `transition_task` is the compare-and-set
/// form: it writes only while the task is still in `from` and returns `None`
/// when another writer got there first.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn create_execution(&self, execution: &Execution) -> Result<Execution>;
    async fn get_execution(&self, id: Uuid) -> Result<Option<Execution>>;
    async fn list_executions(&self, limit: i64) -> Result<Vec<Execution>>;
    async fn update_execution(&self, id: Uuid, update: UpdateExecution) -> Result<Execution>;
    async fn delete_execution(&self, id: Uuid) -> Result<bool>;

    async fn create_task(&self, task: &Task) -> Result<Task>;
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>>;
    async fn list_tasks(&self, execution_id: Uuid) -> Result<Vec<Task>>;
    async fn update_task(&self, id: Uuid, update: UpdateTask) -> Result<Task>;
    async fn transition_task(
        &self,
        id: Uuid,
        from: TaskStatus,
        update: UpdateTask,
    ) -> Result<Option<Task>>;

    async fn create_agent_log(&self, log: &AgentLog) -> Result<AgentLog>;
    async fn list_logs(&self, execution_id: Uuid) -> Result<Vec<AgentLog>>;

    async fn create_tool_usage(&self, usage: &ToolUsage) -> Result<ToolUsage>;
    async fn list_tool_usage(&self, execution_id: Uuid) -> Result<Vec<ToolUsage>>;

    async fn get_analytics(&self) -> Result<Analytics>;
}

/// [`ExecutionStore`] backed by the SQLite repositories.
#[derive(Clone)]
pub struct SqlStore {
    executions: ExecutionRepository,
    tasks: TaskRepository,
    logs: AgentLogRepository,
    tool_usage: ToolUsageRepository,
    analytics: AnalyticsRepository,
}

impl SqlStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            executions: ExecutionRepository::new(pool.clone()),
            tasks: TaskRepository::new(pool.clone()),
            logs: AgentLogRepository::new(pool.clone()),
            tool_usage: ToolUsageRepository::new(pool.clone()),
            analytics: AnalyticsRepository::new(pool),
        }
    }
}

#[async_trait]
impl ExecutionStore for SqlStore {
    async fn create_execution(&self, execution: &Execution) -> Result<Execution> {
        Ok(self.executions.create(execution).await?)
    }

    async fn get_execution(&self, id: Uuid) -> Result<Option<Execution>> {
        Ok(self.executions.find_by_id(id).await?)
    }

    async fn list_executions(&self, limit: i64) -> Result<Vec<Execution>> {
        Ok(self.executions.find_recent(limit).await?)
    }

    async fn update_execution(&self, id: Uuid, update: UpdateExecution) -> Result<Execution> {
        self.executions
            .update(id, &update)
            .await?
            .ok_or_else(|| DbError::ExecutionNotFound(id).into())
    }

    async fn delete_execution(&self, id: Uuid) -> Result<bool> {
        Ok(self.executions.delete(id).await?)
    }

    async fn create_task(&self, task: &Task) -> Result<Task> {
        Ok(self.tasks.create(task).await?)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.tasks.find_by_id(id).await?)
    }

    async fn list_tasks(&self, execution_id: Uuid) -> Result<Vec<Task>> {
        Ok(self.tasks.find_by_execution(execution_id).await?)
    }

    async fn update_task(&self, id: Uuid, update: UpdateTask) -> Result<Task> {
        self.tasks
            .update(id, &update)
            .await?
            .ok_or_else(|| DbError::TaskNotFound(id).into())
    }

    async fn transition_task(
        &self,
        id: Uuid,
        from: TaskStatus,
        update: UpdateTask,
    ) -> Result<Option<Task>> {
        if let Some(task) = self.tasks.update_if_status(id, from, &update).await? {
            return Ok(Some(task));
        }
        match self.tasks.find_by_id(id).await? {
            Some(_) => Ok(None),
            None => Err(DbError::TaskNotFound(id).into()),
        }
    }

    async fn create_agent_log(&self, log: &AgentLog) -> Result<AgentLog> {
        Ok(self.logs.create(log).await?)
    }

    async fn list_logs(&self, execution_id: Uuid) -> Result<Vec<AgentLog>> {
        Ok(self.logs.find_by_execution(execution_id).await?)
    }

    async fn create_tool_usage(&self, usage: &ToolUsage) -> Result<ToolUsage> {
        Ok(self.tool_usage.create(usage).await?)
    }

    async fn list_tool_usage(&self, execution_id: Uuid) -> Result<Vec<ToolUsage>> {
        Ok(self.tool_usage.find_by_execution(execution_id).await?)
    }

    async fn get_analytics(&self) -> Result<Analytics> {
        Ok(self.analytics.compute().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrchestratorError;
    use agentflow_core::{AgentType, ExecutionStatus};

    async fn setup_store() -> SqlStore {
        let pool = db::create_pool("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        SqlStore::new(pool)
    }

    #[tokio::test]
    async fn test_update_unknown_execution_is_not_found() {
        let store = setup_store().await;

        let err = store
            .update_execution(Uuid::new_v4(), UpdateExecution::status(ExecutionStatus::Planning))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_unknown_task_is_not_found() {
        let store = setup_store().await;

        let err = store
            .update_task(Uuid::new_v4(), UpdateTask::running())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Database(DbError::TaskNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transition_task_distinguishes_lost_race_from_missing() {
        let store = setup_store().await;
        let execution = store.create_execution(&Execution::new("Goal")).await.unwrap();
        let task = store
            .create_task(&Task::new(execution.id, AgentType::Coder, "Write", 0))
            .await
            .unwrap();

        let stale = store
            .transition_task(task.id, TaskStatus::Running, UpdateTask::failed("late"))
            .await
            .unwrap();
        assert!(stale.is_none());
        assert_eq!(
            store.get_task(task.id).await.unwrap().unwrap().status,
            TaskStatus::Pending
        );

        let err = store
            .transition_task(Uuid::new_v4(), TaskStatus::Pending, UpdateTask::running())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let store = setup_store().await;
        let execution = store.create_execution(&Execution::new("Goal")).await.unwrap();
        let task = store
            .create_task(&Task::new(execution.id, AgentType::Coder, "Write", 0))
            .await
            .unwrap();

        let updated = store.update_task(task.id, UpdateTask::running()).await.unwrap();
        assert!(updated.started_at.is_some());

        let tasks = store.list_tasks(execution.id).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(store.list_executions(10).await.unwrap().len(), 1);
        assert!(store.get_execution(execution.id).await.unwrap().is_some());
    }
}
