use crate::error::DbError;
use crate::models::TaskRow;
use agentflow_core::{Task, TaskStatus, UpdateTask};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, task: &Task) -> Result<Task, DbError> {
        let row = TaskRow::from(task);

        sqlx::query(
            r#"
            INSERT INTO tasks (id, execution_id, agent_type, description, status, task_order, result, error, metadata, created_at, started_at, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.execution_id)
        .bind(&row.agent_type)
        .bind(&row.description)
        .bind(&row.status)
        .bind(row.task_order)
        .bind(&row.result)
        .bind(&row.error)
        .bind(&row.metadata)
        .bind(row.created_at)
        .bind(row.started_at)
        .bind(row.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(task.clone())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, DbError> {
        let row: Option<TaskRow> = sqlx::query_as(
            r#"
            SELECT id, execution_id, agent_type, description, status, task_order, result, error, metadata, created_at, started_at, completed_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TaskRow::into_domain).transpose()
    }

    /// Tasks of one execution in plan order.
    pub async fn find_by_execution(&self, execution_id: Uuid) -> Result<Vec<Task>, DbError> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            r#"
            SELECT id, execution_id, agent_type, description, status, task_order, result, error, metadata, created_at, started_at, completed_at
            FROM tasks
            WHERE execution_id = ?
            ORDER BY task_order ASC
            "#,
        )
        .bind(execution_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_domain).collect()
    }

    pub async fn update(&self, id: Uuid, update: &UpdateTask) -> Result<Option<Task>, DbError> {
        let Some(mut task) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        task.apply(update);
        let row = TaskRow::from(&task);

        sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, result = ?, error = ?, started_at = ?, completed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.status)
        .bind(&row.result)
        .bind(&row.error)
        .bind(row.started_at)
        .bind(row.completed_at)
        .bind(&row.id)
        .execute(&self.pool)
        .await?;

        Ok(Some(task))
    }

    /// Apply `update` only while the task is still in `expected`.
    ///
    /// Returns `None` when the task is missing or has already moved on; the
    /// status check and the write happen in one statement.
    pub async fn update_if_status(
        &self,
        id: Uuid,
        expected: TaskStatus,
        update: &UpdateTask,
    ) -> Result<Option<Task>, DbError> {
        let Some(mut task) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        if task.status != expected {
            return Ok(None);
        }
        task.apply(update);
        let row = TaskRow::from(&task);

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, result = ?, error = ?, started_at = ?, completed_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(&row.status)
        .bind(&row.result)
        .bind(&row.error)
        .bind(row.started_at)
        .bind(row.completed_at)
        .bind(&row.id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(task))
    }
}
