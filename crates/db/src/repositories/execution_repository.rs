use crate::error::DbError;
use crate::models::ExecutionRow;
use agentflow_core::{Execution, UpdateExecution};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ExecutionRepository {
    pool: SqlitePool,
}

impl ExecutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, execution: &Execution) -> Result<Execution, DbError> {
        let row = ExecutionRow::from(execution);

        sqlx::query(
            r#"
            INSERT INTO executions (id, goal, status, result, error, metadata, created_at, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.goal)
        .bind(&row.status)
        .bind(&row.result)
        .bind(&row.error)
        .bind(&row.metadata)
        .bind(row.created_at)
        .bind(row.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(execution.clone())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Execution>, DbError> {
        let row: Option<ExecutionRow> = sqlx::query_as(
            r#"
            SELECT id, goal, status, result, error, metadata, created_at, completed_at
            FROM executions
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ExecutionRow::into_domain).transpose()
    }

    /// Newest first.
    pub async fn find_recent(&self, limit: i64) -> Result<Vec<Execution>, DbError> {
        let rows: Vec<ExecutionRow> = sqlx::query_as(
            r#"
            SELECT id, goal, status, result, error, metadata, created_at, completed_at
            FROM executions
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ExecutionRow::into_domain).collect()
    }

    /// Returns `None` when no execution has this id.
    pub async fn update(
        &self,
        id: Uuid,
        update: &UpdateExecution,
    ) -> Result<Option<Execution>, DbError> {
        let Some(mut execution) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        execution.apply(update);
        let row = ExecutionRow::from(&execution);

        sqlx::query(
            r#"
            UPDATE executions
            SET status = ?, result = ?, error = ?, completed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&row.status)
        .bind(&row.result)
        .bind(&row.error)
        .bind(row.completed_at)
        .bind(&row.id)
        .execute(&self.pool)
        .await?;

        Ok(Some(execution))
    }

    /// Removes the execution together with its tasks, logs and tool usage.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM executions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
