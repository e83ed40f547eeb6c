use crate::error::DbError;
use crate::models::ToolUsageRow;
use agentflow_core::ToolUsage;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ToolUsageRepository {
    pool: SqlitePool,
}

impl ToolUsageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, usage: &ToolUsage) -> Result<ToolUsage, DbError> {
        let row = ToolUsageRow::from(usage);

        sqlx::query(
            r#"
            INSERT INTO tool_usage (id, execution_id, task_id, tool_name, input, output, success, duration_ms, error, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.execution_id)
        .bind(&row.task_id)
        .bind(&row.tool_name)
        .bind(&row.input)
        .bind(&row.output)
        .bind(row.success)
        .bind(row.duration_ms)
        .bind(&row.error)
        .bind(row.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(usage.clone())
    }

    pub async fn find_by_execution(&self, execution_id: Uuid) -> Result<Vec<ToolUsage>, DbError> {
        let rows: Vec<ToolUsageRow> = sqlx::query_as(
            r#"
            SELECT id, execution_id, task_id, tool_name, input, output, success, duration_ms, error, timestamp
            FROM tool_usage
            WHERE execution_id = ?
            ORDER BY timestamp ASC, rowid ASC
            "#,
        )
        .bind(execution_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ToolUsageRow::into_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::{
        create_test_execution, create_test_task, setup_test_db,
    };
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_list_tool_usage() {
        let pool = setup_test_db().await;
        let execution = create_test_execution(&pool).await;
        let task = create_test_task(&pool, &execution, 0).await;
        let repo = ToolUsageRepository::new(pool);

        let usage = ToolUsage::new(execution.id, task.id, "web_search", false)
            .with_input(json!({"task": "Task 0"}))
            .with_output(None);
        repo.create(&usage).await.unwrap();

        let found = repo.find_by_execution(execution.id).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tool_name, "web_search");
        assert!(!found[0].success);
        assert_eq!(found[0].input, Some(json!({"task": "Task 0"})));
        assert!(found[0].output.is_none());
    }
}
