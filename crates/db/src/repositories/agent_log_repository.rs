use crate::error::DbError;
use crate::models::AgentLogRow;
use agentflow_core::AgentLog;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Logs are append-only: there is no update.
#[derive(Clone)]
pub struct AgentLogRepository {
    pool: SqlitePool,
}

impl AgentLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, log: &AgentLog) -> Result<AgentLog, DbError> {
        let row = AgentLogRow::from(log);

        sqlx::query(
            r#"
            INSERT INTO agent_logs (id, execution_id, task_id, agent_type, action, input, output, reasoning, level, metadata, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.execution_id)
        .bind(&row.task_id)
        .bind(&row.agent_type)
        .bind(&row.action)
        .bind(&row.input)
        .bind(&row.output)
        .bind(&row.reasoning)
        .bind(&row.level)
        .bind(&row.metadata)
        .bind(row.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(log.clone())
    }

    /// Logs of one execution, oldest first. Ties keep insertion order.
    pub async fn find_by_execution(&self, execution_id: Uuid) -> Result<Vec<AgentLog>, DbError> {
        let rows: Vec<AgentLogRow> = sqlx::query_as(
            r#"
            SELECT id, execution_id, task_id, agent_type, action, input, output, reasoning, level, metadata, timestamp
            FROM agent_logs
            WHERE execution_id = ?
            ORDER BY timestamp ASC, rowid ASC
            "#,
        )
        .bind(execution_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AgentLogRow::into_domain).collect()
    }
}
