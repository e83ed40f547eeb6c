use crate::error::DbError;
use agentflow_core::{percentage, AgentPerformance, AgentType, Analytics, ToolStats};
use sqlx::SqlitePool;

/// Aggregates over the whole store. Read-only.
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn compute(&self) -> Result<Analytics, DbError> {
        let (total, successful, failed, avg_ms): (i64, i64, i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
                AVG(CASE WHEN completed_at IS NOT NULL THEN completed_at - created_at END)
            FROM executions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let mut analytics = Analytics {
            total_executions: total,
            successful_executions: successful,
            failed_executions: failed,
            avg_execution_time: avg_ms.map(|ms| ms.round() as i64).unwrap_or(0),
            ..Default::default()
        };

        for agent in AgentType::ALL {
            analytics
                .agent_performance
                .insert(agent.as_str().to_string(), AgentPerformance::default());
        }

        let agent_rows: Vec<(String, i64, i64, Option<f64>)> = sqlx::query_as(
            r#"
            SELECT
                agent_type,
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                AVG(CASE WHEN started_at IS NOT NULL AND completed_at IS NOT NULL
                    THEN completed_at - started_at END)
            FROM tasks
            GROUP BY agent_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        for (agent_type, total, completed, avg_duration) in agent_rows {
            analytics.agent_performance.insert(
                agent_type,
                AgentPerformance {
                    tasks_completed: completed,
                    success_rate: percentage(completed, total),
                    avg_duration: avg_duration.map(|ms| ms.round() as i64).unwrap_or(0),
                },
            );
        }

        let tool_rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT tool_name, COUNT(*), COALESCE(SUM(CASE WHEN success THEN 1 ELSE 0 END), 0)
            FROM tool_usage
            GROUP BY tool_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        for (tool_name, count, succeeded) in tool_rows {
            analytics.tool_usage_stats.insert(
                tool_name,
                ToolStats {
                    count,
                    success_rate: percentage(succeeded, count),
                },
            );
        }

        Ok(analytics)
    }
}
