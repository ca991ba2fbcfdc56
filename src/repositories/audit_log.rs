use crate::error::Result;
use crate::executor::Executor;
use crate::models::AuditLogEntry;

#[derive(Clone, Debug)]
pub struct AuditLogRepository {
    executor: Executor,
}

impl AuditLogRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    pub async fn insert(&self, action: &str, details: &str) -> Result<i64> {
        let mut conn = self.executor.acquire().await?;
        let id = sqlx::query_scalar(
            "INSERT INTO audit_log (action, details) VALUES ($1, $2) RETURNING id",
        )
        .bind(action)
        .bind(details)
        .fetch_one(conn.as_conn())
        .await?;
        Ok(id)
    }

    /// Newest entries first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<AuditLogEntry>> {
        let mut conn = self.executor.acquire().await?;
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT id, action, details, created_at FROM audit_log ORDER BY id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(conn.as_conn())
        .await?;
        Ok(entries)
    }

    pub async fn find_by_action(&self, action: &str) -> Result<Vec<AuditLogEntry>> {
        let mut conn = self.executor.acquire().await?;
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT id, action, details, created_at FROM audit_log WHERE action = $1 ORDER BY id",
        )
        .bind(action)
        .fetch_all(conn.as_conn())
        .await?;
        Ok(entries)
    }

    pub async fn count(&self) -> Result<i64> {
        let mut conn = self.executor.acquire().await?;
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
            .fetch_one(conn.as_conn())
            .await?;
        Ok(count)
    }
}
