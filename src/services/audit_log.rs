use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::AuditLogEntry;
use crate::unit_of_work::UnitOfWorkFactory;

pub const ORDER_CREATED: &str = "ORDER_CREATED";
pub const PRODUCT_ADDED: &str = "PRODUCT_ADDED";
pub const STOCK_ADJUSTED: &str = "STOCK_ADJUSTED";

pub struct AuditLogService {
    factory: Arc<dyn UnitOfWorkFactory>,
}

impl AuditLogService {
    pub fn new(factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { factory }
    }

    /// Record a free-form entry in its own transaction.
    pub async fn record(&self, action: &str, details: &str) -> Result<i64> {
        if action.trim().is_empty() {
            return Err(Error::business_rule("audit action must not be empty"));
        }

        let uow = self.factory.create().await?;
        uow.command(|ctx| async move { ctx.audit_log().insert(action, details).await })
            .await
    }

    /// Newest first.
    pub async fn recent_entries(&self, limit: i64) -> Result<Vec<AuditLogEntry>> {
        if limit <= 0 {
            return Err(Error::business_rule("limit must be positive"));
        }

        let uow = self.factory.create().await?;
        uow.query(|ctx| async move { ctx.audit_log().list_recent(limit).await })
            .await
    }

    pub async fn entries_for_action(&self, action: &str) -> Result<Vec<AuditLogEntry>> {
        let uow = self.factory.create().await?;
        uow.query(|ctx| async move { ctx.audit_log().find_by_action(action).await })
            .await
    }
}
