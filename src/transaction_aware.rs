use async_trait::async_trait;

use crate::error::Result;

/// Trait for components that need to be notified of transaction lifecycle events.
///
/// Observers are registered on a command scope's context and are called once
/// the scope's transaction has been committed or rolled back. Registrations
/// never outlive the scope they were made in.
#[async_trait]
pub trait TransactionAware: Send + Sync {
    /// Called after a successful transaction commit.
    ///
    /// A failure here is returned to the caller of the command scope even
    /// though the data is already durable.
    async fn on_commit(&self) -> Result<()>;

    /// Called after a transaction rollback.
    ///
    /// Failures are logged; they never replace the error that caused the
    /// rollback.
    async fn on_rollback(&self) -> Result<()>;
}
