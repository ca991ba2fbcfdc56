use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::connection::{Connection, ConnectionProvider};
use crate::context::{Observers, UnitOfWorkContext};
use crate::error::{Error, Result, TransactionStateError};
use crate::executor::TransactionHandle;
use crate::scope::{self, ScopeKind};

/// Creates one Unit-of-Work per logical operation.
///
/// Services hold a factory rather than a Unit-of-Work so that instance
/// lifetime is decided per call, not by whoever wires the service.
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn create(&self) -> Result<PostgresUnitOfWork>;
}

/// Factory that opens a fresh connection handle for every Unit-of-Work.
pub struct PostgresUnitOfWorkFactory {
    provider: Arc<dyn ConnectionProvider>,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn create(&self) -> Result<PostgresUnitOfWork> {
        let connection = self.provider.open().await?;
        Ok(PostgresUnitOfWork::new(connection))
    }
}

/// Unit of Work over a PostgreSQL connection.
///
/// Owns at most one open transaction at a time. `command` runs work inside a
/// transaction that is committed on success and rolled back on failure;
/// `query` runs work with no transaction at all.
pub struct PostgresUnitOfWork {
    connection: Connection,
    active: Mutex<Option<TransactionHandle>>,
}

impl PostgresUnitOfWork {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            active: Mutex::new(None),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn has_active_transaction(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Begin a transaction. Fails if one is already active, or when called
    /// from inside a command scope, which owns its transaction.
    pub async fn begin_transaction(&self) -> Result<TransactionHandle> {
        reject_inside_command()?;
        self.begin().await
    }

    /// Commit the active transaction. Fails if none is active, or when
    /// called from inside a command scope.
    ///
    /// The transaction reference is released before the commit is sent, so
    /// a failed commit leaves the Unit-of-Work ready for a new transaction.
    pub async fn commit(&self) -> Result<()> {
        reject_inside_command()?;
        self.commit_active().await
    }

    /// Roll back the active transaction. Fails if none is active, or when
    /// called from inside a command scope.
    pub async fn rollback(&self) -> Result<()> {
        reject_inside_command()?;
        self.rollback_active().await
    }

    async fn begin(&self) -> Result<TransactionHandle> {
        if self.has_active_transaction() {
            return Err(TransactionStateError::AlreadyActive.into());
        }

        let tx = self.connection.begin_transaction().await?;

        let mut active = self.active.lock();
        if active.is_some() {
            // Another call chain won the race; dropping `tx` rolls it back.
            return Err(TransactionStateError::AlreadyActive.into());
        }
        let handle = TransactionHandle::new(tx);
        *active = Some(handle.clone());
        debug!(transaction_id = %handle.id(), "Transaction begun");
        Ok(handle)
    }

    async fn commit_active(&self) -> Result<()> {
        let handle = self.take_active()?;
        let tx = handle.take_transaction().await?;
        tx.commit().await?;
        debug!(transaction_id = %handle.id(), "Transaction committed");
        Ok(())
    }

    async fn rollback_active(&self) -> Result<()> {
        let handle = self.take_active()?;
        let tx = handle.take_transaction().await?;
        tx.rollback().await?;
        warn!(transaction_id = %handle.id(), "Transaction rolled back");
        Ok(())
    }

    fn take_active(&self) -> Result<TransactionHandle> {
        self.active
            .lock()
            .take()
            .ok_or_else(|| TransactionStateError::NotActive.into())
    }

    /// Run `work` inside a new transaction.
    ///
    /// Fails with [`Error::Reentrancy`] without touching the database when
    /// the current call chain is already inside a unit-of-work scope. The
    /// transaction is committed when `work` succeeds; when it fails the
    /// transaction is rolled back and the failure is returned unchanged.
    pub async fn command<F, Fut, T, E>(&self, work: F) -> std::result::Result<T, E>
    where
        F: FnOnce(UnitOfWorkContext) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<Error>,
    {
        if let Some(outer) = scope::current_scope() {
            warn!(outer_scope = %outer.id, "Rejected nested command scope");
            return Err(Error::Reentrancy.into());
        }

        let handle = self.begin().await?;
        let _release = ReleaseOnDrop {
            active: &self.active,
            id: handle.id(),
        };

        let observers = Observers::default();
        let context = UnitOfWorkContext::new(
            self.connection.clone(),
            Some(handle.clone()),
            Some(observers.clone()),
        );

        scope::enter(handle.id(), ScopeKind::Command, async move {
            match work(context).await {
                Ok(value) => match self.commit_active().await {
                    Ok(()) => {
                        notify_commit(&observers).await?;
                        Ok(value)
                    }
                    Err(err) => {
                        error!(transaction_id = %handle.id(), error = %err, "Commit failed");
                        notify_rollback(&observers).await;
                        Err(err.into())
                    }
                },
                Err(err) => {
                    if let Err(rollback_err) = self.rollback_active().await {
                        error!(
                            transaction_id = %handle.id(),
                            error = %rollback_err,
                            "Rollback failed"
                        );
                    }
                    notify_rollback(&observers).await;
                    Err(err)
                }
            }
        })
        .await
    }

    /// Run `work` without a transaction.
    ///
    /// Statements run in autocommit mode. Allowed whether or not a command
    /// scope is active; a command started from inside `work` is rejected.
    pub async fn query<F, Fut, T, E>(&self, work: F) -> std::result::Result<T, E>
    where
        F: FnOnce(UnitOfWorkContext) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let context = UnitOfWorkContext::new(self.connection.clone(), None, None);
        scope::enter(Uuid::new_v4(), ScopeKind::Query, work(context)).await
    }
}

/// Releases the Unit-of-Work's transaction reference if a command scope is
/// dropped before it commits or rolls back. The dropped `sqlx::Transaction`
/// is rolled back by the driver.
struct ReleaseOnDrop<'a> {
    active: &'a Mutex<Option<TransactionHandle>>,
    id: Uuid,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|handle| handle.id() == self.id) {
            warn!(transaction_id = %self.id, "Command scope dropped before completion");
            active.take();
        }
    }
}

/// The wrapper alone terminates a command scope's transaction.
fn reject_inside_command() -> Result<()> {
    if scope::is_command_scope_active() {
        warn!("Rejected manual transaction control inside a command scope");
        return Err(TransactionStateError::ManagedByScope.into());
    }
    Ok(())
}

async fn notify_commit(observers: &Observers) -> Result<()> {
    let observers = std::mem::take(&mut *observers.lock());
    for observer in observers.iter() {
        observer.on_commit().await?;
    }
    Ok(())
}

async fn notify_rollback(observers: &Observers) {
    let observers = std::mem::take(&mut *observers.lock());
    for observer in observers.iter() {
        if let Err(err) = observer.on_rollback().await {
            error!(error = %err, "Transaction observer failed after rollback");
        }
    }
}
