use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres, Transaction};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use uuid::Uuid;

use crate::connection::Connection;
use crate::error::{Result, TransactionStateError};

/// Shared reference to the open transaction of one command scope.
///
/// Repositories borrow the transaction for the duration of a single
/// statement; only the Unit-of-Work takes it out to commit or roll back.
#[derive(Clone)]
pub struct TransactionHandle {
    id: Uuid,
    tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl TransactionHandle {
    pub(crate) fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Takes ownership of the transaction, leaving None in its place.
    /// This should only be called when committing or rolling back.
    pub(crate) async fn take_transaction(&self) -> Result<Transaction<'static, Postgres>> {
        self.tx
            .lock()
            .await
            .take()
            .ok_or_else(|| TransactionStateError::NotActive.into())
    }

    async fn lock(&self) -> Result<MappedMutexGuard<'_, Transaction<'static, Postgres>>> {
        MutexGuard::try_map(self.tx.lock().await, Option::as_mut)
            .map_err(|_| TransactionStateError::NotActive.into())
    }
}

impl fmt::Debug for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// The (connection, transaction-or-none) pair a repository executes against.
#[derive(Clone, Debug)]
pub struct Executor {
    connection: Connection,
    transaction: Option<TransactionHandle>,
}

impl Executor {
    pub fn new(connection: Connection, transaction: Option<TransactionHandle>) -> Self {
        Self {
            connection,
            transaction,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn transaction(&self) -> Option<&TransactionHandle> {
        self.transaction.as_ref()
    }

    pub fn is_transactional(&self) -> bool {
        self.transaction.is_some()
    }

    /// Borrow a connection for one statement: the transaction's connection
    /// when one is bound, otherwise a pooled connection in autocommit mode.
    pub async fn acquire(&self) -> Result<ExecutorGuard<'_>> {
        match &self.transaction {
            Some(handle) => Ok(ExecutorGuard::Transaction(handle.lock().await?)),
            None => Ok(ExecutorGuard::Pooled(self.connection.acquire().await?)),
        }
    }
}

/// Exclusive access to the connection a statement runs on.
pub enum ExecutorGuard<'a> {
    Transaction(MappedMutexGuard<'a, Transaction<'static, Postgres>>),
    Pooled(PoolConnection<Postgres>),
}

impl ExecutorGuard<'_> {
    pub fn as_conn(&mut self) -> &mut PgConnection {
        match self {
            ExecutorGuard::Transaction(tx) => &mut ***tx,
            ExecutorGuard::Pooled(conn) => &mut **conn,
        }
    }
}
