use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::connection::Connection;
use crate::executor::{Executor, TransactionHandle};
use crate::repositories::{AuditLogRepository, InventoryRepository, OrderRepository};
use crate::transaction_aware::TransactionAware;

pub(crate) type Observers = Arc<Mutex<Vec<Arc<dyn TransactionAware>>>>;

/// Per-scope bundle of (connection, transaction-or-none) and the
/// repositories bound to it.
///
/// Every repository is built when the context is created and receives the
/// same executor, so all statements of a scope share one transaction.
pub struct UnitOfWorkContext {
    executor: Executor,
    orders: OrderRepository,
    inventory: InventoryRepository,
    audit_log: AuditLogRepository,
    observers: Option<Observers>,
}

impl UnitOfWorkContext {
    pub(crate) fn new(
        connection: Connection,
        transaction: Option<TransactionHandle>,
        observers: Option<Observers>,
    ) -> Self {
        let executor = Executor::new(connection, transaction);
        Self {
            orders: OrderRepository::new(executor.clone()),
            inventory: InventoryRepository::new(executor.clone()),
            audit_log: AuditLogRepository::new(executor.clone()),
            executor,
            observers,
        }
    }

    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }

    pub fn inventory(&self) -> &InventoryRepository {
        &self.inventory
    }

    pub fn audit_log(&self) -> &AuditLogRepository {
        &self.audit_log
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Whether this context belongs to a command scope.
    pub fn is_transactional(&self) -> bool {
        self.executor.is_transactional()
    }

    /// Register a component that needs to be notified of transaction events.
    ///
    /// Only command scopes have a transaction to observe; in a query scope
    /// the registration is ignored.
    pub fn register_transaction_aware(&self, observer: Arc<dyn TransactionAware>) {
        match &self.observers {
            Some(observers) => observers.lock().push(observer),
            None => debug!("Ignoring transaction observer registered in a query scope"),
        }
    }
}
