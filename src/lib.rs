//! Order Unit of Work
//!
//! Transactional unit of work over PostgreSQL for the order, inventory and
//! audit log repositories. A service opens one scope per operation: a command
//! scope shares a single transaction across every repository and commits or
//! rolls back around the work; a query scope runs without a transaction.

pub mod config;
pub mod connection;
pub mod context;
pub mod error;
pub mod executor;
pub mod models;
pub mod repositories;
pub mod scope;
pub mod services;
pub mod transaction_aware;
pub mod unit_of_work;

pub use config::{ConfigError, DatabaseConfig, IsolationLevel};
pub use connection::{Connection, ConnectionProvider, PgConnectionProvider};
pub use context::UnitOfWorkContext;
pub use error::{Error, ErrorKind, Result, TransactionStateError};
pub use executor::{Executor, ExecutorGuard, TransactionHandle};
pub use models::{
    AuditLogEntry, CreateOrderRequest, InventoryItem, NewProduct, Order, OrderItem, OrderLine,
};
pub use services::{AuditLogService, InventoryService, OrderService};
pub use transaction_aware::TransactionAware;
pub use unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkFactory, UnitOfWorkFactory};
