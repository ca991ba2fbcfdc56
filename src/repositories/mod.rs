//! Stateless data access bound to one executor.
//!
//! Repositories never begin, commit or roll back a transaction; they run
//! their statements on whatever the executor they were built with provides.

mod audit_log;
mod inventory;
mod order;

pub use audit_log::AuditLogRepository;
pub use inventory::InventoryRepository;
pub use order::OrderRepository;
