//! Business operations. Each public method runs in exactly one
//! unit-of-work scope: a command when it writes, a query otherwise.

pub mod audit_log;
mod inventory;
mod order;

pub use audit_log::AuditLogService;
pub use inventory::InventoryService;
pub use order::OrderService;
