//! Plain data records. Their invariants are enforced by the services.

use chrono::{DateTime, Utc};

/// Stock record for one product.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct InventoryItem {
    pub product_id: i32,
    pub name: String,
    pub stock: i32,
    pub unit_price_cents: i64,
}

/// Product to add to the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub stock: i32,
    pub unit_price_cents: i64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, stock: i32, unit_price_cents: i64) -> Self {
        Self {
            name: name.into(),
            stock,
            unit_price_cents,
        }
    }
}

/// Order aggregate with its line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// Line item as persisted, priced at the time of ordering.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderItem {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl OrderItem {
    /// `None` when the total does not fit in an `i64`.
    pub fn line_total_cents(&self) -> Option<i64> {
        i64::from(self.quantity).checked_mul(self.unit_price_cents)
    }
}

/// Requested line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub items: Vec<OrderLine>,
}

impl CreateOrderRequest {
    pub fn new(customer_name: impl Into<String>, items: Vec<OrderLine>) -> Self {
        Self {
            customer_name: customer_name.into(),
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    pub action: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}
