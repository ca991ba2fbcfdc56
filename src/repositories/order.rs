use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::Result;
use crate::executor::Executor;
use crate::models::{Order, OrderItem};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_name: String,
    total_cents: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: i64,
    product_id: i32,
    quantity: i32,
    unit_price_cents: i64,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            customer_name: self.customer_name,
            total_cents: self.total_cents,
            created_at: self.created_at,
            items,
        }
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
        }
    }
}

/// Data access for orders and their line items.
#[derive(Clone, Debug)]
pub struct OrderRepository {
    executor: Executor,
}

impl OrderRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Insert the order header, then each line item. Returns the generated id.
    pub async fn insert(
        &self,
        customer_name: &str,
        total_cents: i64,
        items: &[OrderItem],
    ) -> Result<i64> {
        let mut conn = self.executor.acquire().await?;
        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (customer_name, total_cents) VALUES ($1, $2) RETURNING id",
        )
        .bind(customer_name)
        .bind(total_cents)
        .fetch_one(conn.as_conn())
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, unit_price_cents) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .execute(conn.as_conn())
            .await?;
        }

        Ok(order_id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Order>> {
        let mut conn = self.executor.acquire().await?;
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_name, total_cents, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn.as_conn())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, quantity, unit_price_cents \
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(conn.as_conn())
        .await?;

        Ok(Some(row.into_order(items.into_iter().map(OrderItem::from).collect())))
    }

    pub async fn list(&self) -> Result<Vec<Order>> {
        let mut conn = self.executor.acquire().await?;
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_name, total_cents, created_at FROM orders ORDER BY id",
        )
        .fetch_all(conn.as_conn())
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, quantity, unit_price_cents \
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(ids.as_slice())
        .fetch_all(conn.as_conn())
        .await?;

        let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in item_rows {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(item.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let mut conn = self.executor.acquire().await?;
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(conn.as_conn())
            .await?;
        Ok(count)
    }
}
