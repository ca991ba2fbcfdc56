use crate::error::Result;
use crate::executor::Executor;
use crate::models::{InventoryItem, NewProduct};

/// Data access for product stock records.
#[derive(Clone, Debug)]
pub struct InventoryRepository {
    executor: Executor,
}

impl InventoryRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    pub async fn find_by_product_id(&self, product_id: i32) -> Result<Option<InventoryItem>> {
        let mut conn = self.executor.acquire().await?;
        let item = sqlx::query_as::<_, InventoryItem>(
            "SELECT product_id, name, stock, unit_price_cents FROM inventory WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_optional(conn.as_conn())
        .await?;
        Ok(item)
    }

    /// Like [`find_by_product_id`](Self::find_by_product_id), but locks the
    /// row until the surrounding transaction ends. Outside a transaction the
    /// lock is released as soon as the statement completes.
    pub async fn find_for_update(&self, product_id: i32) -> Result<Option<InventoryItem>> {
        let mut conn = self.executor.acquire().await?;
        let item = sqlx::query_as::<_, InventoryItem>(
            "SELECT product_id, name, stock, unit_price_cents FROM inventory \
             WHERE product_id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(conn.as_conn())
        .await?;
        Ok(item)
    }

    pub async fn list(&self) -> Result<Vec<InventoryItem>> {
        let mut conn = self.executor.acquire().await?;
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT product_id, name, stock, unit_price_cents FROM inventory ORDER BY product_id",
        )
        .fetch_all(conn.as_conn())
        .await?;
        Ok(items)
    }

    /// Insert a product and return its generated id.
    pub async fn insert(&self, product: &NewProduct) -> Result<i32> {
        let mut conn = self.executor.acquire().await?;
        let product_id = sqlx::query_scalar(
            "INSERT INTO inventory (name, stock, unit_price_cents) VALUES ($1, $2, $3) \
             RETURNING product_id",
        )
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.unit_price_cents)
        .fetch_one(conn.as_conn())
        .await?;
        Ok(product_id)
    }

    /// Set the stock of a product. Returns false when the product does not exist.
    pub async fn update_stock(&self, product_id: i32, stock: i32) -> Result<bool> {
        let mut conn = self.executor.acquire().await?;
        let result = sqlx::query("UPDATE inventory SET stock = $1 WHERE product_id = $2")
            .bind(stock)
            .bind(product_id)
            .execute(conn.as_conn())
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
