use std::sync::Arc;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{InventoryItem, NewProduct};
use crate::services::audit_log::{PRODUCT_ADDED, STOCK_ADJUSTED};
use crate::unit_of_work::UnitOfWorkFactory;

pub struct InventoryService {
    factory: Arc<dyn UnitOfWorkFactory>,
}

impl InventoryService {
    pub fn new(factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { factory }
    }

    pub async fn get_product(&self, product_id: i32) -> Result<InventoryItem> {
        let uow = self.factory.create().await?;
        uow.query(|ctx| async move {
            ctx.inventory()
                .find_by_product_id(product_id)
                .await?
                .ok_or_else(|| Error::not_found("product", product_id))
        })
        .await
    }

    pub async fn list_products(&self) -> Result<Vec<InventoryItem>> {
        let uow = self.factory.create().await?;
        uow.query(|ctx| async move { ctx.inventory().list().await })
            .await
    }

    pub async fn add_product(&self, product: NewProduct) -> Result<InventoryItem> {
        if product.name.trim().is_empty() {
            return Err(Error::business_rule("product name must not be empty"));
        }
        if product.stock < 0 || product.unit_price_cents < 0 {
            return Err(Error::business_rule(
                "stock and unit price must not be negative",
            ));
        }

        let uow = self.factory.create().await?;
        let item = uow
            .command(move |ctx| async move {
                let product_id = ctx.inventory().insert(&product).await?;
                let details = format!(
                    "product {} '{}' added with stock {}",
                    product_id, product.name, product.stock
                );
                ctx.audit_log().insert(PRODUCT_ADDED, &details).await?;

                ctx.inventory()
                    .find_by_product_id(product_id)
                    .await?
                    .ok_or_else(|| Error::not_found("product", product_id))
            })
            .await?;

        info!(product_id = item.product_id, "Product added");
        Ok(item)
    }

    /// Add `delta` (which may be negative) to a product's stock.
    pub async fn adjust_stock(&self, product_id: i32, delta: i32) -> Result<InventoryItem> {
        let uow = self.factory.create().await?;
        let item = uow
            .command(|ctx| async move {
                let product = ctx
                    .inventory()
                    .find_for_update(product_id)
                    .await?
                    .ok_or_else(|| Error::not_found("product", product_id))?;

                let stock = product
                    .stock
                    .checked_add(delta)
                    .filter(|stock| *stock >= 0)
                    .ok_or_else(|| {
                        Error::business_rule(format!(
                            "cannot adjust stock of product {} by {}: available {}",
                            product_id, delta, product.stock
                        ))
                    })?;

                ctx.inventory().update_stock(product_id, stock).await?;

                let details = format!(
                    "product {} stock {} -> {}",
                    product_id, product.stock, stock
                );
                ctx.audit_log().insert(STOCK_ADJUSTED, &details).await?;

                Ok::<_, Error>(InventoryItem { stock, ..product })
            })
            .await?;

        info!(product_id, stock = item.stock, "Stock adjusted");
        Ok(item)
    }
}
