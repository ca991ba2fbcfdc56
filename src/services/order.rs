use std::sync::Arc;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{CreateOrderRequest, Order, OrderItem};
use crate::services::audit_log::ORDER_CREATED;
use crate::unit_of_work::UnitOfWorkFactory;

pub struct OrderService {
    factory: Arc<dyn UnitOfWorkFactory>,
}

impl OrderService {
    pub fn new(factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { factory }
    }

    /// Place an order.
    ///
    /// Per line: lock the inventory row, check stock, decrement it. Then the
    /// order and an `ORDER_CREATED` audit entry are written. Any failure
    /// rolls back every write made so far.
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order> {
        if request.items.is_empty() {
            return Err(Error::business_rule("an order needs at least one item"));
        }
        if let Some(line) = request.items.iter().find(|line| line.quantity <= 0) {
            return Err(Error::business_rule(format!(
                "quantity for product {} must be positive",
                line.product_id
            )));
        }

        let uow = self.factory.create().await?;
        let order = uow
            .command(move |ctx| async move {
                let mut items = Vec::with_capacity(request.items.len());
                for line in &request.items {
                    let product = ctx
                        .inventory()
                        .find_for_update(line.product_id)
                        .await?
                        .ok_or_else(|| Error::not_found("product", line.product_id))?;

                    if product.stock < line.quantity {
                        return Err(Error::business_rule(format!(
                            "insufficient stock for product {}: requested {}, available {}",
                            product.product_id, line.quantity, product.stock
                        )));
                    }

                    ctx.inventory()
                        .update_stock(product.product_id, product.stock - line.quantity)
                        .await?;

                    items.push(OrderItem {
                        product_id: product.product_id,
                        quantity: line.quantity,
                        unit_price_cents: product.unit_price_cents,
                    });
                }

                let total_cents = order_total_cents(&items)?;
                let order_id = ctx
                    .orders()
                    .insert(&request.customer_name, total_cents, &items)
                    .await?;

                let details = format!(
                    "order {} for {}: {} item(s), total {} cents",
                    order_id,
                    request.customer_name,
                    items.len(),
                    total_cents
                );
                ctx.audit_log().insert(ORDER_CREATED, &details).await?;

                ctx.orders()
                    .find_by_id(order_id)
                    .await?
                    .ok_or_else(|| Error::not_found("order", order_id))
            })
            .await?;

        info!(order_id = order.id, total_cents = order.total_cents, "Order created");
        Ok(order)
    }

    pub async fn get_order(&self, id: i64) -> Result<Order> {
        let uow = self.factory.create().await?;
        uow.query(|ctx| async move {
            ctx.orders()
                .find_by_id(id)
                .await?
                .ok_or_else(|| Error::not_found("order", id))
        })
        .await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let uow = self.factory.create().await?;
        uow.query(|ctx| async move { ctx.orders().list().await })
            .await
    }
}

fn order_total_cents(items: &[OrderItem]) -> Result<i64> {
    items
        .iter()
        .try_fold(0i64, |total, item| {
            item.line_total_cents()
                .and_then(|line| total.checked_add(line))
        })
        .ok_or_else(|| Error::business_rule("order total exceeds the supported amount"))
}
