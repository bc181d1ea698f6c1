use std::sync::Arc;

use tracing::{debug, info, instrument};

use stockroom_core::{Clock, Money, OrderId, StockError, StockResult};
use stockroom_sales::{Order, OrderDraft, OrderRequest, PricedLine};

use crate::ledger::StockLedger;

/// A committed order as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub total: Money,
    pub lines: Vec<PricedLine>,
}

/// Places orders against shelf stock.
#[derive(Clone)]
pub struct OrderService {
    ledger: Arc<dyn StockLedger>,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(ledger: Arc<dyn StockLedger>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }

    /// Place an order. Every line is applied in one transaction; the first
    /// failing line aborts the whole order.
    ///
    /// The warehouse mirror is best-effort: the warehouse row (if any) is
    /// decremented by the sold quantity floored at zero and never fails the order.
    #[instrument(
        skip(self, request),
        fields(user_id = %request.user_id(), lines = request.items().len()),
        err
    )]
    pub async fn create_order(&self, request: OrderRequest) -> StockResult<PlacedOrder> {
        let mut tx = self.ledger.begin().await?;
        let mut draft = OrderDraft::new(request.user_id());

        for item in request.items() {
            // Warehouse before catalog, the same lock order as transfers.
            let warehouse = tx.lock_warehouse(item.product_id).await?;

            let mut entry = tx
                .lock_catalog_for_sale(item.product_id)
                .await?
                .ok_or_else(|| {
                    StockError::not_found(format!("product {} is not on any shelf", item.product_id))
                })?;

            let unit_price = entry.sell(item.quantity)?;
            draft.push(PricedLine::price(item.product_id, item.quantity, unit_price)?)?;
            tx.update_catalog(&entry).await?;

            if let Some(mut warehouse) = warehouse {
                let removed = warehouse.withdraw_floored(item.quantity);
                if removed != item.quantity {
                    debug!(
                        product_id = %item.product_id,
                        requested = %item.quantity,
                        removed = %removed,
                        "warehouse mirror floored at zero"
                    );
                }
                tx.update_warehouse(&warehouse).await?;
            }
        }

        let new_order = draft.into_new_order(self.clock.now());
        let order_id = tx.insert_order(&new_order).await?;
        tx.commit().await?;

        info!(order_id = %order_id, total = %new_order.total, "order placed");

        Ok(PlacedOrder {
            order_id,
            total: new_order.total,
            lines: new_order.lines,
        })
    }

    /// All orders with their lines, newest first.
    pub async fn list_orders(&self) -> StockResult<Vec<Order>> {
        let mut tx = self.ledger.begin().await?;
        let orders = tx.list_orders().await?;
        tx.commit().await?;
        Ok(orders)
    }
}
