use std::sync::Arc;

use tracing::{info, instrument};

use stockroom_core::{ProductId, StockResult};
use stockroom_inventory::WarehouseStock;

use crate::ledger::StockLedger;

/// Recompute-from-source repair of warehouse stock.
///
/// Only rows that are missing or carry no restock marker are written. Rows
/// with a marker are maintained by the per-arrival path and are never locked
/// or touched here, so re-running reconciliation cannot double-count an
/// arrival. Each product is repaired in its own transaction holding at most
/// one warehouse lock.
#[derive(Clone)]
pub struct ReconciliationService {
    ledger: Arc<dyn StockLedger>,
}

impl ReconciliationService {
    pub fn new(ledger: Arc<dyn StockLedger>) -> Self {
        Self { ledger }
    }

    /// Returns the number of warehouse rows inserted or resynchronized.
    #[instrument(skip(self), err)]
    pub async fn reconcile_arrivals(&self) -> StockResult<usize> {
        let products: Vec<ProductId> = {
            let mut tx = self.ledger.begin().await?;
            let summaries = tx.arrived_summaries().await?;
            tx.commit().await?;
            summaries.into_iter().map(|s| s.product_id).collect()
        };

        let mut touched = 0;
        for &product_id in &products {
            if self.reconcile_product(product_id).await? {
                touched += 1;
            }
        }

        info!(touched, products = products.len(), "warehouse reconciled from arrivals");
        Ok(touched)
    }

    async fn reconcile_product(&self, product_id: ProductId) -> StockResult<bool> {
        let mut tx = self.ledger.begin().await?;
        let Some(summary) = tx.arrived_summary(product_id).await? else {
            return Ok(false);
        };

        let touched = match tx.lock_unmarked_warehouse(product_id).await? {
            Some(mut row) => {
                let changed = row.resync_from_arrivals(&summary);
                if changed {
                    tx.update_warehouse(&row).await?;
                }
                changed
            }
            // Missing, or already marked; the insert is a no-op for the latter.
            None => {
                tx.insert_warehouse_if_absent(&WarehouseStock::from_arrivals(&summary))
                    .await?
            }
        };

        tx.commit().await?;
        Ok(touched)
    }
}
