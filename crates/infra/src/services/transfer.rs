use std::sync::Arc;

use tracing::{info, instrument};

use stockroom_core::{StockError, StockResult};
use stockroom_inventory::{
    apply_transfer, NewCatalogEntry, TransferOutcome, TransferRequest, WarehouseStock,
};

use crate::ledger::{LedgerTx, StockLedger};

/// Moves stock from the warehouse onto a shelf.
#[derive(Clone)]
pub struct TransferService {
    ledger: Arc<dyn StockLedger>,
}

impl TransferService {
    pub fn new(ledger: Arc<dyn StockLedger>) -> Self {
        Self { ledger }
    }

    /// Warehouse decrement and shelf increment commit together or not at all.
    #[instrument(
        skip(self, request),
        fields(
            product_id = %request.product_id,
            shelf_id = %request.shelf_id,
            quantity = %request.quantity
        ),
        err
    )]
    pub async fn move_stock(&self, request: TransferRequest) -> StockResult<TransferOutcome> {
        let mut tx = self.ledger.begin().await?;

        if !tx.shelf_exists(request.shelf_id).await? {
            return Err(StockError::not_found(format!("shelf {} not found", request.shelf_id)));
        }

        let mut warehouse = lock_or_bootstrap_warehouse(tx.as_mut(), &request).await?;

        // Report the shortage before touching the catalog.
        if warehouse.quantity_available() < request.quantity {
            return Err(StockError::insufficient(
                request.product_id,
                warehouse.quantity_available().get(),
                request.quantity.get(),
            ));
        }

        let mut entry = match tx.lock_catalog(request.product_id, request.shelf_id).await? {
            Some(entry) => entry,
            None => {
                let pricing = tx
                    .catalog_pricing_hint(request.product_id)
                    .await?
                    .unwrap_or_default();
                tx.insert_catalog_if_absent(&NewCatalogEntry {
                    product_id: request.product_id,
                    shelf_id: request.shelf_id,
                    pricing,
                })
                .await?;
                tx.lock_catalog(request.product_id, request.shelf_id)
                    .await?
                    .ok_or_else(|| {
                        StockError::internal(format!(
                            "catalog entry for product {} on shelf {} vanished after insert",
                            request.product_id, request.shelf_id
                        ))
                    })?
            }
        };

        apply_transfer(&mut warehouse, &mut entry, request.quantity)?;

        tx.update_warehouse(&warehouse).await?;
        tx.update_catalog(&entry).await?;
        tx.commit().await?;

        info!(
            warehouse_remaining = %warehouse.quantity_available(),
            shelf_quantity = %entry.quantity_available(),
            "stock transferred to shelf"
        );

        Ok(TransferOutcome {
            transferred: request.quantity,
            warehouse_remaining: warehouse.quantity_available(),
            catalog_entry: entry,
        })
    }
}

/// Lock the product's warehouse row, creating it from arrival history when it
/// does not exist yet.
async fn lock_or_bootstrap_warehouse(
    tx: &mut dyn LedgerTx,
    request: &TransferRequest,
) -> StockResult<WarehouseStock> {
    if let Some(row) = tx.lock_warehouse(request.product_id).await? {
        return Ok(row);
    }

    let summary = tx.arrived_summary(request.product_id).await?.ok_or_else(|| {
        StockError::not_found(format!(
            "no warehouse stock for product {}",
            request.product_id
        ))
    })?;

    tx.insert_warehouse_if_absent(&WarehouseStock::from_arrivals(&summary))
        .await?;
    tx.lock_warehouse(request.product_id).await?.ok_or_else(|| {
        StockError::internal(format!(
            "warehouse row for product {} vanished after insert",
            request.product_id
        ))
    })
}
