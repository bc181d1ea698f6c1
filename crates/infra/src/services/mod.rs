//! Transactional stock services.
//!
//! Each operation opens one ledger transaction, locks the rows it touches
//! (always warehouse before catalog for the same product), and commits only
//! when every step succeeded. Returning early with an error drops the
//! transaction, which rolls it back.

use std::sync::Arc;

use stockroom_core::{Clock, StockResult};
use stockroom_inventory::WarehouseStock;

use crate::ledger::StockLedger;
use crate::scheduler::ArrivalScheduler;

mod orders;
mod reconcile;
mod restock;
mod transfer;

pub use orders::{OrderService, PlacedOrder};
pub use reconcile::ReconciliationService;
pub use restock::{ArrivalApplied, RestockService};
pub use transfer::TransferService;

/// All stock services over one shared ledger.
#[derive(Clone)]
pub struct StockServices {
    pub transfer: TransferService,
    pub orders: OrderService,
    pub restocks: Arc<RestockService>,
    pub reconciliation: ReconciliationService,
    ledger: Arc<dyn StockLedger>,
}

impl StockServices {
    pub fn new(
        ledger: Arc<dyn StockLedger>,
        clock: Arc<dyn Clock>,
        lead_time: chrono::Duration,
    ) -> Self {
        let scheduler = Arc::new(ArrivalScheduler::new(clock.clone()));
        Self {
            transfer: TransferService::new(ledger.clone()),
            orders: OrderService::new(ledger.clone(), clock.clone()),
            restocks: Arc::new(RestockService::new(ledger.clone(), clock, scheduler, lead_time)),
            reconciliation: ReconciliationService::new(ledger.clone()),
            ledger,
        }
    }

    /// Current warehouse rows, by product id.
    pub async fn warehouse_levels(&self) -> StockResult<Vec<WarehouseStock>> {
        let mut tx = self.ledger.begin().await?;
        let rows = tx.list_warehouse().await?;
        tx.commit().await?;
        Ok(rows)
    }
}
