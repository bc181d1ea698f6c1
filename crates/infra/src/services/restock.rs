use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};

use stockroom_core::{Clock, Quantity, RestockId, StockError, StockResult};
use stockroom_inventory::WarehouseStock;
use stockroom_purchasing::{Arrival, RestockRequest, RestockView};

use crate::ledger::{LedgerTx, StockLedger};
use crate::scheduler::ArrivalScheduler;

/// An arrival that was applied by this call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ArrivalApplied {
    pub arrival: Arrival,
    pub warehouse_quantity: Quantity,
}

/// Restock creation and the `Ordered` → `Arrived` transition.
///
/// Arrivals reach [`RestockService::mark_arrival`] from four places: the
/// explicit confirmation endpoint, the scheduler queue, the sweep run before
/// every restock listing, and the periodic sweep of the arrival worker. The
/// restock row lock plus the `arrived` flag make every path at-most-once.
pub struct RestockService {
    ledger: Arc<dyn StockLedger>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<ArrivalScheduler>,
    lead_time: Duration,
}

impl RestockService {
    pub fn new(
        ledger: Arc<dyn StockLedger>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<ArrivalScheduler>,
        lead_time: Duration,
    ) -> Self {
        Self {
            ledger,
            clock,
            scheduler,
            lead_time,
        }
    }

    pub fn scheduler(&self) -> &Arc<ArrivalScheduler> {
        &self.scheduler
    }

    #[instrument(
        skip(self, request),
        fields(
            product_id = %request.product_id,
            supplier_id = %request.supplier_id,
            quantity = %request.quantity
        ),
        err
    )]
    pub async fn create_restock(&self, request: RestockRequest) -> StockResult<RestockView> {
        let mut tx = self.ledger.begin().await?;

        if tx.product(request.product_id).await?.is_none() {
            return Err(StockError::validation(format!(
                "product {} does not exist",
                request.product_id
            )));
        }
        if !tx.supplier_exists(request.supplier_id).await? {
            return Err(StockError::validation(format!(
                "supplier {} does not exist",
                request.supplier_id
            )));
        }
        if let Some(employee) = request.responsible_id {
            if !tx.employee_exists(employee).await? {
                return Err(StockError::validation(format!(
                    "employee {employee} does not exist"
                )));
            }
        }

        let ordered_at = self.clock.now();
        let new_restock = request.place(ordered_at, self.lead_time);
        let restock_id = tx.insert_restock(&new_restock).await?;
        let view = tx.restock_view(restock_id).await?.ok_or_else(|| {
            StockError::internal(format!("restock {restock_id} vanished after insert"))
        })?;
        tx.commit().await?;

        self.scheduler.schedule(restock_id, ordered_at + self.lead_time);
        info!(restock_id = %restock_id, "restock ordered");

        Ok(view)
    }

    /// Apply the arrival of `restock_id`.
    ///
    /// Returns `Ok(None)` when the restock does not exist or already arrived;
    /// in both cases nothing is written.
    #[instrument(skip(self), fields(restock_id = %restock_id))]
    pub async fn mark_arrival(
        &self,
        restock_id: RestockId,
        arrived_at: Option<DateTime<Utc>>,
    ) -> StockResult<Option<ArrivalApplied>> {
        let mut tx = self.ledger.begin().await?;

        let Some(mut restock) = tx.lock_restock(restock_id).await? else {
            debug!("restock not found, nothing to apply");
            return Ok(None);
        };

        let at = arrived_at.unwrap_or_else(|| self.clock.now());
        let Some(arrival) = restock.mark_arrived(at) else {
            debug!("restock already arrived");
            return Ok(None);
        };

        let mut warehouse = lock_or_create_warehouse(tx.as_mut(), &arrival).await?;
        warehouse.apply_arrival(arrival.restock_id, arrival.quantity)?;

        tx.update_restock_arrival(&restock).await?;
        tx.update_warehouse(&warehouse).await?;
        tx.commit().await?;

        info!(
            product_id = %arrival.product_id,
            quantity = %arrival.quantity,
            warehouse_quantity = %warehouse.quantity_available(),
            "restock arrived"
        );

        Ok(Some(ArrivalApplied {
            arrival,
            warehouse_quantity: warehouse.quantity_available(),
        }))
    }

    /// Lazy sweep: apply every ordered restock whose expected arrival has passed
    /// and that was placed at least one lead time ago. Each arrival runs in its
    /// own transaction; a failing one is logged and skipped.
    pub async fn process_pending_arrivals(&self) -> StockResult<usize> {
        let now = self.clock.now();
        let overdue = {
            let mut tx = self.ledger.begin().await?;
            let ids = tx.overdue_restocks(now, self.lead_time).await?;
            tx.commit().await?;
            ids
        };

        let applied = self.apply_all(&overdue, "sweep").await;
        if applied > 0 {
            info!(applied, candidates = overdue.len(), "overdue restocks swept");
        }
        Ok(applied)
    }

    /// Apply everything the scheduler reports as due.
    pub async fn run_due_arrivals(&self) -> usize {
        let due = self.scheduler.take_due();
        if due.is_empty() {
            return 0;
        }
        self.apply_all(&due, "scheduler").await
    }

    /// Denormalized restocks, newest first. Sweeps overdue arrivals first so
    /// the listing reflects them; a failed sweep does not fail the listing.
    pub async fn list_restocks(&self) -> StockResult<Vec<RestockView>> {
        if let Err(err) = self.process_pending_arrivals().await {
            warn!(error = %err, "arrival sweep before restock listing failed");
        }

        let mut tx = self.ledger.begin().await?;
        let restocks = tx.list_restocks().await?;
        tx.commit().await?;
        Ok(restocks)
    }

    async fn apply_all(&self, ids: &[RestockId], trigger: &'static str) -> usize {
        let mut applied = 0;
        for &id in ids {
            match self.mark_arrival(id, None).await {
                Ok(Some(_)) => applied += 1,
                Ok(None) => {}
                Err(err) => {
                    warn!(restock_id = %id, trigger, error = %err, "failed to apply restock arrival");
                }
            }
        }
        applied
    }
}

/// Lock the warehouse row for an arriving product, creating it empty when
/// absent. Earlier arrival history is only folded in by reconciliation and the
/// transfer bootstrap.
async fn lock_or_create_warehouse(
    tx: &mut dyn LedgerTx,
    arrival: &Arrival,
) -> StockResult<WarehouseStock> {
    if let Some(row) = tx.lock_warehouse(arrival.product_id).await? {
        return Ok(row);
    }

    tx.insert_warehouse_if_absent(&WarehouseStock::empty(arrival.product_id))
        .await?;
    tx.lock_warehouse(arrival.product_id).await?.ok_or_else(|| {
        StockError::internal(format!(
            "warehouse row for product {} vanished after insert",
            arrival.product_id
        ))
    })
}
