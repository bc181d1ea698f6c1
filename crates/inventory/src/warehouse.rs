use stockroom_core::{ProductId, Quantity, RestockId, StockError, StockResult};

/// Backroom stock for one product.
///
/// `last_restock_id` is the marker of the last restock whose arrival was
/// applied incrementally. A row with no marker has never been touched by the
/// per-arrival path and is the only kind of row reconciliation may rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseStock {
    product_id: ProductId,
    quantity_available: Quantity,
    last_restock_id: Option<RestockId>,
}

/// Aggregate over a product's arrived restocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ArrivedRestockSummary {
    pub product_id: ProductId,
    pub total_quantity: Quantity,
    pub latest_restock_id: RestockId,
}

impl WarehouseStock {
    pub fn new(
        product_id: ProductId,
        quantity_available: Quantity,
        last_restock_id: Option<RestockId>,
    ) -> Self {
        Self {
            product_id,
            quantity_available,
            last_restock_id,
        }
    }

    /// Fresh row with zero stock and no marker.
    pub fn empty(product_id: ProductId) -> Self {
        Self::new(product_id, Quantity::ZERO, None)
    }

    /// Row bootstrapped from arrival history.
    pub fn from_arrivals(summary: &ArrivedRestockSummary) -> Self {
        Self::new(
            summary.product_id,
            summary.total_quantity,
            Some(summary.latest_restock_id),
        )
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity_available(&self) -> Quantity {
        self.quantity_available
    }

    pub fn last_restock_id(&self) -> Option<RestockId> {
        self.last_restock_id
    }

    /// Checked withdrawal; fails without mutating when stock is short.
    pub fn withdraw(&mut self, quantity: Quantity) -> StockResult<()> {
        match self.quantity_available.checked_sub(quantity) {
            Some(rest) => {
                self.quantity_available = rest;
                Ok(())
            }
            None => Err(StockError::insufficient(
                self.product_id,
                self.quantity_available.get(),
                quantity.get(),
            )),
        }
    }

    /// Best-effort withdrawal floored at zero. Returns the amount actually removed.
    pub fn withdraw_floored(&mut self, quantity: Quantity) -> Quantity {
        let before = self.quantity_available;
        self.quantity_available = before.saturating_sub(quantity);
        before.saturating_sub(self.quantity_available)
    }

    /// Incremental arrival: add the restock quantity and move the marker.
    pub fn apply_arrival(&mut self, restock_id: RestockId, quantity: Quantity) -> StockResult<()> {
        self.quantity_available = self
            .quantity_available
            .checked_add(quantity)
            .ok_or_else(|| StockError::internal("warehouse quantity overflow"))?;
        self.last_restock_id = Some(restock_id);
        Ok(())
    }

    /// Recompute-from-source repair. Only rows without a marker are rewritten;
    /// returns whether the row changed hands.
    pub fn resync_from_arrivals(&mut self, summary: &ArrivedRestockSummary) -> bool {
        if self.last_restock_id.is_some() {
            return false;
        }
        self.quantity_available = summary.total_quantity;
        self.last_restock_id = Some(summary.latest_restock_id);
        true
    }
}
