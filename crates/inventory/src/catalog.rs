use stockroom_core::{
    CatalogEntryId, Money, ProductId, Quantity, ShelfId, StockError, StockResult,
};

/// Price pair carried by a catalog entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CatalogPricing {
    pub price: Money,
    pub old_price: Option<Money>,
}

/// Shelf stock for one product on one shelf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    id: CatalogEntryId,
    product_id: ProductId,
    shelf_id: ShelfId,
    quantity_available: Quantity,
    pricing: CatalogPricing,
}

/// A catalog entry about to be created (zero stock, id assigned by the ledger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogEntry {
    pub product_id: ProductId,
    pub shelf_id: ShelfId,
    pub pricing: CatalogPricing,
}

impl CatalogEntry {
    pub fn new(
        id: CatalogEntryId,
        product_id: ProductId,
        shelf_id: ShelfId,
        quantity_available: Quantity,
        pricing: CatalogPricing,
    ) -> Self {
        Self {
            id,
            product_id,
            shelf_id,
            quantity_available,
            pricing,
        }
    }

    pub fn id(&self) -> CatalogEntryId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn shelf_id(&self) -> ShelfId {
        self.shelf_id
    }

    pub fn quantity_available(&self) -> Quantity {
        self.quantity_available
    }

    pub fn price(&self) -> Money {
        self.pricing.price
    }

    pub fn old_price(&self) -> Option<Money> {
        self.pricing.old_price
    }

    pub fn pricing(&self) -> CatalogPricing {
        self.pricing
    }

    /// Put stock on the shelf.
    pub fn stock_up(&mut self, quantity: Quantity) -> StockResult<()> {
        self.quantity_available = self
            .quantity_available
            .checked_add(quantity)
            .ok_or_else(|| StockError::internal("catalog quantity overflow"))?;
        Ok(())
    }

    /// Take stock off the shelf for a sale. Returns the unit price snapshot.
    pub fn sell(&mut self, quantity: Quantity) -> StockResult<Money> {
        match self.quantity_available.checked_sub(quantity) {
            Some(rest) => {
                self.quantity_available = rest;
                Ok(self.pricing.price)
            }
            None => Err(StockError::insufficient(
                self.product_id,
                self.quantity_available.get(),
                quantity.get(),
            )),
        }
    }
}
