use stockroom_core::{ProductId, Quantity, ShelfId, StockError, StockResult};

use crate::catalog::CatalogEntry;
use crate::warehouse::WarehouseStock;

/// Validated request to move stock from the warehouse onto a shelf.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub shelf_id: ShelfId,
}

impl TransferRequest {
    pub fn new(product_id: ProductId, quantity: i64, shelf_id: ShelfId) -> StockResult<Self> {
        Ok(Self {
            product_id,
            quantity: Quantity::positive(quantity)?,
            shelf_id,
        })
    }
}

/// Result of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub transferred: Quantity,
    pub warehouse_remaining: Quantity,
    pub catalog_entry: CatalogEntry,
}

/// Move `quantity` from `warehouse` to `catalog`.
///
/// Both rows are updated or neither is: the warehouse withdrawal and the shelf
/// increment are computed on copies and only written back when both succeed.
pub fn apply_transfer(
    warehouse: &mut WarehouseStock,
    catalog: &mut CatalogEntry,
    quantity: Quantity,
) -> StockResult<()> {
    if warehouse.product_id() != catalog.product_id() {
        return Err(StockError::internal(format!(
            "transfer rows disagree on product: warehouse {} vs catalog {}",
            warehouse.product_id(),
            catalog.product_id()
        )));
    }

    let mut next_warehouse = warehouse.clone();
    next_warehouse.withdraw(quantity)?;

    let mut next_catalog = catalog.clone();
    next_catalog.stock_up(quantity)?;

    *warehouse = next_warehouse;
    *catalog = next_catalog;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogPricing;
    use proptest::prelude::*;
    use stockroom_core::CatalogEntryId;

    fn pid() -> ProductId {
        ProductId::from_raw(1)
    }

    fn shelf_entry(qty: i64) -> CatalogEntry {
        CatalogEntry::new(
            CatalogEntryId::from_raw(1),
            pid(),
            ShelfId::from_raw(3),
            Quantity::new(qty).unwrap(),
            CatalogPricing::default(),
        )
    }

    #[test]
    fn request_requires_positive_quantity() {
        assert!(TransferRequest::new(pid(), 0, ShelfId::from_raw(1)).is_err());
        assert!(TransferRequest::new(pid(), -2, ShelfId::from_raw(1)).is_err());
        assert!(TransferRequest::new(pid(), 2, ShelfId::from_raw(1)).is_ok());
    }

    #[test]
    fn insufficient_warehouse_leaves_both_rows_untouched() {
        let mut w = WarehouseStock::new(pid(), Quantity::new(2).unwrap(), None);
        let mut c = shelf_entry(1);

        let err = apply_transfer(&mut w, &mut c, Quantity::positive(3).unwrap()).unwrap_err();
        assert!(matches!(err, StockError::InsufficientStock { available: 2, requested: 3, .. }));
        assert_eq!(w.quantity_available().get(), 2);
        assert_eq!(c.quantity_available().get(), 1);
    }

    #[test]
    fn mismatched_products_are_rejected() {
        let mut w = WarehouseStock::new(ProductId::from_raw(2), Quantity::new(5).unwrap(), None);
        let mut c = shelf_entry(0);
        assert!(apply_transfer(&mut w, &mut c, Quantity::positive(1).unwrap()).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: a transfer never changes warehouse + shelf, and neither goes negative.
        #[test]
        fn transfer_conserves_total(
            warehouse in 0i64..10_000,
            shelf in 0i64..10_000,
            moves in prop::collection::vec(1i64..500, 1..20)
        ) {
            let mut w = WarehouseStock::new(pid(), Quantity::new(warehouse).unwrap(), None);
            let mut c = shelf_entry(shelf);
            let total = warehouse + shelf;

            for m in moves {
                let before_w = w.quantity_available().get();
                let result = apply_transfer(&mut w, &mut c, Quantity::positive(m).unwrap());
                if m > before_w {
                    prop_assert!(result.is_err());
                } else {
                    prop_assert!(result.is_ok());
                }
                prop_assert!(w.quantity_available().get() >= 0);
                prop_assert!(c.quantity_available().get() >= 0);
                prop_assert_eq!(w.quantity_available().get() + c.quantity_available().get(), total);
            }
        }
    }
}
