//! Service-level tests over the in-memory ledger.
//!
//! Verifies:
//! - The warehouse → shelf → order flow keeps both stocks consistent
//! - Arrivals are applied at most once, whichever trigger fires
//! - Orders are all-or-nothing
//! - Reconciliation only repairs unmarked rows and is idempotent

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use stockroom_core::{
        EmployeeId, ManualClock, Money, ProductId, Quantity, RestockId, ShelfId, StockError,
        SupplierId, UserId,
    };
    use stockroom_inventory::{CatalogPricing, Product, Shelf, TransferRequest, WarehouseStock};
    use stockroom_purchasing::{Employee, NewRestock, RestockRequest, RestockStatus, Supplier};
    use stockroom_sales::OrderRequest;

    use crate::ledger::{InMemoryStockLedger, LedgerState};
    use crate::services::StockServices;
    use crate::workers::ArrivalWorker;

    const P1: ProductId = ProductId::from_raw(1);
    const P2: ProductId = ProductId::from_raw(2);
    const S1: ShelfId = ShelfId::from_raw(1);
    const S2: ShelfId = ShelfId::from_raw(2);
    const SUPPLIER: SupplierId = SupplierId::from_raw(1);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    fn lead() -> Duration {
        Duration::seconds(30)
    }

    fn price(cents: i64) -> CatalogPricing {
        CatalogPricing {
            price: Money::from_cents(cents).unwrap(),
            old_price: None,
        }
    }

    fn reference_data(state: &mut LedgerState) {
        for (id, name) in [(P1, "Farina 00"), (P2, "Olio EVO")] {
            state.add_product(Product {
                id,
                name: name.to_string(),
                brand: "Casa".to_string(),
                category: "Alimentari".to_string(),
            });
        }
        for (id, name) in [(S1, "Corsia 1"), (S2, "Corsia 2")] {
            state.add_shelf(Shelf {
                id,
                name: name.to_string(),
            });
        }
        state.add_supplier(Supplier {
            id: SUPPLIER,
            name: "Grossista Nord".to_string(),
        });
        state.add_employee(Employee {
            id: EmployeeId::from_raw(1),
            name: "Marco Rossi".to_string(),
        });
    }

    struct Fixture {
        ledger: Arc<InMemoryStockLedger>,
        clock: Arc<ManualClock>,
        services: StockServices,
    }

    async fn setup() -> Fixture {
        let ledger = Arc::new(InMemoryStockLedger::new());
        ledger.seed(reference_data).await;
        let clock = Arc::new(ManualClock::new(t0()));
        let services = StockServices::new(ledger.clone(), clock.clone(), lead());
        Fixture {
            ledger,
            clock,
            services,
        }
    }

    impl Fixture {
        async fn warehouse(&self, product_id: ProductId) -> Option<i64> {
            self.ledger
                .snapshot()
                .await
                .warehouse(product_id)
                .map(|w| w.quantity_available().get())
        }

        async fn shelf(&self, product_id: ProductId, shelf_id: ShelfId) -> Option<i64> {
            self.ledger
                .snapshot()
                .await
                .catalog(product_id, shelf_id)
                .map(|c| c.quantity_available().get())
        }

        async fn restock(&self, product_id: ProductId, quantity: i64) -> RestockId {
            let request = RestockRequest::new(product_id, SUPPLIER, quantity, None, None).unwrap();
            self.services
                .restocks
                .create_restock(request)
                .await
                .unwrap()
                .restock
                .id()
        }

        async fn transfer(&self, product_id: ProductId, quantity: i64, shelf_id: ShelfId) -> Result<(), StockError> {
            let request = TransferRequest::new(product_id, quantity, shelf_id)?;
            self.services.transfer.move_stock(request).await.map(|_| ())
        }

        async fn order(&self, items: Vec<(ProductId, i64)>) -> Result<(), StockError> {
            let request = OrderRequest::new(UserId::from_raw(7), items)?;
            self.services.orders.create_order(request).await.map(|_| ())
        }
    }

    fn arrived_restock(product_id: ProductId, quantity: i64, ordered_at: DateTime<Utc>) -> NewRestock {
        NewRestock {
            product_id,
            supplier_id: SUPPLIER,
            quantity_ordered: Quantity::positive(quantity).unwrap(),
            ordered_at,
            expected_arrival_at: Some(ordered_at),
            responsible_id: None,
        }
    }

    #[tokio::test]
    async fn restock_transfer_order_scenario() {
        let fx = setup().await;

        let restock_id = fx.restock(P1, 10).await;
        let applied = fx
            .services
            .restocks
            .mark_arrival(restock_id, None)
            .await
            .unwrap()
            .expect("first arrival applies");
        assert_eq!(applied.warehouse_quantity.get(), 10);
        assert_eq!(fx.warehouse(P1).await, Some(10));

        fx.transfer(P1, 4, S1).await.unwrap();
        assert_eq!(fx.warehouse(P1).await, Some(6));
        assert_eq!(fx.shelf(P1, S1).await, Some(4));

        fx.order(vec![(P1, 3)]).await.unwrap();
        assert_eq!(fx.shelf(P1, S1).await, Some(1));
        assert_eq!(fx.warehouse(P1).await, Some(3));

        let again = fx.services.restocks.mark_arrival(restock_id, None).await.unwrap();
        assert!(again.is_none());
        assert_eq!(fx.warehouse(P1).await, Some(3));
    }

    #[tokio::test]
    async fn concurrent_arrivals_apply_once() {
        let fx = setup().await;
        let restock_id = fx.restock(P1, 8).await;

        let restocks = fx.services.restocks.clone();
        let (a, b) = tokio::join!(
            restocks.mark_arrival(restock_id, None),
            restocks.mark_arrival(restock_id, None)
        );

        let applied = [a.unwrap(), b.unwrap()].iter().filter(|r| r.is_some()).count();
        assert_eq!(applied, 1);
        assert_eq!(fx.warehouse(P1).await, Some(8));
    }

    #[tokio::test]
    async fn unknown_restock_arrival_is_a_no_op() {
        let fx = setup().await;
        let result = fx
            .services
            .restocks
            .mark_arrival(RestockId::from_raw(999), None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn explicit_arrival_time_is_recorded() {
        let fx = setup().await;
        let restock_id = fx.restock(P1, 2).await;
        let at = t0() + Duration::minutes(3);

        fx.services.restocks.mark_arrival(restock_id, Some(at)).await.unwrap();

        let state = fx.ledger.snapshot().await;
        let restock = state.restock(restock_id).unwrap();
        assert_eq!(restock.status(), RestockStatus::Arrived);
        assert_eq!(restock.actual_arrival_at(), Some(at));
        assert_eq!(
            state.warehouse(P1).and_then(|w| w.last_restock_id()),
            Some(restock_id)
        );
    }

    #[tokio::test]
    async fn order_is_all_or_nothing() {
        let fx = setup().await;
        fx.ledger
            .seed(|s| {
                s.put_warehouse(WarehouseStock::new(P1, Quantity::new(20).unwrap(), None));
                s.put_catalog(P1, S1, Quantity::new(5).unwrap(), price(250));
                s.put_catalog(P2, S1, Quantity::new(1).unwrap(), price(900));
            })
            .await;

        let err = fx.order(vec![(P1, 2), (P2, 3)]).await.unwrap_err();
        assert_eq!(err, StockError::insufficient(P2, 1, 3));

        assert_eq!(fx.shelf(P1, S1).await, Some(5));
        assert_eq!(fx.shelf(P2, S1).await, Some(1));
        assert_eq!(fx.warehouse(P1).await, Some(20));
        assert!(fx.services.orders.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn order_prices_lines_and_floors_warehouse_mirror() {
        let fx = setup().await;
        fx.ledger
            .seed(|s| {
                s.put_warehouse(WarehouseStock::new(P1, Quantity::new(1).unwrap(), None));
                s.put_catalog(P1, S1, Quantity::new(2).unwrap(), price(150));
                s.put_catalog(P1, S2, Quantity::new(6).unwrap(), price(150));
                s.put_catalog(P2, S1, Quantity::new(3).unwrap(), price(99));
            })
            .await;

        let placed = fx
            .services
            .orders
            .create_order(OrderRequest::new(UserId::from_raw(3), vec![(P1, 4), (P2, 1)]).unwrap())
            .await
            .unwrap();

        assert_eq!(placed.total.cents(), 4 * 150 + 99);
        assert_eq!(placed.lines.len(), 2);
        assert_eq!(placed.lines[0].product_id, P1);

        // Best-stocked shelf is used; the other one is untouched.
        assert_eq!(fx.shelf(P1, S2).await, Some(2));
        assert_eq!(fx.shelf(P1, S1).await, Some(2));
        // Warehouse mirror stops at zero; a missing row is not an error.
        assert_eq!(fx.warehouse(P1).await, Some(0));
        assert_eq!(fx.warehouse(P2).await, None);

        let orders = fx.services.orders.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, placed.order_id);
        assert_eq!(orders[0].lines.len(), 2);
    }

    #[tokio::test]
    async fn order_for_product_without_shelf_is_not_found() {
        let fx = setup().await;
        let err = fx.order(vec![(P2, 1)]).await.unwrap_err();
        assert!(matches!(err, StockError::NotFound(_)));
    }

    #[tokio::test]
    async fn transfer_rejects_unknown_shelf_and_missing_stock() {
        let fx = setup().await;

        let err = fx.transfer(P1, 1, ShelfId::from_raw(42)).await.unwrap_err();
        assert!(matches!(err, StockError::NotFound(_)));

        // No warehouse row and no arrival history.
        let err = fx.transfer(P1, 1, S1).await.unwrap_err();
        assert!(matches!(err, StockError::NotFound(_)));

        fx.ledger
            .seed(|s| s.put_warehouse(WarehouseStock::new(P1, Quantity::new(2).unwrap(), None)))
            .await;
        let err = fx.transfer(P1, 3, S1).await.unwrap_err();
        assert_eq!(err, StockError::insufficient(P1, 2, 3));
        assert_eq!(fx.warehouse(P1).await, Some(2));
        assert_eq!(fx.shelf(P1, S1).await, None);
    }

    #[tokio::test]
    async fn transfer_bootstraps_warehouse_and_inherits_price() {
        let fx = setup().await;
        let (first, second) = {
            let mut ids = (RestockId::from_raw(0), RestockId::from_raw(0));
            fx.ledger
                .seed(|s| {
                    ids.0 = s.put_restock(arrived_restock(P1, 5, t0()), Some(t0())).unwrap();
                    ids.1 = s.put_restock(arrived_restock(P1, 7, t0()), Some(t0() + Duration::hours(1))).unwrap();
                    s.put_catalog(P1, S1, Quantity::ZERO, price(420));
                })
                .await;
            ids
        };
        assert_ne!(first, second);

        fx.transfer(P1, 4, S2).await.unwrap();

        let state = fx.ledger.snapshot().await;
        let warehouse = state.warehouse(P1).unwrap();
        assert_eq!(warehouse.quantity_available().get(), 8);
        assert_eq!(warehouse.last_restock_id(), Some(second));

        let entry = state.catalog(P1, S2).unwrap();
        assert_eq!(entry.quantity_available().get(), 4);
        assert_eq!(entry.price().cents(), 420);
    }

    #[tokio::test]
    async fn reconciliation_repairs_only_unmarked_rows() {
        let fx = setup().await;
        fx.ledger
            .seed(|s| {
                s.put_restock(arrived_restock(P1, 7, t0()), Some(t0())).unwrap();
                s.put_restock(arrived_restock(P1, 5, t0()), Some(t0() + Duration::minutes(1))).unwrap();
                let marker = s.put_restock(arrived_restock(P2, 9, t0()), Some(t0())).unwrap();
                // P2 is already maintained incrementally and has sold stock since.
                s.put_warehouse(WarehouseStock::new(P2, Quantity::new(4).unwrap(), Some(marker)));
            })
            .await;

        let touched = fx.services.reconciliation.reconcile_arrivals().await.unwrap();
        assert_eq!(touched, 1);
        assert_eq!(fx.warehouse(P1).await, Some(12));
        assert_eq!(fx.warehouse(P2).await, Some(4));

        let again = fx.services.reconciliation.reconcile_arrivals().await.unwrap();
        assert_eq!(again, 0);
        assert_eq!(fx.warehouse(P1).await, Some(12));
    }

    #[tokio::test]
    async fn reconciliation_resyncs_unmarked_existing_row() {
        let fx = setup().await;
        fx.ledger
            .seed(|s| {
                s.put_restock(arrived_restock(P1, 6, t0()), Some(t0())).unwrap();
                s.put_warehouse(WarehouseStock::new(P1, Quantity::ZERO, None));
            })
            .await;

        assert_eq!(fx.services.reconciliation.reconcile_arrivals().await.unwrap(), 1);
        assert_eq!(fx.warehouse(P1).await, Some(6));

        // A later arrival moves the marker; reconciliation leaves it alone.
        let restock_id = fx.restock(P1, 4).await;
        fx.services.restocks.mark_arrival(restock_id, None).await.unwrap();
        assert_eq!(fx.services.reconciliation.reconcile_arrivals().await.unwrap(), 0);
        assert_eq!(fx.warehouse(P1).await, Some(10));
    }

    #[tokio::test]
    async fn sweep_waits_for_lead_time_and_expected_arrival() {
        let fx = setup().await;
        fx.restock(P1, 10).await;

        fx.clock.advance(Duration::seconds(10));
        assert_eq!(fx.services.restocks.process_pending_arrivals().await.unwrap(), 0);
        assert_eq!(fx.warehouse(P1).await, None);

        fx.clock.advance(Duration::seconds(20));
        let listed = fx.services.restocks.list_restocks().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].restock.status(), RestockStatus::Arrived);
        assert_eq!(listed[0].product_name, "Farina 00");
        assert_eq!(listed[0].supplier_name, "Grossista Nord");
        assert_eq!(fx.warehouse(P1).await, Some(10));

        assert_eq!(fx.services.restocks.process_pending_arrivals().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sweep_respects_explicit_future_expected_arrival() {
        let fx = setup().await;
        let request = RestockRequest::new(P1, SUPPLIER, 3, Some(t0() + Duration::hours(2)), None).unwrap();
        fx.services.restocks.create_restock(request).await.unwrap();

        fx.clock.advance(Duration::minutes(5));
        assert_eq!(fx.services.restocks.process_pending_arrivals().await.unwrap(), 0);

        fx.clock.advance(Duration::hours(2));
        assert_eq!(fx.services.restocks.process_pending_arrivals().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn scheduler_fires_after_lead_time() {
        let fx = setup().await;
        fx.restock(P1, 5).await;
        assert_eq!(fx.services.restocks.scheduler().pending(), 1);

        assert_eq!(fx.services.restocks.run_due_arrivals().await, 0);

        fx.clock.advance(lead());
        assert_eq!(fx.services.restocks.run_due_arrivals().await, 1);
        assert_eq!(fx.services.restocks.scheduler().pending(), 0);
        assert_eq!(fx.warehouse(P1).await, Some(5));
    }

    #[tokio::test]
    async fn create_restock_validates_references() {
        let fx = setup().await;

        let unknown_supplier = RestockRequest::new(P1, SupplierId::from_raw(9), 1, None, None).unwrap();
        let err = fx.services.restocks.create_restock(unknown_supplier).await.unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));

        let unknown_product = RestockRequest::new(ProductId::from_raw(9), SUPPLIER, 1, None, None).unwrap();
        let err = fx.services.restocks.create_restock(unknown_product).await.unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));

        let unknown_employee =
            RestockRequest::new(P1, SUPPLIER, 1, None, Some(EmployeeId::from_raw(9))).unwrap();
        let err = fx.services.restocks.create_restock(unknown_employee).await.unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));

        let ok = RestockRequest::new(P1, SUPPLIER, 1, None, Some(EmployeeId::from_raw(1))).unwrap();
        let view = fx.services.restocks.create_restock(ok).await.unwrap();
        assert_eq!(view.responsible_name.as_deref(), Some("Marco Rossi"));
        assert_eq!(view.restock.expected_arrival_at(), Some(t0() + lead()));
    }

    #[tokio::test]
    async fn worker_applies_scheduled_arrivals() {
        let fx = setup().await;
        fx.restock(P1, 6).await;
        fx.clock.advance(lead());

        let handle = ArrivalWorker::new(StdDuration::from_millis(10))
            .spawn("arrival-worker-test", fx.services.restocks.clone());

        let mut applied = false;
        for _ in 0..200 {
            if fx.warehouse(P1).await == Some(6) {
                applied = true;
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        handle.shutdown().await;

        assert!(applied, "worker did not apply the due arrival");
    }

    #[tokio::test]
    async fn stock_never_goes_negative_across_mixed_operations() {
        let fx = setup().await;
        let restock_id = fx.restock(P1, 12).await;
        fx.services.restocks.mark_arrival(restock_id, None).await.unwrap();

        let ops: [(i64, i64); 6] = [(5, 2), (9, 4), (4, 7), (3, 1), (2, 9), (8, 3)];
        for (move_qty, sell_qty) in ops {
            let _ = fx.transfer(P1, move_qty, S1).await;
            let _ = fx.order(vec![(P1, sell_qty)]).await;

            let warehouse = fx.warehouse(P1).await.unwrap_or(0);
            let shelf = fx.shelf(P1, S1).await.unwrap_or(0);
            assert!(warehouse >= 0 && shelf >= 0);
            assert!(shelf + warehouse <= 12);
        }
    }

    #[tokio::test]
    async fn arrival_on_missing_row_adds_only_its_own_quantity() {
        let fx = setup().await;
        fx.ledger
            .seed(|s| {
                s.put_restock(arrived_restock(P1, 5, t0()), Some(t0())).unwrap();
            })
            .await;

        let restock_id = fx.restock(P1, 3).await;
        fx.services.restocks.mark_arrival(restock_id, None).await.unwrap();

        let state = fx.ledger.snapshot().await;
        let row = state.warehouse(P1).unwrap();
        assert_eq!(row.quantity_available().get(), 3);
        assert_eq!(row.last_restock_id(), Some(restock_id));

        // The marker keeps reconciliation away from the row.
        assert_eq!(fx.services.reconciliation.reconcile_arrivals().await.unwrap(), 0);
        assert_eq!(fx.warehouse(P1).await, Some(3));
    }

    #[tokio::test]
    async fn reconciliation_runs_alongside_orders_and_arrivals() {
        let fx = setup().await;
        fx.ledger
            .seed(|s| {
                s.put_restock(arrived_restock(P2, 6, t0()), Some(t0())).unwrap();
                s.put_catalog(P1, S1, Quantity::new(5).unwrap(), price(100));
                s.put_catalog(P2, S1, Quantity::new(5).unwrap(), price(200));
            })
            .await;
        let restock_id = fx.restock(P1, 4).await;

        let reconciliation = fx.services.reconciliation.clone();
        let restocks = fx.services.restocks.clone();
        let (reconciled, order, arrival) = tokio::join!(
            reconciliation.reconcile_arrivals(),
            fx.order(vec![(P2, 2), (P1, 1)]),
            restocks.mark_arrival(restock_id, None)
        );

        reconciled.unwrap();
        order.unwrap();
        assert!(arrival.unwrap().is_some());
        assert_eq!(fx.shelf(P1, S1).await, Some(4));
        assert_eq!(fx.shelf(P2, S1).await, Some(3));
        // The warehouse mirror only applies when the row already exists, so
        // each product ends at one of two totals depending on commit order.
        assert!(matches!(fx.warehouse(P1).await, Some(3) | Some(4)));
        assert!(matches!(fx.warehouse(P2).await, Some(4) | Some(6)));
    }

    #[tokio::test]
    async fn concurrent_sales_each_take_the_best_stocked_shelf() {
        let fx = setup().await;
        fx.ledger
            .seed(|s| {
                s.put_catalog(P1, S1, Quantity::new(4).unwrap(), price(100));
                s.put_catalog(P1, S2, Quantity::new(3).unwrap(), price(100));
            })
            .await;

        let (first, second) = tokio::join!(fx.order(vec![(P1, 3)]), fx.order(vec![(P1, 3)]));

        first.unwrap();
        second.unwrap();
        assert_eq!(fx.shelf(P1, S1).await, Some(1));
        assert_eq!(fx.shelf(P1, S2).await, Some(0));
    }
}
