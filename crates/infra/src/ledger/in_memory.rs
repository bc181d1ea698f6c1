//! In-memory stock ledger for tests and dev.
//!
//! Transactions are serialized: `begin` takes the single ledger lock and writes
//! go straight to the shared state, each one journaling the prior row.
//! Dropping an uncommitted transaction replays the journal backwards
//! (rollback) before releasing the lock. This is a stricter schedule than
//! PostgreSQL's row locks and yields the same outcomes.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use stockroom_core::{
    CatalogEntryId, EmployeeId, Money, OrderId, ProductId, Quantity, RestockId, ShelfId,
    StockResult, SupplierId,
};
use stockroom_inventory::{
    ArrivedRestockSummary, CatalogEntry, CatalogPricing, NewCatalogEntry, Product, Shelf,
    WarehouseStock,
};
use stockroom_purchasing::{Employee, NewRestock, RestockOrder, RestockView, Supplier};
use stockroom_sales::{NewOrder, Order, OrderLine};

use super::{LedgerError, LedgerResult, LedgerTx, StockLedger};

/// Whole ledger state, shared by every transaction under one lock.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    products: BTreeMap<ProductId, Product>,
    shelves: BTreeMap<ShelfId, Shelf>,
    suppliers: BTreeMap<SupplierId, Supplier>,
    employees: BTreeMap<EmployeeId, Employee>,
    warehouse: BTreeMap<ProductId, WarehouseStock>,
    catalog: BTreeMap<(ProductId, ShelfId), CatalogEntry>,
    restocks: BTreeMap<RestockId, RestockOrder>,
    orders: BTreeMap<OrderId, Order>,
    next_catalog_id: i64,
    next_restock_id: i64,
    next_order_id: i64,
}

impl LedgerState {
    pub fn add_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn add_shelf(&mut self, shelf: Shelf) {
        self.shelves.insert(shelf.id, shelf);
    }

    pub fn add_supplier(&mut self, supplier: Supplier) {
        self.suppliers.insert(supplier.id, supplier);
    }

    pub fn add_employee(&mut self, employee: Employee) {
        self.employees.insert(employee.id, employee);
    }

    /// Overwrite (or create) a warehouse row, bypassing the services.
    pub fn put_warehouse(&mut self, row: WarehouseStock) {
        self.warehouse.insert(row.product_id(), row);
    }

    /// Overwrite (or create) a catalog entry, bypassing the services.
    pub fn put_catalog(
        &mut self,
        product_id: ProductId,
        shelf_id: ShelfId,
        quantity: Quantity,
        pricing: CatalogPricing,
    ) -> CatalogEntryId {
        let id = match self.catalog.get(&(product_id, shelf_id)) {
            Some(existing) => existing.id(),
            None => self.next_catalog_id(),
        };
        self.catalog.insert(
            (product_id, shelf_id),
            CatalogEntry::new(id, product_id, shelf_id, quantity, pricing),
        );
        id
    }

    /// Record a restock directly, optionally already arrived, without touching
    /// warehouse stock (history imported from elsewhere).
    pub fn put_restock(
        &mut self,
        restock: NewRestock,
        arrived_at: Option<DateTime<Utc>>,
    ) -> StockResult<RestockId> {
        let id = RestockId::from_raw(self.next_restock_id + 1);
        let row = RestockOrder::restore(id, restock, arrived_at, arrived_at.is_some())?;
        self.next_restock_id += 1;
        self.restocks.insert(id, row);
        Ok(id)
    }

    pub fn warehouse(&self, product_id: ProductId) -> Option<&WarehouseStock> {
        self.warehouse.get(&product_id)
    }

    pub fn catalog(&self, product_id: ProductId, shelf_id: ShelfId) -> Option<&CatalogEntry> {
        self.catalog.get(&(product_id, shelf_id))
    }

    pub fn restock(&self, restock_id: RestockId) -> Option<&RestockOrder> {
        self.restocks.get(&restock_id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    fn counters(&self) -> [i64; 3] {
        [self.next_catalog_id, self.next_restock_id, self.next_order_id]
    }

    fn restore_counters(&mut self, [catalog, restock, order]: [i64; 3]) {
        self.next_catalog_id = catalog;
        self.next_restock_id = restock;
        self.next_order_id = order;
    }

    fn revert(&mut self, entry: Undo) {
        match entry {
            Undo::Warehouse(key, prior) => restore(&mut self.warehouse, key, prior),
            Undo::Catalog(key, prior) => restore(&mut self.catalog, key, prior),
            Undo::Restock(key, prior) => restore(&mut self.restocks, key, prior),
            Undo::Order(key) => {
                self.orders.remove(&key);
            }
        }
    }

    fn next_catalog_id(&mut self) -> CatalogEntryId {
        self.next_catalog_id += 1;
        CatalogEntryId::from_raw(self.next_catalog_id)
    }

    fn next_restock_id(&mut self) -> RestockId {
        self.next_restock_id += 1;
        RestockId::from_raw(self.next_restock_id)
    }

    fn next_order_id(&mut self) -> OrderId {
        self.next_order_id += 1;
        OrderId::from_raw(self.next_order_id)
    }

    fn view(&self, restock: &RestockOrder) -> LedgerResult<RestockView> {
        let product = self.products.get(&restock.product_id()).ok_or_else(|| {
            LedgerError::Corrupt(format!(
                "restock {} references missing product {}",
                restock.id(),
                restock.product_id()
            ))
        })?;
        let supplier = self.suppliers.get(&restock.supplier_id()).ok_or_else(|| {
            LedgerError::Corrupt(format!(
                "restock {} references missing supplier {}",
                restock.id(),
                restock.supplier_id()
            ))
        })?;
        let responsible_name = restock
            .responsible_id()
            .and_then(|id| self.employees.get(&id))
            .map(|e| e.name.clone());

        Ok(RestockView {
            restock: restock.clone(),
            product_name: product.name.clone(),
            product_brand: product.brand.clone(),
            supplier_name: supplier.name.clone(),
            responsible_name,
        })
    }

    fn summarize(&self, product_id: ProductId) -> Option<ArrivedRestockSummary> {
        let arrived: Vec<&RestockOrder> = self
            .restocks
            .values()
            .filter(|r| r.product_id() == product_id && r.is_arrived())
            .collect();

        let latest = arrived
            .iter()
            .max_by_key(|r| (r.actual_arrival_at(), r.id()))?
            .id();

        let total = arrived
            .iter()
            .try_fold(Quantity::ZERO, |acc, r| acc.checked_add(r.quantity_ordered()))?;

        Some(ArrivedRestockSummary {
            product_id,
            total_quantity: total,
            latest_restock_id: latest,
        })
    }

    /// Small reference dataset for running the service without a database.
    pub fn demo() -> Self {
        let mut state = LedgerState::default();

        let products = [
            (1, "Pasta di semola 500g", "Molisana", "Alimentari"),
            (2, "Passata di pomodoro 700g", "Mutti", "Alimentari"),
            (3, "Detersivo piatti 1L", "Svelto", "Casa"),
        ];
        for (id, name, brand, category) in products {
            state.add_product(Product {
                id: ProductId::from_raw(id),
                name: name.to_string(),
                brand: brand.to_string(),
                category: category.to_string(),
            });
        }

        for (id, name) in [(1, "Corsia 1"), (2, "Corsia 2")] {
            state.add_shelf(Shelf {
                id: ShelfId::from_raw(id),
                name: name.to_string(),
            });
        }

        state.add_supplier(Supplier {
            id: SupplierId::from_raw(1),
            name: "Distribuzione Centrale".to_string(),
        });
        state.add_employee(Employee {
            id: EmployeeId::from_raw(1),
            name: "Giulia Bianchi".to_string(),
        });

        state.put_catalog(
            ProductId::from_raw(1),
            ShelfId::from_raw(1),
            Quantity::ZERO,
            CatalogPricing {
                price: Money::from_cents(129).unwrap_or(Money::ZERO),
                old_price: None,
            },
        );

        state
    }
}

fn restore<K: Ord, V>(map: &mut BTreeMap<K, V>, key: K, prior: Option<V>) {
    match prior {
        Some(value) => {
            map.insert(key, value);
        }
        None => {
            map.remove(&key);
        }
    }
}

/// In-memory ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryStockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LedgerState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Mutate the committed state directly (test setup, seeding).
    pub async fn seed(&self, f: impl FnOnce(&mut LedgerState)) {
        let mut state = self.state.lock().await;
        f(&mut state);
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> LedgerState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn begin(&self) -> LedgerResult<Box<dyn LedgerTx>> {
        let guard = self.state.clone().lock_owned().await;
        let counters = guard.counters();
        Ok(Box::new(InMemoryTx {
            guard,
            undo: Vec::new(),
            counters,
            committed: false,
        }))
    }
}

/// Prior value of one written row, replayed in reverse on rollback.
enum Undo {
    Warehouse(ProductId, Option<WarehouseStock>),
    Catalog((ProductId, ShelfId), Option<CatalogEntry>),
    Restock(RestockId, Option<RestockOrder>),
    Order(OrderId),
}

struct InMemoryTx {
    guard: OwnedMutexGuard<LedgerState>,
    undo: Vec<Undo>,
    counters: [i64; 3],
    committed: bool,
}

impl Drop for InMemoryTx {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for entry in self.undo.drain(..).rev() {
            self.guard.revert(entry);
        }
        self.guard.restore_counters(self.counters);
    }
}

#[async_trait]
impl LedgerTx for InMemoryTx {
    async fn product(&mut self, product_id: ProductId) -> LedgerResult<Option<Product>> {
        Ok(self.guard.products.get(&product_id).cloned())
    }

    async fn shelf_exists(&mut self, shelf_id: ShelfId) -> LedgerResult<bool> {
        Ok(self.guard.shelves.contains_key(&shelf_id))
    }

    async fn supplier_exists(&mut self, supplier_id: SupplierId) -> LedgerResult<bool> {
        Ok(self.guard.suppliers.contains_key(&supplier_id))
    }

    async fn employee_exists(&mut self, employee_id: EmployeeId) -> LedgerResult<bool> {
        Ok(self.guard.employees.contains_key(&employee_id))
    }

    async fn lock_warehouse(&mut self, product_id: ProductId) -> LedgerResult<Option<WarehouseStock>> {
        Ok(self.guard.warehouse.get(&product_id).cloned())
    }

    async fn lock_unmarked_warehouse(&mut self, product_id: ProductId) -> LedgerResult<Option<WarehouseStock>> {
        Ok(self
            .guard
            .warehouse
            .get(&product_id)
            .filter(|row| row.last_restock_id().is_none())
            .cloned())
    }

    async fn insert_warehouse_if_absent(&mut self, seed: &WarehouseStock) -> LedgerResult<bool> {
        if self.guard.warehouse.contains_key(&seed.product_id()) {
            return Ok(false);
        }
        self.undo.push(Undo::Warehouse(seed.product_id(), None));
        self.guard.warehouse.insert(seed.product_id(), seed.clone());
        Ok(true)
    }

    async fn update_warehouse(&mut self, row: &WarehouseStock) -> LedgerResult<()> {
        match self.guard.warehouse.get_mut(&row.product_id()) {
            Some(existing) => {
                let prior = std::mem::replace(existing, row.clone());
                self.undo.push(Undo::Warehouse(row.product_id(), Some(prior)));
                Ok(())
            }
            None => Err(LedgerError::Corrupt(format!(
                "update of missing warehouse row for product {}",
                row.product_id()
            ))),
        }
    }

    async fn list_warehouse(&mut self) -> LedgerResult<Vec<WarehouseStock>> {
        Ok(self.guard.warehouse.values().cloned().collect())
    }

    async fn lock_catalog(
        &mut self,
        product_id: ProductId,
        shelf_id: ShelfId,
    ) -> LedgerResult<Option<CatalogEntry>> {
        Ok(self.guard.catalog.get(&(product_id, shelf_id)).cloned())
    }

    async fn lock_catalog_for_sale(&mut self, product_id: ProductId) -> LedgerResult<Option<CatalogEntry>> {
        let best = self
            .guard
            .catalog
            .values()
            .filter(|e| e.product_id() == product_id)
            .max_by(|a, b| {
                a.quantity_available()
                    .cmp(&b.quantity_available())
                    .then_with(|| b.shelf_id().cmp(&a.shelf_id()))
            })
            .cloned();
        Ok(best)
    }

    async fn catalog_pricing_hint(&mut self, product_id: ProductId) -> LedgerResult<Option<CatalogPricing>> {
        Ok(self
            .guard
            .catalog
            .values()
            .find(|e| e.product_id() == product_id)
            .map(|e| e.pricing()))
    }

    async fn insert_catalog_if_absent(&mut self, seed: &NewCatalogEntry) -> LedgerResult<()> {
        let key = (seed.product_id, seed.shelf_id);
        if !self.guard.catalog.contains_key(&key) {
            self.undo.push(Undo::Catalog(key, None));
            let id = self.guard.next_catalog_id();
            self.guard.catalog.insert(
                key,
                CatalogEntry::new(id, seed.product_id, seed.shelf_id, Quantity::ZERO, seed.pricing),
            );
        }
        Ok(())
    }

    async fn update_catalog(&mut self, entry: &CatalogEntry) -> LedgerResult<()> {
        match self
            .guard
            .catalog
            .get_mut(&(entry.product_id(), entry.shelf_id()))
        {
            Some(existing) => {
                let prior = std::mem::replace(existing, entry.clone());
                self.undo
                    .push(Undo::Catalog((entry.product_id(), entry.shelf_id()), Some(prior)));
                Ok(())
            }
            None => Err(LedgerError::Corrupt(format!(
                "update of missing catalog entry {}",
                entry.id()
            ))),
        }
    }

    async fn insert_order(&mut self, order: &NewOrder) -> LedgerResult<OrderId> {
        let id = self.guard.next_order_id();
        let lines = order
            .lines
            .iter()
            .map(|l| OrderLine {
                order_id: id,
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price,
                line_total: l.line_total,
            })
            .collect();
        self.undo.push(Undo::Order(id));
        self.guard.orders.insert(
            id,
            Order {
                id,
                user_id: order.user_id,
                placed_at: order.placed_at,
                status: order.status,
                total: order.total,
                lines,
            },
        );
        Ok(id)
    }

    async fn list_orders(&mut self) -> LedgerResult<Vec<Order>> {
        let mut orders: Vec<Order> = self.guard.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then_with(|| b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn insert_restock(&mut self, restock: &NewRestock) -> LedgerResult<RestockId> {
        let id = self.guard.next_restock_id();
        let row = RestockOrder::restore(id, restock.clone(), None, false)
            .map_err(|e| LedgerError::Corrupt(e.to_string()))?;
        self.undo.push(Undo::Restock(id, None));
        self.guard.restocks.insert(id, row);
        Ok(id)
    }

    async fn lock_restock(&mut self, restock_id: RestockId) -> LedgerResult<Option<RestockOrder>> {
        Ok(self.guard.restocks.get(&restock_id).cloned())
    }

    async fn update_restock_arrival(&mut self, restock: &RestockOrder) -> LedgerResult<()> {
        match self.guard.restocks.get_mut(&restock.id()) {
            Some(existing) => {
                let prior = std::mem::replace(existing, restock.clone());
                self.undo.push(Undo::Restock(restock.id(), Some(prior)));
                Ok(())
            }
            None => Err(LedgerError::Corrupt(format!(
                "update of missing restock {}",
                restock.id()
            ))),
        }
    }

    async fn restock_view(&mut self, restock_id: RestockId) -> LedgerResult<Option<RestockView>> {
        match self.guard.restocks.get(&restock_id) {
            Some(r) => self.guard.view(r).map(Some),
            None => Ok(None),
        }
    }

    async fn list_restocks(&mut self) -> LedgerResult<Vec<RestockView>> {
        let mut restocks: Vec<&RestockOrder> = self.guard.restocks.values().collect();
        restocks.sort_by(|a, b| {
            b.ordered_at()
                .cmp(&a.ordered_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        restocks.into_iter().map(|r| self.guard.view(r)).collect()
    }

    async fn overdue_restocks(
        &mut self,
        now: DateTime<Utc>,
        lead_time: Duration,
    ) -> LedgerResult<Vec<RestockId>> {
        Ok(self
            .guard
            .restocks
            .values()
            .filter(|r| r.is_overdue(now, lead_time))
            .map(|r| r.id())
            .collect())
    }

    async fn arrived_summary(&mut self, product_id: ProductId) -> LedgerResult<Option<ArrivedRestockSummary>> {
        Ok(self.guard.summarize(product_id))
    }

    async fn arrived_summaries(&mut self) -> LedgerResult<Vec<ArrivedRestockSummary>> {
        let mut products: Vec<ProductId> = self
            .guard
            .restocks
            .values()
            .filter(|r| r.is_arrived())
            .map(|r| r.product_id())
            .collect();
        products.sort();
        products.dedup();
        Ok(products
            .into_iter()
            .filter_map(|p| self.guard.summarize(p))
            .collect())
    }

    async fn commit(mut self: Box<Self>) -> LedgerResult<()> {
        self.committed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P1: ProductId = ProductId::from_raw(1);
    const P2: ProductId = ProductId::from_raw(2);
    const S2: ShelfId = ShelfId::from_raw(2);

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn new_restock(quantity: Quantity) -> NewRestock {
        NewRestock {
            product_id: P1,
            supplier_id: SupplierId::from_raw(1),
            quantity_ordered: quantity,
            ordered_at: Utc::now(),
            expected_arrival_at: None,
            responsible_id: None,
        }
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back_every_write() {
        let mut state = LedgerState::demo();
        state.put_warehouse(WarehouseStock::new(P2, qty(4), None));
        let ledger = InMemoryStockLedger::with_state(state);

        {
            let mut tx = ledger.begin().await.unwrap();
            assert!(tx.insert_warehouse_if_absent(&WarehouseStock::empty(P1)).await.unwrap());
            let restock_id = tx.insert_restock(&new_restock(qty(3))).await.unwrap();
            let mut row = tx.lock_warehouse(P1).await.unwrap().unwrap();
            row.apply_arrival(restock_id, qty(3)).unwrap();
            tx.update_warehouse(&row).await.unwrap();

            let mut other = tx.lock_warehouse(P2).await.unwrap().unwrap();
            other.withdraw(qty(4)).unwrap();
            tx.update_warehouse(&other).await.unwrap();

            tx.insert_catalog_if_absent(&NewCatalogEntry {
                product_id: P2,
                shelf_id: S2,
                pricing: CatalogPricing {
                    price: Money::ZERO,
                    old_price: None,
                },
            })
            .await
            .unwrap();
            // dropped without commit
        }

        let state = ledger.snapshot().await;
        assert!(state.warehouse(P1).is_none());
        assert_eq!(state.warehouse(P2).unwrap().quantity_available(), qty(4));
        assert!(state.restock(RestockId::from_raw(1)).is_none());
        assert!(state.catalog(P2, S2).is_none());

        // Ids handed out by the rolled-back transaction are reused.
        let mut tx = ledger.begin().await.unwrap();
        let restock_id = tx.insert_restock(&new_restock(qty(2))).await.unwrap();
        assert_eq!(restock_id, RestockId::from_raw(1));
        tx.commit().await.unwrap();
        assert!(ledger.snapshot().await.restock(restock_id).is_some());
    }

    #[test]
    fn put_restock_rejects_invalid_rows_without_consuming_an_id() {
        let mut state = LedgerState::default();
        assert!(state.put_restock(new_restock(Quantity::ZERO), None).is_err());
        assert!(state.restock(RestockId::from_raw(1)).is_none());

        let id = state.put_restock(new_restock(qty(5)), Some(Utc::now())).unwrap();
        assert_eq!(id, RestockId::from_raw(1));
        assert!(state.restock(id).unwrap().is_arrived());
    }

    #[tokio::test]
    async fn lock_unmarked_warehouse_skips_marked_and_missing_rows() {
        let mut state = LedgerState::default();
        state.put_warehouse(WarehouseStock::new(P1, qty(2), None));
        state.put_warehouse(WarehouseStock::new(P2, qty(7), Some(RestockId::from_raw(9))));
        let ledger = InMemoryStockLedger::with_state(state);

        let mut tx = ledger.begin().await.unwrap();
        let unmarked = tx.lock_unmarked_warehouse(P1).await.unwrap().unwrap();
        assert_eq!(unmarked.quantity_available(), qty(2));
        assert!(tx.lock_unmarked_warehouse(P2).await.unwrap().is_none());
        assert!(tx.lock_unmarked_warehouse(ProductId::from_raw(3)).await.unwrap().is_none());
    }
}
