//! Stock ledger boundary.
//!
//! The ledger owns the persisted rows (warehouse stock, catalog entries,
//! restock orders, orders) and no behavior. Every service operation opens one
//! [`LedgerTx`], locks the rows it needs, mutates them through the domain
//! types, writes them back and commits.
//!
//! ## Transaction contract
//!
//! - `lock_*` methods take a row lock that is held until commit or rollback.
//!   A second transaction locking the same row waits, then sees the first
//!   transaction's committed state.
//! - `insert_*_if_absent` never fails on an existing row; callers follow up with
//!   the matching `lock_*` call so two concurrent creators converge on one row.
//! - Dropping a transaction without calling [`LedgerTx::commit`] rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use stockroom_core::{
    EmployeeId, OrderId, ProductId, RestockId, ShelfId, StockError, SupplierId,
};
use stockroom_inventory::{
    ArrivedRestockSummary, CatalogEntry, CatalogPricing, NewCatalogEntry, Product,
    WarehouseStock,
};
use stockroom_purchasing::{NewRestock, RestockOrder, RestockView};
use stockroom_sales::{NewOrder, Order};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryStockLedger, LedgerState};
pub use postgres::PostgresStockLedger;

/// Ledger storage failure.
///
/// These are infrastructure errors; services surface them as
/// [`StockError::Internal`].
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored row violates a domain invariant (e.g. negative quantity).
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<LedgerError> for StockError {
    fn from(err: LedgerError) -> Self {
        StockError::internal(err.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Factory for ledger transactions.
#[async_trait]
pub trait StockLedger: Send + Sync + 'static {
    async fn begin(&self) -> LedgerResult<Box<dyn LedgerTx>>;
}

/// One open ledger transaction.
#[async_trait]
pub trait LedgerTx: Send {
    // Reference data.
    async fn product(&mut self, product_id: ProductId) -> LedgerResult<Option<Product>>;
    async fn shelf_exists(&mut self, shelf_id: ShelfId) -> LedgerResult<bool>;
    async fn supplier_exists(&mut self, supplier_id: SupplierId) -> LedgerResult<bool>;
    async fn employee_exists(&mut self, employee_id: EmployeeId) -> LedgerResult<bool>;

    // Warehouse stock.
    async fn lock_warehouse(&mut self, product_id: ProductId) -> LedgerResult<Option<WarehouseStock>>;
    /// Locks the row only while it carries no restock marker; a missing or
    /// marked row yields `None` and takes no lock.
    async fn lock_unmarked_warehouse(&mut self, product_id: ProductId) -> LedgerResult<Option<WarehouseStock>>;
    /// Returns `true` when the row was inserted.
    async fn insert_warehouse_if_absent(&mut self, seed: &WarehouseStock) -> LedgerResult<bool>;
    async fn update_warehouse(&mut self, row: &WarehouseStock) -> LedgerResult<()>;
    async fn list_warehouse(&mut self) -> LedgerResult<Vec<WarehouseStock>>;

    // Catalog.
    async fn lock_catalog(
        &mut self,
        product_id: ProductId,
        shelf_id: ShelfId,
    ) -> LedgerResult<Option<CatalogEntry>>;
    /// Lock the entry a sale of `product_id` draws from: the best-stocked
    /// shelf, ties broken by the lowest shelf id.
    async fn lock_catalog_for_sale(&mut self, product_id: ProductId) -> LedgerResult<Option<CatalogEntry>>;
    /// Pricing of any existing entry for the product, used when a new shelf is stocked.
    async fn catalog_pricing_hint(&mut self, product_id: ProductId) -> LedgerResult<Option<CatalogPricing>>;
    async fn insert_catalog_if_absent(&mut self, seed: &NewCatalogEntry) -> LedgerResult<()>;
    async fn update_catalog(&mut self, entry: &CatalogEntry) -> LedgerResult<()>;

    // Orders.
    /// Insert the order and all its lines.
    async fn insert_order(&mut self, order: &NewOrder) -> LedgerResult<OrderId>;
    /// All orders with lines, newest first.
    async fn list_orders(&mut self) -> LedgerResult<Vec<Order>>;

    // Restocks.
    async fn insert_restock(&mut self, restock: &NewRestock) -> LedgerResult<RestockId>;
    async fn lock_restock(&mut self, restock_id: RestockId) -> LedgerResult<Option<RestockOrder>>;
    /// Persist the arrival fields (`arrived`, `actual_arrival_at`) of a locked restock.
    async fn update_restock_arrival(&mut self, restock: &RestockOrder) -> LedgerResult<()>;
    async fn restock_view(&mut self, restock_id: RestockId) -> LedgerResult<Option<RestockView>>;
    /// Denormalized restocks, newest first.
    async fn list_restocks(&mut self) -> LedgerResult<Vec<RestockView>>;
    /// Ids of ordered restocks eligible for the lazy sweep at `now`.
    async fn overdue_restocks(
        &mut self,
        now: DateTime<Utc>,
        lead_time: Duration,
    ) -> LedgerResult<Vec<RestockId>>;
    async fn arrived_summary(&mut self, product_id: ProductId) -> LedgerResult<Option<ArrivedRestockSummary>>;
    async fn arrived_summaries(&mut self) -> LedgerResult<Vec<ArrivedRestockSummary>>;

    async fn commit(self: Box<Self>) -> LedgerResult<()>;
}
