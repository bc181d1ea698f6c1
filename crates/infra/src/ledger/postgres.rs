//! PostgreSQL stock ledger.
//!
//! Each [`LedgerTx`] wraps one `sqlx` transaction. Row locks are taken with
//! `SELECT ... FOR UPDATE`; creators use `INSERT ... ON CONFLICT DO NOTHING`
//! followed by a locking read so concurrent creators converge on one row.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Code | LedgerError |
//! |------------|-----------------|-------------|
//! | Database (unique violation) | `23505` | `Database` |
//! | Database (check violation) | `23514` | `Database` (a quantity would go negative) |
//! | Database (deadlock) | `40P01` | `Database` |
//! | Decode / column type | N/A | `Corrupt` |
//! | PoolClosed, network, other | N/A | `Database` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use stockroom_core::{
    CatalogEntryId, EmployeeId, Money, OrderId, ProductId, Quantity, RestockId, ShelfId,
    SupplierId, UserId,
};
use stockroom_inventory::{
    ArrivedRestockSummary, CatalogEntry, CatalogPricing, NewCatalogEntry, Product,
    WarehouseStock,
};
use stockroom_purchasing::{NewRestock, RestockOrder, RestockView};
use stockroom_sales::{NewOrder, Order, OrderLine, OrderStatus};

use super::{LedgerError, LedgerResult, LedgerTx, StockLedger};

const SCHEMA: &str = include_str!("../../migrations/0001_stock_ledger.sql");

/// Postgres-backed stock ledger.
#[derive(Debug, Clone)]
pub struct PostgresStockLedger {
    pool: Arc<PgPool>,
}

impl PostgresStockLedger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Apply the embedded schema. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> LedgerResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl StockLedger for PostgresStockLedger {
    async fn begin(&self) -> LedgerResult<Box<dyn LedgerTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PgTx { tx }))
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgTx {
    async fn product(&mut self, product_id: ProductId) -> LedgerResult<Option<Product>> {
        let row = sqlx::query("SELECT id, name, brand, category FROM products WHERE id = $1")
            .bind(product_id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("product", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Product {
            id: ProductId::from_raw(get(&row, "id")?),
            name: get(&row, "name")?,
            brand: get(&row, "brand")?,
            category: get(&row, "category")?,
        }))
    }

    async fn shelf_exists(&mut self, shelf_id: ShelfId) -> LedgerResult<bool> {
        exists(&mut self.tx, "SELECT 1 FROM shelves WHERE id = $1", shelf_id.get(), "shelf_exists").await
    }

    async fn supplier_exists(&mut self, supplier_id: SupplierId) -> LedgerResult<bool> {
        exists(&mut self.tx, "SELECT 1 FROM suppliers WHERE id = $1", supplier_id.get(), "supplier_exists").await
    }

    async fn employee_exists(&mut self, employee_id: EmployeeId) -> LedgerResult<bool> {
        exists(&mut self.tx, "SELECT 1 FROM employees WHERE id = $1", employee_id.get(), "employee_exists").await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn lock_warehouse(&mut self, product_id: ProductId) -> LedgerResult<Option<WarehouseStock>> {
        let row = sqlx::query(
            r#"
            SELECT product_id, quantity_available, last_restock_id
            FROM warehouse_stock
            WHERE product_id = $1
            FOR UPDATE
            "#,
        )
        .bind(product_id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_warehouse", e))?;

        row.as_ref().map(warehouse_from_row).transpose()
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn lock_unmarked_warehouse(&mut self, product_id: ProductId) -> LedgerResult<Option<WarehouseStock>> {
        let row = sqlx::query(
            r#"
            SELECT product_id, quantity_available, last_restock_id
            FROM warehouse_stock
            WHERE product_id = $1 AND last_restock_id IS NULL
            FOR UPDATE
            "#,
        )
        .bind(product_id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_unmarked_warehouse", e))?;

        row.as_ref().map(warehouse_from_row).transpose()
    }

    async fn insert_warehouse_if_absent(&mut self, seed: &WarehouseStock) -> LedgerResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO warehouse_stock (product_id, quantity_available, last_restock_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id) DO NOTHING
            "#,
        )
        .bind(seed.product_id().get())
        .bind(seed.quantity_available().get())
        .bind(seed.last_restock_id().map(|id| id.get()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_warehouse", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_warehouse(&mut self, row: &WarehouseStock) -> LedgerResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE warehouse_stock
            SET quantity_available = $2, last_restock_id = $3
            WHERE product_id = $1
            "#,
        )
        .bind(row.product_id().get())
        .bind(row.quantity_available().get())
        .bind(row.last_restock_id().map(|id| id.get()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update_warehouse", e))?;

        if result.rows_affected() != 1 {
            return Err(LedgerError::Corrupt(format!(
                "update of missing warehouse row for product {}",
                row.product_id()
            )));
        }
        Ok(())
    }

    async fn list_warehouse(&mut self) -> LedgerResult<Vec<WarehouseStock>> {
        let rows = sqlx::query(
            "SELECT product_id, quantity_available, last_restock_id FROM warehouse_stock ORDER BY product_id",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_warehouse", e))?;

        rows.iter().map(warehouse_from_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %product_id, shelf_id = %shelf_id))]
    async fn lock_catalog(
        &mut self,
        product_id: ProductId,
        shelf_id: ShelfId,
    ) -> LedgerResult<Option<CatalogEntry>> {
        let row = sqlx::query(
            r#"
            SELECT id, product_id, shelf_id, quantity_available, price_cents, old_price_cents
            FROM catalog_entries
            WHERE product_id = $1 AND shelf_id = $2
            FOR UPDATE
            "#,
        )
        .bind(product_id.get())
        .bind(shelf_id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_catalog", e))?;

        row.as_ref().map(catalog_from_row).transpose()
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn lock_catalog_for_sale(&mut self, product_id: ProductId) -> LedgerResult<Option<CatalogEntry>> {
        // A row lock waited on by `ORDER BY ... FOR UPDATE` is not re-ranked,
        // so sales of one product first queue on the product row.
        sqlx::query("SELECT id FROM products WHERE id = $1 FOR NO KEY UPDATE")
            .bind(product_id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("lock_product_for_sale", e))?;

        let row = sqlx::query(
            r#"
            SELECT id, product_id, shelf_id, quantity_available, price_cents, old_price_cents
            FROM catalog_entries
            WHERE product_id = $1
            ORDER BY quantity_available DESC, shelf_id ASC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(product_id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_catalog_for_sale", e))?;

        row.as_ref().map(catalog_from_row).transpose()
    }

    async fn catalog_pricing_hint(&mut self, product_id: ProductId) -> LedgerResult<Option<CatalogPricing>> {
        let row = sqlx::query(
            r#"
            SELECT price_cents, old_price_cents
            FROM catalog_entries
            WHERE product_id = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(product_id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("catalog_pricing_hint", e))?;

        row.as_ref().map(pricing_from_row).transpose()
    }

    async fn insert_catalog_if_absent(&mut self, seed: &NewCatalogEntry) -> LedgerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO catalog_entries (product_id, shelf_id, quantity_available, price_cents, old_price_cents)
            VALUES ($1, $2, 0, $3, $4)
            ON CONFLICT (product_id, shelf_id) DO NOTHING
            "#,
        )
        .bind(seed.product_id.get())
        .bind(seed.shelf_id.get())
        .bind(seed.pricing.price.cents())
        .bind(seed.pricing.old_price.map(|p| p.cents()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_catalog", e))?;
        Ok(())
    }

    async fn update_catalog(&mut self, entry: &CatalogEntry) -> LedgerResult<()> {
        let result = sqlx::query("UPDATE catalog_entries SET quantity_available = $2 WHERE id = $1")
            .bind(entry.id().get())
            .bind(entry.quantity_available().get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("update_catalog", e))?;

        if result.rows_affected() != 1 {
            return Err(LedgerError::Corrupt(format!(
                "update of missing catalog entry {}",
                entry.id()
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, order), fields(user_id = %order.user_id, lines = order.lines.len()))]
    async fn insert_order(&mut self, order: &NewOrder) -> LedgerResult<OrderId> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (user_id, placed_at, status, total_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(order.user_id.get())
        .bind(order.placed_at)
        .bind(order.status.as_str())
        .bind(order.total.cents())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;
        let order_id = OrderId::from_raw(get(&row, "id")?);

        for (line_no, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, line_no, product_id, quantity, unit_price_cents, line_total_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id.get())
            .bind(line_no as i32)
            .bind(line.product_id.get())
            .bind(line.quantity.get())
            .bind(line.unit_price.cents())
            .bind(line.line_total.cents())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order_line", e))?;
        }

        Ok(order_id)
    }

    async fn list_orders(&mut self) -> LedgerResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, placed_at, status, total_cents
            FROM orders
            ORDER BY placed_at DESC, id DESC
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let status: String = get(row, "status")?;
            orders.push(Order {
                id: OrderId::from_raw(get(row, "id")?),
                user_id: UserId::from_raw(get(row, "user_id")?),
                placed_at: get(row, "placed_at")?,
                status: OrderStatus::parse(&status).map_err(|e| LedgerError::Corrupt(e.to_string()))?,
                total: money(get(row, "total_cents")?)?,
                lines: Vec::new(),
            });
        }
        if orders.is_empty() {
            return Ok(orders);
        }

        let ids: Vec<i64> = orders.iter().map(|o| o.id.get()).collect();
        let line_rows = sqlx::query(
            r#"
            SELECT order_id, product_id, quantity, unit_price_cents, line_total_cents
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id, line_no
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_order_lines", e))?;

        for row in &line_rows {
            let line = OrderLine {
                order_id: OrderId::from_raw(get(row, "order_id")?),
                product_id: ProductId::from_raw(get(row, "product_id")?),
                quantity: quantity(get(row, "quantity")?)?,
                unit_price: money(get(row, "unit_price_cents")?)?,
                line_total: money(get(row, "line_total_cents")?)?,
            };
            if let Some(order) = orders.iter_mut().find(|o| o.id == line.order_id) {
                order.lines.push(line);
            }
        }

        Ok(orders)
    }

    #[instrument(skip(self, restock), fields(product_id = %restock.product_id, quantity = %restock.quantity_ordered))]
    async fn insert_restock(&mut self, restock: &NewRestock) -> LedgerResult<RestockId> {
        let row = sqlx::query(
            r#"
            INSERT INTO restock_orders
                (product_id, supplier_id, quantity_ordered, ordered_at, expected_arrival_at, responsible_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(restock.product_id.get())
        .bind(restock.supplier_id.get())
        .bind(restock.quantity_ordered.get())
        .bind(restock.ordered_at)
        .bind(restock.expected_arrival_at)
        .bind(restock.responsible_id.map(|id| id.get()))
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_restock", e))?;

        Ok(RestockId::from_raw(get(&row, "id")?))
    }

    #[instrument(skip(self), fields(restock_id = %restock_id))]
    async fn lock_restock(&mut self, restock_id: RestockId) -> LedgerResult<Option<RestockOrder>> {
        let row = sqlx::query(
            r#"
            SELECT id, product_id, supplier_id, quantity_ordered, ordered_at,
                   expected_arrival_at, actual_arrival_at, arrived, responsible_id
            FROM restock_orders
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(restock_id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_restock", e))?;

        row.as_ref().map(restock_from_row).transpose()
    }

    async fn update_restock_arrival(&mut self, restock: &RestockOrder) -> LedgerResult<()> {
        let result = sqlx::query(
            "UPDATE restock_orders SET arrived = $2, actual_arrival_at = $3 WHERE id = $1",
        )
        .bind(restock.id().get())
        .bind(restock.is_arrived())
        .bind(restock.actual_arrival_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update_restock_arrival", e))?;

        if result.rows_affected() != 1 {
            return Err(LedgerError::Corrupt(format!(
                "update of missing restock {}",
                restock.id()
            )));
        }
        Ok(())
    }

    async fn restock_view(&mut self, restock_id: RestockId) -> LedgerResult<Option<RestockView>> {
        let query = format!("{RESTOCK_VIEW_SELECT} WHERE r.id = $1");
        let row = sqlx::query(&query)
            .bind(restock_id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("restock_view", e))?;

        row.as_ref().map(restock_view_from_row).transpose()
    }

    async fn list_restocks(&mut self) -> LedgerResult<Vec<RestockView>> {
        let query = format!("{RESTOCK_VIEW_SELECT} ORDER BY r.ordered_at DESC, r.id DESC");
        let rows = sqlx::query(&query)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("list_restocks", e))?;

        rows.iter().map(restock_view_from_row).collect()
    }

    async fn overdue_restocks(
        &mut self,
        now: DateTime<Utc>,
        lead_time: Duration,
    ) -> LedgerResult<Vec<RestockId>> {
        let rows = sqlx::query(
            r#"
            SELECT id
            FROM restock_orders
            WHERE NOT arrived
              AND (expected_arrival_at IS NULL OR expected_arrival_at <= $1)
              AND ordered_at <= $2
            ORDER BY ordered_at, id
            "#,
        )
        .bind(now)
        .bind(now - lead_time)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("overdue_restocks", e))?;

        rows.iter()
            .map(|row| Ok(RestockId::from_raw(get(row, "id")?)))
            .collect()
    }

    async fn arrived_summary(&mut self, product_id: ProductId) -> LedgerResult<Option<ArrivedRestockSummary>> {
        let query = format!("{ARRIVED_SUMMARY_SELECT} AND product_id = $1 GROUP BY product_id");
        let row = sqlx::query(&query)
            .bind(product_id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("arrived_summary", e))?;

        row.as_ref().map(summary_from_row).transpose()
    }

    async fn arrived_summaries(&mut self) -> LedgerResult<Vec<ArrivedRestockSummary>> {
        let query = format!("{ARRIVED_SUMMARY_SELECT} GROUP BY product_id ORDER BY product_id");
        let rows = sqlx::query(&query)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("arrived_summaries", e))?;

        rows.iter().map(summary_from_row).collect()
    }

    async fn commit(self: Box<Self>) -> LedgerResult<()> {
        let PgTx { tx } = *self;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

const RESTOCK_VIEW_SELECT: &str = r#"
    SELECT r.id, r.product_id, r.supplier_id, r.quantity_ordered, r.ordered_at,
           r.expected_arrival_at, r.actual_arrival_at, r.arrived, r.responsible_id,
           p.name AS product_name, p.brand AS product_brand,
           s.name AS supplier_name, e.name AS responsible_name
    FROM restock_orders r
    JOIN products p ON p.id = r.product_id
    JOIN suppliers s ON s.id = r.supplier_id
    LEFT JOIN employees e ON e.id = r.responsible_id
"#;

// Latest arrival wins the marker; equal timestamps fall back to the higher id.
const ARRIVED_SUMMARY_SELECT: &str = r#"
    SELECT product_id,
           SUM(quantity_ordered)::BIGINT AS total_quantity,
           (ARRAY_AGG(id ORDER BY actual_arrival_at DESC NULLS LAST, id DESC))[1] AS latest_restock_id
    FROM restock_orders
    WHERE arrived
"#;

async fn exists(
    tx: &mut Transaction<'static, Postgres>,
    sql: &'static str,
    id: i64,
    operation: &'static str,
) -> LedgerResult<bool> {
    let row = sqlx::query(sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;
    Ok(row.is_some())
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> LedgerResult<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| LedgerError::Corrupt(format!("failed to read column {column}: {e}")))
}

fn quantity(raw: i64) -> LedgerResult<Quantity> {
    Quantity::new(raw).map_err(|e| LedgerError::Corrupt(e.to_string()))
}

fn money(raw: i64) -> LedgerResult<Money> {
    Money::from_cents(raw).map_err(|e| LedgerError::Corrupt(e.to_string()))
}

fn warehouse_from_row(row: &PgRow) -> LedgerResult<WarehouseStock> {
    let last: Option<i64> = get(row, "last_restock_id")?;
    Ok(WarehouseStock::new(
        ProductId::from_raw(get(row, "product_id")?),
        quantity(get(row, "quantity_available")?)?,
        last.map(RestockId::from_raw),
    ))
}

fn pricing_from_row(row: &PgRow) -> LedgerResult<CatalogPricing> {
    let old: Option<i64> = get(row, "old_price_cents")?;
    Ok(CatalogPricing {
        price: money(get(row, "price_cents")?)?,
        old_price: old.map(money).transpose()?,
    })
}

fn catalog_from_row(row: &PgRow) -> LedgerResult<CatalogEntry> {
    Ok(CatalogEntry::new(
        CatalogEntryId::from_raw(get(row, "id")?),
        ProductId::from_raw(get(row, "product_id")?),
        ShelfId::from_raw(get(row, "shelf_id")?),
        quantity(get(row, "quantity_available")?)?,
        pricing_from_row(row)?,
    ))
}

fn restock_from_row(row: &PgRow) -> LedgerResult<RestockOrder> {
    let id = RestockId::from_raw(get(row, "id")?);
    let responsible: Option<i64> = get(row, "responsible_id")?;
    let created = NewRestock {
        product_id: ProductId::from_raw(get(row, "product_id")?),
        supplier_id: SupplierId::from_raw(get(row, "supplier_id")?),
        quantity_ordered: quantity(get(row, "quantity_ordered")?)?,
        ordered_at: get(row, "ordered_at")?,
        expected_arrival_at: get(row, "expected_arrival_at")?,
        responsible_id: responsible.map(EmployeeId::from_raw),
    };
    RestockOrder::restore(id, created, get(row, "actual_arrival_at")?, get(row, "arrived")?)
        .map_err(|e| LedgerError::Corrupt(e.to_string()))
}

fn restock_view_from_row(row: &PgRow) -> LedgerResult<RestockView> {
    Ok(RestockView {
        restock: restock_from_row(row)?,
        product_name: get(row, "product_name")?,
        product_brand: get(row, "product_brand")?,
        supplier_name: get(row, "supplier_name")?,
        responsible_name: get(row, "responsible_name")?,
    })
}

fn summary_from_row(row: &PgRow) -> LedgerResult<ArrivedRestockSummary> {
    Ok(ArrivedRestockSummary {
        product_id: ProductId::from_raw(get(row, "product_id")?),
        total_quantity: quantity(get(row, "total_quantity")?)?,
        latest_restock_id: RestockId::from_raw(get(row, "latest_restock_id")?),
    })
}

/// Map SQLx errors to LedgerError.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> LedgerError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = match db_err.code() {
                Some(code) => match code.as_ref() {
                    "23505" => format!("unique violation: {}", db_err.message()),
                    "23514" => format!("check constraint violated: {}", db_err.message()),
                    "40P01" => format!("deadlock detected: {}", db_err.message()),
                    _ => db_err.message().to_string(),
                },
                None => db_err.message().to_string(),
            };
            LedgerError::Database { operation, message }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            LedgerError::Corrupt(format!("{operation}: {err}"))
        }
        sqlx::Error::PoolClosed => LedgerError::Database {
            operation,
            message: "connection pool closed".to_string(),
        },
        other => LedgerError::Database {
            operation,
            message: other.to_string(),
        },
    }
}
