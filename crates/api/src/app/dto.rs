use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use stockroom_core::{EmployeeId, ProductId, ShelfId, StockError, StockResult, SupplierId, UserId};
use stockroom_infra::services::PlacedOrder;
use stockroom_inventory::{CatalogEntry, TransferOutcome, TransferRequest, WarehouseStock};
use stockroom_purchasing::{RestockRequest, RestockView};
use stockroom_sales::{Order, OrderRequest};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    pub product_id: i64,
    pub quantity: i64,
    pub shelf_id: i64,
}

impl TransferBody {
    pub fn into_request(self) -> StockResult<TransferRequest> {
        TransferRequest::new(
            id::<ProductId>("productId", self.product_id)?,
            self.quantity,
            id::<ShelfId>("shelfId", self.shelf_id)?,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemBody {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    pub user_id: i64,
    #[serde(default)]
    pub items: Vec<OrderItemBody>,
}

impl CreateOrderBody {
    pub fn into_request(self) -> StockResult<OrderRequest> {
        let items = self
            .items
            .into_iter()
            .map(|item| Ok((id::<ProductId>("productId", item.product_id)?, item.quantity)))
            .collect::<StockResult<Vec<_>>>()?;
        OrderRequest::new(id::<UserId>("userId", self.user_id)?, items)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestockBody {
    pub product_id: i64,
    pub supplier_id: i64,
    pub quantity: i64,
    pub expected_arrival_at: Option<DateTime<Utc>>,
    pub responsible_id: Option<i64>,
}

impl CreateRestockBody {
    pub fn into_request(self) -> StockResult<RestockRequest> {
        RestockRequest::new(
            id::<ProductId>("productId", self.product_id)?,
            id::<SupplierId>("supplierId", self.supplier_id)?,
            self.quantity,
            self.expected_arrival_at,
            self.responsible_id
                .map(|raw| id::<EmployeeId>("responsibleId", raw))
                .transpose()?,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalBody {
    pub arrived_at: Option<DateTime<Utc>>,
}

/// Identifiers in request bodies must be positive.
fn id<T: From<i64>>(field: &str, raw: i64) -> StockResult<T> {
    if raw <= 0 {
        return Err(StockError::validation(format!(
            "{field} must be a positive integer (got {raw})"
        )));
    }
    Ok(T::from(raw))
}

// -------------------------
// Response mapping
// -------------------------

pub fn catalog_entry_json(entry: &CatalogEntry) -> Value {
    json!({
        "id": entry.id(),
        "productId": entry.product_id(),
        "shelfId": entry.shelf_id(),
        "quantityAvailable": entry.quantity_available(),
        "price": entry.price(),
        "oldPrice": entry.old_price(),
    })
}

pub fn transfer_json(outcome: &TransferOutcome) -> Value {
    json!({
        "productId": outcome.catalog_entry.product_id(),
        "shelfId": outcome.catalog_entry.shelf_id(),
        "transferred": outcome.transferred,
        "warehouseRemaining": outcome.warehouse_remaining,
        "catalogEntry": catalog_entry_json(&outcome.catalog_entry),
    })
}

pub fn warehouse_json(row: &WarehouseStock) -> Value {
    json!({
        "productId": row.product_id(),
        "quantityAvailable": row.quantity_available(),
        "lastRestockId": row.last_restock_id(),
    })
}

pub fn placed_order_json(order: &PlacedOrder) -> Value {
    json!({
        "orderId": order.order_id,
        "total": order.total,
        "lines": order.lines,
    })
}

pub fn order_json(order: &Order) -> Value {
    json!({
        "id": order.id,
        "userId": order.user_id,
        "placedAt": order.placed_at,
        "status": order.status,
        "total": order.total,
        "lines": order.lines.iter().map(|l| json!({
            "productId": l.product_id,
            "quantity": l.quantity,
            "unitPrice": l.unit_price,
            "lineTotal": l.line_total,
        })).collect::<Vec<_>>(),
    })
}

pub fn restock_json(view: &RestockView) -> Value {
    let r = &view.restock;
    json!({
        "id": r.id(),
        "productId": r.product_id(),
        "productName": view.product_name,
        "productBrand": view.product_brand,
        "supplierId": r.supplier_id(),
        "supplierName": view.supplier_name,
        "quantityOrdered": r.quantity_ordered(),
        "orderedAt": r.ordered_at(),
        "expectedArrivalAt": r.expected_arrival_at(),
        "actualArrivalAt": r.actual_arrival_at(),
        "arrived": r.is_arrived(),
        "status": r.status(),
        "responsibleId": r.responsible_id(),
        "responsibleName": view.responsible_name,
    })
}
