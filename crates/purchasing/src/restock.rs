use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{
    EmployeeId, ProductId, Quantity, RestockId, StockError, StockResult, SupplierId,
};

/// Restock lifecycle. `Arrived` is terminal; there is no cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestockStatus {
    Ordered,
    Arrived,
}

/// Validated input for a new restock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockRequest {
    pub product_id: ProductId,
    pub supplier_id: SupplierId,
    pub quantity: Quantity,
    pub expected_arrival_at: Option<DateTime<Utc>>,
    pub responsible_id: Option<EmployeeId>,
}

impl RestockRequest {
    pub fn new(
        product_id: ProductId,
        supplier_id: SupplierId,
        quantity: i64,
        expected_arrival_at: Option<DateTime<Utc>>,
        responsible_id: Option<EmployeeId>,
    ) -> StockResult<Self> {
        Ok(Self {
            product_id,
            supplier_id,
            quantity: Quantity::positive(quantity)?,
            expected_arrival_at,
            responsible_id,
        })
    }

    /// Stamp the request; a missing expected arrival defaults to `ordered_at + lead_time`.
    pub fn place(self, ordered_at: DateTime<Utc>, lead_time: Duration) -> NewRestock {
        NewRestock {
            product_id: self.product_id,
            supplier_id: self.supplier_id,
            quantity_ordered: self.quantity,
            ordered_at,
            expected_arrival_at: Some(self.expected_arrival_at.unwrap_or(ordered_at + lead_time)),
            responsible_id: self.responsible_id,
        }
    }
}

/// Restock about to be inserted (no id yet, not arrived).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRestock {
    pub product_id: ProductId,
    pub supplier_id: SupplierId,
    pub quantity_ordered: Quantity,
    pub ordered_at: DateTime<Utc>,
    pub expected_arrival_at: Option<DateTime<Utc>>,
    pub responsible_id: Option<EmployeeId>,
}

/// The one-time arrival transition, returned when it actually happens.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub restock_id: RestockId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub arrived_at: DateTime<Utc>,
}

/// A restock order row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockOrder {
    id: RestockId,
    product_id: ProductId,
    supplier_id: SupplierId,
    quantity_ordered: Quantity,
    ordered_at: DateTime<Utc>,
    expected_arrival_at: Option<DateTime<Utc>>,
    actual_arrival_at: Option<DateTime<Utc>>,
    arrived: bool,
    responsible_id: Option<EmployeeId>,
}

impl RestockOrder {
    /// Rebuild a row from storage. Rejects a non-positive ordered quantity.
    pub fn restore(
        id: RestockId,
        created: NewRestock,
        actual_arrival_at: Option<DateTime<Utc>>,
        arrived: bool,
    ) -> StockResult<Self> {
        if created.quantity_ordered.is_zero() {
            return Err(StockError::internal(format!(
                "restock {id} has a zero ordered quantity"
            )));
        }
        Ok(Self {
            id,
            product_id: created.product_id,
            supplier_id: created.supplier_id,
            quantity_ordered: created.quantity_ordered,
            ordered_at: created.ordered_at,
            expected_arrival_at: created.expected_arrival_at,
            actual_arrival_at,
            arrived,
            responsible_id: created.responsible_id,
        })
    }

    pub fn id(&self) -> RestockId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn quantity_ordered(&self) -> Quantity {
        self.quantity_ordered
    }

    pub fn ordered_at(&self) -> DateTime<Utc> {
        self.ordered_at
    }

    pub fn expected_arrival_at(&self) -> Option<DateTime<Utc>> {
        self.expected_arrival_at
    }

    pub fn actual_arrival_at(&self) -> Option<DateTime<Utc>> {
        self.actual_arrival_at
    }

    pub fn responsible_id(&self) -> Option<EmployeeId> {
        self.responsible_id
    }

    pub fn is_arrived(&self) -> bool {
        self.arrived
    }

    pub fn status(&self) -> RestockStatus {
        if self.arrived {
            RestockStatus::Arrived
        } else {
            RestockStatus::Ordered
        }
    }

    /// `Ordered` → `Arrived`. Returns `None` (and changes nothing) when the
    /// restock already arrived.
    pub fn mark_arrived(&mut self, at: DateTime<Utc>) -> Option<Arrival> {
        if self.arrived {
            return None;
        }
        self.arrived = true;
        self.actual_arrival_at = Some(at);
        Some(Arrival {
            restock_id: self.id,
            product_id: self.product_id,
            quantity: self.quantity_ordered,
            arrived_at: at,
        })
    }

    /// Sweep eligibility: still ordered, expected arrival passed (or unset), and
    /// placed at least `lead_time` ago.
    pub fn is_overdue(&self, now: DateTime<Utc>, lead_time: Duration) -> bool {
        if self.arrived {
            return false;
        }
        let expected_passed = self.expected_arrival_at.is_none_or(|at| at <= now);
        expected_passed && self.ordered_at <= now - lead_time
    }
}

/// Restock joined with display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockView {
    pub restock: RestockOrder,
    pub product_name: String,
    pub product_brand: String,
    pub supplier_name: String,
    pub responsible_name: Option<String>,
}
