use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Money, OrderId, ProductId, Quantity, StockError, StockResult, UserId};

/// Order status lifecycle. Orders are placed in `Created`; later transitions
/// (shipping, cancellation) belong to other parts of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
        }
    }

    pub fn parse(s: &str) -> StockResult<Self> {
        match s {
            "CREATED" => Ok(OrderStatus::Created),
            other => Err(StockError::internal(format!("unknown order status '{other}'"))),
        }
    }
}

/// One requested line: product and a strictly positive quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Validated order request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    user_id: UserId,
    items: Vec<OrderItem>,
}

impl OrderRequest {
    /// Fails with `Validation` if `items` is empty or any quantity is not positive.
    pub fn new(user_id: UserId, items: Vec<(ProductId, i64)>) -> StockResult<Self> {
        if items.is_empty() {
            return Err(StockError::validation("order must contain at least one item"));
        }

        let mut validated = Vec::with_capacity(items.len());
        for (idx, (product_id, quantity)) in items.into_iter().enumerate() {
            let quantity = Quantity::positive(quantity).map_err(|_| {
                StockError::validation(format!(
                    "item {idx} (product {product_id}): quantity must be a positive integer"
                ))
            })?;
            validated.push(OrderItem {
                product_id,
                quantity,
            });
        }

        Ok(Self {
            user_id,
            items: validated,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Items in input order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }
}

/// A line priced from the catalog snapshot taken under lock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
}

impl PricedLine {
    pub fn price(product_id: ProductId, quantity: Quantity, unit_price: Money) -> StockResult<Self> {
        let line_total = unit_price.checked_mul(quantity).ok_or_else(|| {
            StockError::validation(format!("line total overflow for product {product_id}"))
        })?;
        Ok(Self {
            product_id,
            quantity,
            unit_price,
            line_total,
        })
    }
}

/// Lines accumulated while the order transaction is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    user_id: UserId,
    lines: Vec<PricedLine>,
    total: Money,
}

impl OrderDraft {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            lines: Vec::new(),
            total: Money::ZERO,
        }
    }

    pub fn push(&mut self, line: PricedLine) -> StockResult<()> {
        self.total = self
            .total
            .checked_add(line.line_total)
            .ok_or_else(|| StockError::validation("order total overflow"))?;
        self.lines.push(line);
        Ok(())
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    pub fn into_new_order(self, placed_at: DateTime<Utc>) -> NewOrder {
        NewOrder {
            user_id: self.user_id,
            placed_at,
            status: OrderStatus::Created,
            total: self.total,
            lines: self.lines,
        }
    }
}

/// Order about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Money,
    pub lines: Vec<PricedLine>,
}

/// Persisted order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Persisted order with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Money,
    pub lines: Vec<OrderLine>,
}
