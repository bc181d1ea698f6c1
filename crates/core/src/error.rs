//! Stock error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the stock services.
pub type StockResult<T> = Result<T, StockError>;

/// Error taxonomy shared by every stock-affecting operation.
///
/// The first three variants are deterministic business failures; `Internal`
/// covers storage/infrastructure failures and is never produced by domain code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// Malformed or missing input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entity (product, shelf, restock, ...) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Business-rule conflict: not enough stock to satisfy the request.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// Unexpected storage or infrastructure failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn insufficient(product_id: ProductId, available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            product_id,
            available,
            requested,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code, used in HTTP error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            StockError::Validation(_) => "validation_error",
            StockError::NotFound(_) => "not_found",
            StockError::InsufficientStock { .. } => "insufficient_stock",
            StockError::Internal(_) => "internal_error",
        }
    }
}
