use serde::{Deserialize, Serialize};

use stockroom_core::{ProductId, ShelfId};

/// Product reference data. Read-only for the stock services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
}

/// A shelf customers buy from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: ShelfId,
    pub name: String,
}
