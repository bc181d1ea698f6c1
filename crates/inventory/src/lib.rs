//! Inventory domain: warehouse stock, shelf catalog entries and the transfer
//! rule that moves quantity between them.
//!
//! This crate contains business rules only (no IO, no HTTP, no storage). The
//! ledger in `stockroom-infra` loads rows under lock, mutates them through the
//! methods here, and writes them back inside the same transaction.

pub mod catalog;
pub mod reference;
pub mod transfer;
pub mod warehouse;

pub use catalog::{CatalogEntry, CatalogPricing, NewCatalogEntry};
pub use reference::{Product, Shelf};
pub use transfer::{apply_transfer, TransferOutcome, TransferRequest};
pub use warehouse::{ArrivedRestockSummary, WarehouseStock};
