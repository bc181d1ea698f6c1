//! Infrastructure layer: the stock ledger (PostgreSQL and in-memory), the
//! transactional stock services, the arrival scheduler and its background
//! worker, and configuration loading.

pub mod config;
pub mod ledger;
pub mod scheduler;
pub mod services;
pub mod workers;

mod integration_tests;
