//! Service wiring: picks the ledger backend from configuration.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;

use stockroom_core::{Clock, SystemClock};
use stockroom_infra::config::StockroomConfig;
use stockroom_infra::ledger::{InMemoryStockLedger, LedgerError, LedgerState, PostgresStockLedger, StockLedger};
use stockroom_infra::services::StockServices;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to apply schema: {0}")]
    Migrate(#[from] LedgerError),
}

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub stock: StockServices,
}

impl AppServices {
    pub fn new(ledger: Arc<dyn StockLedger>, clock: Arc<dyn Clock>, lead_time: chrono::Duration) -> Self {
        Self {
            stock: StockServices::new(ledger, clock, lead_time),
        }
    }
}

pub async fn build_services(config: &StockroomConfig) -> Result<AppServices, ServicesError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let ledger: Arc<dyn StockLedger> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            let ledger = PostgresStockLedger::new(pool);
            ledger.migrate().await?;
            info!("using PostgreSQL stock ledger");
            Arc::new(ledger)
        }
        None => {
            let state = if config.seed_demo_data {
                LedgerState::demo()
            } else {
                LedgerState::default()
            };
            info!(seeded = config.seed_demo_data, "using in-memory stock ledger");
            Arc::new(InMemoryStockLedger::with_state(state))
        }
    };

    Ok(AppServices::new(ledger, clock, config.lead_time()))
}
