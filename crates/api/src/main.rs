use std::sync::Arc;

use anyhow::Context;

use stockroom_api::app::{build_app, services::build_services};
use stockroom_infra::config::StockroomConfig;
use stockroom_infra::workers::ArrivalWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = StockroomConfig::from_env().context("invalid configuration")?;
    let services = Arc::new(
        build_services(&config)
            .await
            .context("failed to build services")?,
    );

    let worker = ArrivalWorker::new(config.sweep_interval)
        .spawn("arrival-worker", services.stock.restocks.clone());

    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr().context("listener has no local address")?,
        persistent = config.is_persistent(),
        arrival_delay_secs = config.arrival_delay.as_secs(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    worker.shutdown().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
