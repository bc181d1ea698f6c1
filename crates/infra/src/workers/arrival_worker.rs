use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::services::RestockService;

/// Handle to stop and join the arrival worker.
#[derive(Debug)]
pub struct ArrivalWorkerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ArrivalWorkerHandle {
    /// Request graceful shutdown and wait for the current tick to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            if let Err(err) = join.await {
                warn!(error = %err, "arrival worker task ended abnormally");
            }
        }
    }
}

/// Periodic arrival driver.
///
/// Each tick drains the scheduler's due restocks, then runs the overdue
/// sweep. The sweep is what picks up restocks scheduled before a restart.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalWorker {
    interval: Duration,
}

impl ArrivalWorker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(self, name: &'static str, restocks: Arc<RestockService>) -> ArrivalWorkerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(worker_loop(name, self.interval, restocks, shutdown_rx));

        ArrivalWorkerHandle {
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }
}

async fn worker_loop(
    name: &'static str,
    interval: Duration,
    restocks: Arc<RestockService>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(worker = name, interval_ms = interval.as_millis() as u64, "arrival worker started");

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {
                let scheduled = restocks.run_due_arrivals().await;
                match restocks.process_pending_arrivals().await {
                    Ok(swept) if scheduled + swept > 0 => {
                        info!(worker = name, scheduled, swept, "arrivals applied");
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(worker = name, error = %err, "arrival sweep failed");
                    }
                }
            }
        }
    }

    info!(worker = name, "arrival worker stopped");
}
