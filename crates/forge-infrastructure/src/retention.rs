//! Background retention sweep: periodically deletes completed jobs
//! older than the configured retention window (SPEC_FULL §4.1b).

use std::sync::Arc;
use std::time::Duration;

use forge_domain::ports::JobStore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs `JobStore::delete_completed_before` once per `sweep_interval`
/// until `cancel_token` fires.
pub async fn run_retention_sweep(
    store: Arc<dyn JobStore>,
    retention_hours: u64,
    sweep_interval: Duration,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            () = tokio::time::sleep(sweep_interval) => {}
        }

        let cutoff = chrono::Utc::now() - chrono::Duration::hours(retention_hours as i64);
        match store.delete_completed_before(cutoff).await {
            Ok(deleted) if deleted > 0 => info!(deleted, "retention sweep removed completed jobs"),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "retention sweep failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SqliteJobStore;

    #[tokio::test]
    async fn sweep_stops_on_cancellation() {
        let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::connect("sqlite::memory:").await.unwrap());
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(run_retention_sweep(store, 24, Duration::from_millis(10), cancel_token.clone()));
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel_token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }
}
