//! Snapshot scheduling outside the per-write path.
//!
//! Two independent tasks share [`Database::snapshot_now`]: a recurring timer
//! and a final flush once the server stops accepting requests.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::db::Database;

/// Snapshot the store every `every` until the runtime shuts down.
pub fn spawn_periodic_snapshots(db: Arc<Database>, every: Duration) -> JoinHandle<()> {
    let every = every.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let db = db.clone();
            match tokio::task::spawn_blocking(move || db.snapshot_now()).await {
                Ok(Ok(())) => tracing::debug!("Periodic snapshot written"),
                Ok(Err(e)) => tracing::error!("Periodic snapshot failed: {}", e),
                Err(e) => tracing::error!("Periodic snapshot task panicked: {}", e),
            }
        }
    })
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Final synchronous snapshot before the process exits.
pub fn flush_on_shutdown(db: &Database) -> crate::db::Result<()> {
    db.snapshot_now()?;
    if let Some(path) = db.snapshot_path() {
        tracing::info!("Final snapshot written to {}", path.display());
    }
    Ok(())
}
