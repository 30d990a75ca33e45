//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl+C) or, on Unix, SIGTERM
//! - Translate the first signal into a shutdown trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Config reload is driven by the file watcher, not SIGHUP

use crate::lifecycle::Shutdown;

/// Resolve when the process is asked to stop.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Trigger `shutdown` on the first termination signal.
pub fn spawn_signal_handler(shutdown: &Shutdown) {
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });
}
