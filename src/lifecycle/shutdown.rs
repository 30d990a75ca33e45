//! Shutdown coordination.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// The HTTP server and any background task subscribe; one `trigger` stops
/// them all. Clones share the same channel.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify every current subscriber.
    pub fn trigger(&self) {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::debug!(subscribers = notified, "Shutdown triggered");
    }

    /// Number of live subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
