//! Graceful shutdown for the sidecar.
//!
//! The controller listens for SIGINT/SIGTERM and broadcasts through a
//! `tokio::sync::broadcast` channel. The scheduler holds a [`ShutdownSignal`],
//! which is either subscribed to a controller or never fires.

use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast;

/// Coordinates shutdown of the scheduler loop.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Get a receiver that will be notified on shutdown.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal::from_receiver(self.subscribe())
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// Wait for SIGTERM or SIGINT, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
            _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Optional cancellation for the scheduler's sleeps.
pub struct ShutdownSignal {
    rx: Option<broadcast::Receiver<()>>,
}

impl ShutdownSignal {
    /// A signal that never fires; the loop runs until the process exits.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn from_receiver(rx: broadcast::Receiver<()>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Sleep for `period`. Returns `true` if shutdown arrived first.
    ///
    /// A dropped controller counts as shutdown.
    pub async fn sleep(&mut self, period: Duration) -> bool {
        match self.rx.as_mut() {
            Some(rx) => tokio::select! {
                _ = tokio::time::sleep(period) => false,
                _ = rx.recv() => true,
            },
            None => {
                tokio::time::sleep(period).await;
                false
            }
        }
    }

    /// Wait until shutdown, forever if there is no controller.
    pub async fn wait(&mut self) {
        match self.rx.as_mut() {
            Some(rx) => {
                let _ = rx.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::never()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn programmatic_shutdown_notifies_subscribers() {
        let controller = ShutdownController::new();
        let mut rx = controller.subscribe();
        controller.shutdown();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn multiple_subscribers_all_notified() {
        let controller = ShutdownController::new();
        let mut rx1 = controller.subscribe();
        let mut rx2 = controller.subscribe();
        controller.shutdown();
        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn signal_interrupts_sleep() {
        let controller = ShutdownController::new();
        let mut signal = controller.signal();
        controller.shutdown();
        assert!(signal.sleep(Duration::from_secs(3600)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn never_signal_sleeps_full_period() {
        let mut signal = ShutdownSignal::never();
        let start = tokio::time::Instant::now();
        assert!(!signal.sleep(Duration::from_secs(30)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }
}
