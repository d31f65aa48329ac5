//! The reconciliation schedule: retry until converged, then refresh.
//!
//! Two nested loops. The inner one re-runs an attempt every `retry_period`
//! until it reports success; the outer one then sleeps `refresh_period` and
//! starts over. There is no retry limit and no backoff growth.

use std::future::Future;
use std::time::Duration;

use peerlink_utils::format_duration;

use crate::config::SidecarConfig;
use crate::shutdown::ShutdownSignal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduler {
    pub refresh_period: Duration,
    pub retry_period: Duration,
}

impl Scheduler {
    pub fn new(refresh_period: Duration, retry_period: Duration) -> Self {
        Self {
            refresh_period,
            retry_period,
        }
    }

    pub fn from_config(config: &SidecarConfig) -> Self {
        Self::new(config.refresh_period, config.retry_period)
    }

    /// Run `attempt` until it succeeds.
    ///
    /// Returns the number of attempts made, or `None` if shutdown arrived
    /// while waiting to retry.
    pub async fn run_until_success<F, Fut>(
        &self,
        attempt: &mut F,
        shutdown: &mut ShutdownSignal,
    ) -> Option<u64>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            if attempt().await {
                return Some(attempts);
            }
            tracing::debug!(
                attempt = attempts,
                retry_in = %format_duration(self.retry_period),
                "peering not in place"
            );
            if shutdown.sleep(self.retry_period).await {
                return None;
            }
        }
    }

    /// Keep the peering reconciled until shutdown.
    ///
    /// With [`ShutdownSignal::never`] this only returns when the process
    /// exits.
    pub async fn run<F, Fut>(&self, mut attempt: F, mut shutdown: ShutdownSignal)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        tracing::info!(
            refresh = %format_duration(self.refresh_period),
            retry = %format_duration(self.retry_period),
            "starting reconciliation loop"
        );
        loop {
            let Some(attempts) = self.run_until_success(&mut attempt, &mut shutdown).await else {
                break;
            };
            tracing::debug!(attempts, "peering reconciled");
            if shutdown.sleep(self.refresh_period).await {
                break;
            }
        }
        tracing::info!("reconciliation loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown::ShutdownController;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    const REFRESH: Duration = Duration::from_secs(300);
    const RETRY: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn retries_at_constant_interval_until_success() {
        let scheduler = Scheduler::new(REFRESH, RETRY);
        let mut calls = 0;
        let mut attempt = || {
            calls += 1;
            let ok = calls == 4;
            async move { ok }
        };
        let start = Instant::now();

        let attempts = scheduler
            .run_until_success(&mut attempt, &mut ShutdownSignal::never())
            .await;

        assert_eq!(attempts, Some(4));
        assert_eq!(start.elapsed(), RETRY * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_retry_wait() {
        let scheduler = Scheduler::new(REFRESH, RETRY);
        let controller = ShutdownController::new();
        let mut signal = controller.signal();
        controller.shutdown();

        let attempts = scheduler
            .run_until_success(&mut || async { false }, &mut signal)
            .await;

        assert_eq!(attempts, None);
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_after_success() {
        let scheduler = Scheduler::new(REFRESH, RETRY);
        let controller = Arc::new(ShutdownController::new());
        let signal = controller.signal();
        let calls = Arc::new(AtomicU64::new(0));

        let counter = calls.clone();
        let stopper = controller.clone();
        let start = Instant::now();
        scheduler
            .run(
                move || {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    // Fail the first attempt, then succeed; stop during the
                    // third refresh wait.
                    if n == 3 {
                        stopper.shutdown();
                    }
                    async move { n != 1 }
                },
                signal,
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // One retry wait plus one full refresh wait before the third call.
        assert_eq!(start.elapsed(), RETRY + REFRESH);
    }
}
