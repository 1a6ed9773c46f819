//! Periodic refresh driver.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::controller::RatesController;

/// Drives [`RatesController::refresh`] on a fixed period.
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Refresh once right away, then once per `period`.
    ///
    /// Every tick runs its refresh as a separate task, so a slow fetch does
    /// not delay the next tick and fetches may overlap. Cancelling stops
    /// future ticks; fetches already in flight still complete.
    pub fn spawn(controller: Arc<RatesController>, period: Duration) -> SchedulerHandle {
        let period = period.max(Duration::from_millis(1));
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_secs = period.as_secs_f64(), "Refresh scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("Scheduled refresh");
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            // Failures are logged by the controller and retried next tick.
                            let _ = controller.refresh().await;
                        });
                    }
                    changed = cancel_rx.changed() => {
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Refresh scheduler stopped");
        });

        SchedulerHandle { cancel_tx, task }
    }
}

/// Handle to a running scheduler. Dropping it also stops future ticks.
pub struct SchedulerHandle {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop scheduling refreshes.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Check if the scheduler loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the scheduler loop to exit.
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticRateSource;
    use ratewatch_common::RawRate;
    use ratewatch_engine::RateEngine;

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_refreshes_immediately_and_periodically() {
        let source = Arc::new(StaticRateSource::new("test"));
        for _ in 0..3 {
            source.push_rates(vec![RawRate::default()]);
        }
        let controller = Arc::new(RatesController::new(RateEngine::default(), source));

        let handle = RefreshScheduler::spawn(controller.clone(), Duration::from_millis(20));
        wait_for(|| controller.stats().successes >= 3).await;

        handle.cancel();
        handle.join().await.unwrap();
        assert!(controller.stats().attempts >= 3);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_schedule() {
        let source = Arc::new(StaticRateSource::new("test"));
        source.push_failure("down");
        source.push_rates(vec![RawRate::default()]);
        let controller = Arc::new(RatesController::new(RateEngine::default(), source));

        let handle = RefreshScheduler::spawn(controller.clone(), Duration::from_millis(10));
        wait_for(|| controller.stats().successes == 1).await;

        assert!(controller.stats().failures >= 1);
        assert!(!handle.is_finished());
        handle.cancel();
        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_loop() {
        let source = Arc::new(StaticRateSource::new("test"));
        let controller = Arc::new(RatesController::new(RateEngine::default(), source));

        let handle = RefreshScheduler::spawn(controller.clone(), Duration::from_millis(10));
        drop(handle);

        wait_for(|| Arc::strong_count(&controller) == 1).await;
    }
}
