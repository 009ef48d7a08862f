//! Periodic refresh scheduling.

use std::sync::Arc;
use std::time::Duration;

use lectern_upstream::Transport;
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::refresh::{RefreshOutcome, Refresher};

/// Default refresh interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// When refreshes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Time between refresh attempts.
    pub interval: Duration,
    /// Upper bound of a random delay added before each attempt.
    pub jitter: Duration,
}

impl RefreshPolicy {
    /// Fixed interval, no jitter.
    #[must_use]
    pub const fn every(interval: Duration) -> Self {
        Self {
            interval,
            jitter: Duration::ZERO,
        }
    }

    /// Sets the jitter bound.
    #[must_use]
    pub const fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Picks the delay before the next attempt, uniformly in `0..=jitter`.
    #[must_use]
    pub fn jitter_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return Duration::ZERO;
        }
        let max = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::thread_rng().gen_range(0..=max))
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::every(DEFAULT_INTERVAL)
    }
}

/// Drives a [`Refresher`] on a fixed timer.
///
/// The first refresh fires immediately. Each tick spawns its own cycle, so a
/// slow upstream never delays the timer; overlapping cycles are suppressed
/// by the refresher itself.
#[derive(Debug)]
pub struct Scheduler;

impl Scheduler {
    /// Starts the refresh loop on the current Tokio runtime.
    #[must_use]
    pub fn spawn<T>(refresher: Arc<Refresher<T>>, policy: RefreshPolicy) -> SchedulerHandle
    where
        T: Transport + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            info!(
                interval_secs = policy.interval.as_secs(),
                jitter_ms = u64::try_from(policy.jitter.as_millis()).unwrap_or(u64::MAX),
                "refresh scheduler started"
            );

            let mut ticker = tokio::time::interval(policy.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let refresher = Arc::clone(&refresher);
                        let delay = policy.jitter_delay();
                        tokio::spawn(async move {
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                            if matches!(refresher.refresh().await, RefreshOutcome::Skipped) {
                                debug!("tick skipped, previous refresh still running");
                            }
                        });
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("refresh scheduler stopped");
        });

        SchedulerHandle { shutdown_tx, task }
    }
}

/// Handle to a running scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops the timer and waits for the loop to exit.
    ///
    /// A refresh already in progress runs to completion in the background.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "refresh scheduler task failed");
        }
    }

    /// Returns true once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = RefreshPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(60));
        assert_eq!(policy.jitter_delay(), Duration::ZERO);
    }

    #[test]
    fn test_jitter_delay_bounded() {
        let policy = RefreshPolicy::every(Duration::from_secs(60)).with_jitter(Duration::from_secs(5));
        for _ in 0..100 {
            assert!(policy.jitter_delay() <= Duration::from_secs(5));
        }
    }
}
