//! The scheduling loop.
//!
//! Each iteration drains the queue and then sleeps for the cycle interval.
//! An error escaping the drain step is logged and followed by a fixed
//! [`RECOVERY_DELAY`] before the next attempt. The loop never gives up; it
//! only ends when shutdown is signalled.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::Result;

/// Pause after a failed drain step.
pub const RECOVERY_DELAY: Duration = Duration::from_secs(60);

/// One drain step of the loop.
#[async_trait]
pub trait Drainer: Send + Sync {
    /// Processes all queued work, returning how many tasks were handled.
    async fn drain(&self) -> Result<usize>;
}

/// Source of delays, replaceable in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs drain/sleep cycles until `shutdown` turns true or its sender is
/// dropped.
pub async fn run_until<D, S>(
    drainer: &D,
    sleeper: &S,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    D: Drainer + ?Sized,
    S: Sleeper + ?Sized,
{
    info!(interval_secs = interval.as_secs(), "Scheduling loop started");
    let mut cycle: u64 = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }
        cycle += 1;

        let delay = match drainer.drain().await {
            Ok(processed) => {
                debug!(cycle, processed, "Cycle finished");
                interval
            }
            Err(e) => {
                error!(
                    cycle,
                    error = %e,
                    retry_in_secs = RECOVERY_DELAY.as_secs(),
                    "Scheduling cycle failed"
                );
                RECOVERY_DELAY
            }
        };

        tokio::select! {
            _ = sleeper.sleep(delay) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!(cycles = cycle, "Scheduling loop stopped");
}

/// Runs drain/sleep cycles forever.
pub async fn run_forever<D, S>(drainer: &D, sleeper: &S, interval: Duration)
where
    D: Drainer + ?Sized,
    S: Sleeper + ?Sized,
{
    let (_keep_open, shutdown) = watch::channel(false);
    run_until(drainer, sleeper, interval, shutdown).await;
}
