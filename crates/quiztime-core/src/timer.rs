//! Countdown heartbeat for timed sessions.
//!
//! A [`Ticker`] is a recurring timer registered for the lifetime of one
//! active session. Its background task is aborted when the ticker is dropped,
//! so a submitted or abandoned session never receives late ticks.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default heartbeat period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A recurring heartbeat backed by a tokio task.
pub struct Ticker {
    rx: mpsc::Receiver<()>,
    task: JoinHandle<()>,
}

impl Ticker {
    /// Start a heartbeat that fires every `period`, first after one period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            // A stalled consumer delays the countdown rather than receiving a burst.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        tracing::debug!(period_ms = period.as_millis() as u64, "ticker started");
        Self { rx, task }
    }

    /// A one-second heartbeat.
    pub fn every_second() -> Self {
        Self::start(TICK_PERIOD)
    }

    /// Wait for the next heartbeat. Returns `None` once the ticker has stopped.
    pub async fn next(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Cancel the heartbeat.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("ticker released");
    }
}
