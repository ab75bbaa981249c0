//! Keepalive timer.
//!
//! ```text
//! PingTask ──(every interval)──→ outbound mpsc ──→ client loop ──→ socket
//! ```
//!
//! The task owns a sender for the client's outbound queue and nothing
//! else. Changing the interval means dropping the task and spawning a
//! new one; dropping aborts it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Shortest interval the timer accepts. Zero would panic in tokio.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A running keepalive timer.
#[derive(Debug)]
pub struct PingTask {
    interval: Duration,
    handle: JoinHandle<()>,
}

impl PingTask {
    /// Starts sending `line` to `outbound` every `interval`.
    ///
    /// The first ping goes out one full interval after spawning. The task
    /// ends by itself once the receiving side of `outbound` is dropped.
    pub fn spawn(
        outbound: mpsc::Sender<String>,
        line: impl Into<String>,
        interval: Duration,
    ) -> Self {
        let line = line.into();
        let interval = interval.max(MIN_INTERVAL);
        tracing::debug!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "keepalive started"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if outbound.send(line.clone()).await.is_err() {
                    tracing::debug!("outbound queue closed, keepalive stopping");
                    break;
                }
            }
        });

        Self { interval, handle }
    }

    /// The interval actually in use, after clamping.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PingTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
