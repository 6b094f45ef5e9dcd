use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Elapsed-time clock of a live workout session.
///
/// Elapsed time is always the wall-clock distance from `started_at`. A
/// background ticker publishes it on a watch channel while the clock is
/// running; pausing only silences the ticker and resuming publishes the
/// current value at once. The ticker stops when the clock is stopped or
/// dropped.
#[derive(Debug)]
pub struct SessionClock {
    started_at: DateTime<Utc>,
    running: Arc<AtomicBool>,
    ticks: Arc<watch::Sender<i64>>,
    cancel: CancellationToken,
}

impl SessionClock {
    pub fn start(started_at: DateTime<Utc>) -> Self {
        Self::with_tick(started_at, DEFAULT_TICK)
    }

    /// Must be called from within a Tokio runtime.
    pub fn with_tick(started_at: DateTime<Utc>, tick: Duration) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();
        let (tx, _) = watch::channel(elapsed_since(started_at));
        let ticks = Arc::new(tx);

        let tx = ticks.clone();
        let task_running = running.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut ticker = interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if !task_running.load(Ordering::Relaxed) {
                            continue;
                        }
                        tx.send_replace(elapsed_since(started_at));
                    }
                }
            }

            tracing::debug!("session clock ticker stopped");
        });

        Self {
            started_at,
            running,
            ticks,
            cancel,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed_seconds(&self) -> i64 {
        elapsed_since(self.started_at)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed) && !self.cancel.is_cancelled()
    }

    pub fn pause(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        if !self.cancel.is_cancelled() {
            self.running.store(true, Ordering::Relaxed);
            self.ticks.send_replace(self.elapsed_seconds());
        }
    }

    /// Stop the ticker for good.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        self.cancel.cancel();
    }

    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.ticks.subscribe()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn elapsed_since(started_at: DateTime<Utc>) -> i64 {
    (Utc::now() - started_at).num_seconds().max(0)
}

/// `HH:MM:SS`; hours keep growing past 99.
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
