use std::sync::Arc;
use timerbox_core::notify::{Notification, NotificationSink};
use timerbox_core::storage::TimerStorage;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::store::TimerStore;

#[derive(Debug, thiserror::Error)]
pub enum TickDriverError {
    #[error("Tick task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, TickDriverError>;

/// Result of a single cadence pulse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PulseOutcome {
    /// Whether `TimerStore::tick` was called
    pub ticked: bool,
    /// Timers that reached zero on this pulse
    pub completed: Vec<String>,
    /// Whether any timer is still counting down afterwards
    pub still_running: bool,
}

/// Shared one-second cadence for every running timer.
///
/// Each pulse calls [`TimerStore::tick`] exactly once if at least one timer is
/// counting down, and raises one notification per timer that finished.
pub struct TickDriver {
    store: Arc<Mutex<TimerStore>>,
    notifier: Arc<dyn NotificationSink>,
    tick_interval: Duration,
    stop_when_idle: bool,
    source: Option<TimerStorage>,
}

impl TickDriver {
    pub fn new(store: Arc<Mutex<TimerStore>>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            notifier,
            tick_interval: Duration::from_secs(1),
            stop_when_idle: false,
            source: None,
        }
    }

    pub fn with_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Exit the loop once no timer is counting down
    pub fn stop_when_idle(mut self, stop_when_idle: bool) -> Self {
        self.stop_when_idle = stop_when_idle;
        self
    }

    /// Re-read `storage` before every pulse, so timers stopped, edited or
    /// deleted by another process are not ticked from a stale copy
    pub fn with_storage(mut self, storage: TimerStorage) -> Self {
        self.source = Some(storage);
        self
    }

    /// Run one cadence step
    pub async fn pulse(&self) -> PulseOutcome {
        let mut store = self.store.lock().await;

        if let Some(storage) = &self.source {
            store.reload(storage);
        }

        if !store.has_running() {
            return PulseOutcome::default();
        }

        let completed = store.tick();
        let titles: Vec<String> = completed
            .iter()
            .filter_map(|id| store.get(id).map(|timer| timer.title.clone()))
            .collect();
        let still_running = store.has_running();
        drop(store);

        for title in &titles {
            tracing::info!("Countdown completed: {}", title);
            self.notifier.notify(&Notification::timer_completed(title));
        }

        PulseOutcome {
            ticked: true,
            completed,
            still_running,
        }
    }

    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let start = Instant::now() + self.tick_interval;
        let mut tick_interval = interval_at(start, self.tick_interval);

        tracing::debug!("Tick loop started ({:?})", self.tick_interval);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Tick loop cancelled");
                    break;
                }
                _ = tick_interval.tick() => {}
            }

            let outcome = self.pulse().await;

            if self.stop_when_idle && !outcome.still_running {
                tracing::debug!("No running timers left, tick loop exiting");
                break;
            }
        }
    }

    /// Start the tick loop on the runtime
    pub fn spawn(self) -> TickHandle {
        let cancel = CancellationToken::new();
        let driver = Arc::new(self);
        let task = tokio::spawn(driver.run(cancel.clone()));

        TickHandle { cancel, task }
    }
}

/// Owns a running tick loop
pub struct TickHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TickHandle {
    /// Cancel the loop and wait for it. No tick happens after this returns.
    pub async fn stop(self) -> Result<()> {
        self.cancel.cancel();
        self.task.await?;
        Ok(())
    }

    /// Wait for the loop to exit on its own
    pub async fn join(self) -> Result<()> {
        self.task.await?;
        Ok(())
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
