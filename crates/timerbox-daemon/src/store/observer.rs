//! Post-mutation hooks run by the timer store

use std::sync::Arc;

use timerbox_core::models::Timer;
use timerbox_core::storage::TimerStorage;

use crate::event_manager::EventManager;
use crate::timer::{TimerEvent, TimerEventType};

/// What a store operation just did
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    Added(Timer),
    Deleted { id: String, removed: bool },
    Toggled { id: String, is_running: bool },
    Ticked { completed: Vec<String> },
    Restarted { id: String },
    Edited { id: String },
    Cleared,
}

/// Invoked after every successful store transition with the full collection
pub trait StoreObserver: Send + Sync {
    fn on_change(&self, change: &StoreChange, timers: &[Timer]);
}

/// Writes the whole collection to storage. Failures are logged and dropped.
pub struct PersistObserver {
    storage: TimerStorage,
}

impl PersistObserver {
    pub fn new(storage: TimerStorage) -> Self {
        Self { storage }
    }
}

impl StoreObserver for PersistObserver {
    fn on_change(&self, _change: &StoreChange, timers: &[Timer]) {
        if let Err(e) = self.storage.save(timers) {
            tracing::error!(
                "Failed to persist {} timers under '{}': {}",
                timers.len(),
                self.storage.key(),
                e
            );
        }
    }
}

/// Republishes store changes as timer events
pub struct EventObserver {
    event_manager: Arc<EventManager>,
}

impl EventObserver {
    pub fn new(event_manager: Arc<EventManager>) -> Self {
        Self { event_manager }
    }

    fn emit(&self, event_type: TimerEventType, timer_id: &str) {
        self.event_manager
            .emit(TimerEvent::new(event_type, Some(timer_id.to_string())));
    }
}

impl StoreObserver for EventObserver {
    fn on_change(&self, change: &StoreChange, timers: &[Timer]) {
        match change {
            StoreChange::Added(timer) => self.emit(
                TimerEventType::Added {
                    title: timer.title.clone(),
                    duration: timer.duration,
                },
                &timer.id,
            ),
            StoreChange::Deleted { id, removed } => {
                if *removed {
                    self.emit(TimerEventType::Deleted, id);
                }
            }
            StoreChange::Toggled { id, is_running } => {
                let event_type = if *is_running {
                    TimerEventType::Started
                } else {
                    TimerEventType::Stopped
                };
                self.emit(event_type, id);
            }
            StoreChange::Ticked { completed } => {
                for timer in timers {
                    let just_completed = completed.contains(&timer.id);
                    if timer.is_counting_down() || just_completed {
                        self.event_manager
                            .emit(TimerEvent::tick(timer.id.clone(), timer.remaining_time));
                    }
                    if just_completed {
                        self.event_manager
                            .emit(TimerEvent::completed(timer.id.clone(), timer.title.clone()));
                    }
                }
            }
            StoreChange::Restarted { id } => self.emit(TimerEventType::Restarted, id),
            StoreChange::Edited { id } => {
                if let Some(timer) = timers.iter().find(|t| &t.id == id) {
                    self.emit(
                        TimerEventType::Edited {
                            duration: timer.duration,
                        },
                        id,
                    );
                }
            }
            StoreChange::Cleared => {
                self.event_manager
                    .emit(TimerEvent::new(TimerEventType::Cleared, None));
            }
        }
    }
}
