//! Timer events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event emitted by the timer system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerEvent {
    pub event_type: TimerEventType,
    /// `None` for collection-wide events
    pub timer_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Types of timer events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEventType {
    /// Timer created
    Added { title: String, duration: u32 },
    /// Timer removed
    Deleted,
    /// Timer toggled on
    Started,
    /// Timer toggled off
    Stopped,
    /// Timer tick (periodic update)
    Tick { remaining_time: u32 },
    /// Countdown reached zero
    Completed { title: String },
    /// Timer reset to its full duration
    Restarted,
    /// Timer edited and re-armed
    Edited { duration: u32 },
    /// All timers removed
    Cleared,
}

impl TimerEvent {
    /// Create a new timer event
    pub fn new(event_type: TimerEventType, timer_id: Option<String>) -> Self {
        Self {
            event_type,
            timer_id,
            timestamp: Utc::now(),
        }
    }

    pub fn tick(timer_id: String, remaining_time: u32) -> Self {
        Self::new(TimerEventType::Tick { remaining_time }, Some(timer_id))
    }

    pub fn completed(timer_id: String, title: String) -> Self {
        Self::new(TimerEventType::Completed { title }, Some(timer_id))
    }
}
