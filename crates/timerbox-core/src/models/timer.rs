//! Countdown timer data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest duration a timer may be configured with (24 hours)
pub const MAX_DURATION_SECONDS: u32 = 86_400;

/// Longest title accepted by the form validator
pub const MAX_TITLE_LENGTH: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: u32,
    pub remaining_time: u32,
    pub is_running: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Completed,
}

/// Caller-supplied fields for a new timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimer {
    pub title: String,
    pub description: String,
    pub duration: u32,
}

/// Partial update applied by an edit; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u32>,
}

impl Timer {
    /// Create an idle timer armed with its full duration
    pub fn new(input: NewTimer) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            duration: input.duration,
            remaining_time: input.duration,
            is_running: false,
            created_at: now_millis(),
        }
    }

    pub fn status(&self) -> TimerStatus {
        if self.remaining_time == 0 {
            TimerStatus::Completed
        } else if self.is_running {
            TimerStatus::Running
        } else {
            TimerStatus::Idle
        }
    }

    /// True when the next tick would decrement this timer.
    ///
    /// A completed timer that was toggled on reports `is_running` but is not
    /// counting down.
    pub fn is_counting_down(&self) -> bool {
        self.is_running && self.remaining_time > 0
    }

    pub fn is_completed(&self) -> bool {
        self.remaining_time == 0
    }

    /// Flip the running flag without looking at the remaining time
    pub fn toggle(&mut self) {
        self.is_running = !self.is_running;
    }

    /// Advance by one second. Returns true if this tick finished the timer.
    pub fn tick(&mut self) -> bool {
        if !self.is_counting_down() {
            return false;
        }

        self.remaining_time -= 1;
        self.is_running = self.remaining_time > 0;
        self.remaining_time == 0
    }

    pub fn restart(&mut self) {
        self.remaining_time = self.duration;
        self.is_running = false;
    }

    /// Apply an update, then stop and re-arm with the (possibly new) duration
    pub fn apply_update(&mut self, update: TimerUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }

        if let Some(description) = update.description {
            self.description = description;
        }

        if let Some(duration) = update.duration {
            self.duration = duration;
        }

        self.remaining_time = update.duration.unwrap_or(self.duration);
        self.is_running = false;
    }

    /// Fraction of the duration already elapsed, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.duration == 0 {
            return 1.0;
        }
        let elapsed = self.duration.saturating_sub(self.remaining_time);
        f64::from(elapsed) / f64::from(self.duration)
    }
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "Idle",
            TimerStatus::Running => "Running",
            TimerStatus::Completed => "Completed",
        }
    }
}

/// Current time truncated to the millisecond precision timers are stored with
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Render seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
