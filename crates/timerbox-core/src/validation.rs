//! Timer form validation
//!
//! Front ends run user input through here before calling the store, which
//! trusts whatever it is given.

use crate::models::{NewTimer, Timer, TimerUpdate, MAX_DURATION_SECONDS, MAX_TITLE_LENGTH};
use crate::notify::{Notification, NotificationSink};
use thiserror::Error;

/// Raw form input, before the time components are combined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFormData {
    pub title: String,
    pub description: String,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Title must be less than 50 characters")]
    TitleTooLong,

    #[error("Time values cannot be negative")]
    NegativeTime,

    #[error("Minutes and seconds must be between 0 and 59")]
    ComponentOutOfRange,

    #[error("Please set a time greater than 0")]
    ZeroDuration,

    #[error("Timer cannot exceed 24 hours")]
    DurationTooLong,
}

impl TimerFormData {
    /// Prefill a form from an existing timer, splitting its duration
    pub fn from_timer(timer: &Timer) -> Self {
        let duration = i64::from(timer.duration);
        Self {
            title: timer.title.clone(),
            description: timer.description.clone(),
            hours: duration / 3600,
            minutes: (duration % 3600) / 60,
            seconds: duration % 60,
        }
    }

    /// Combined duration in seconds; saturates instead of overflowing
    pub fn total_seconds(&self) -> i64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    /// Build store input, validating first
    pub fn to_new_timer(&self) -> Result<NewTimer, ValidationError> {
        let duration = check_timer_form(self)?;
        Ok(NewTimer {
            title: self.title.clone(),
            description: self.description.clone(),
            duration,
        })
    }

    /// Build a full edit update, validating first
    pub fn to_update(&self) -> Result<TimerUpdate, ValidationError> {
        let duration = check_timer_form(self)?;
        Ok(TimerUpdate {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            duration: Some(duration),
        })
    }
}

/// Validate a form and return the total duration in seconds
pub fn check_timer_form(data: &TimerFormData) -> Result<u32, ValidationError> {
    if data.title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }

    if data.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }

    if data.hours < 0 || data.minutes < 0 || data.seconds < 0 {
        return Err(ValidationError::NegativeTime);
    }

    if data.minutes > 59 || data.seconds > 59 {
        return Err(ValidationError::ComponentOutOfRange);
    }

    let total = data.total_seconds();
    if total == 0 {
        return Err(ValidationError::ZeroDuration);
    }

    if total > i64::from(MAX_DURATION_SECONDS) {
        return Err(ValidationError::DurationTooLong);
    }

    u32::try_from(total).map_err(|_| ValidationError::DurationTooLong)
}

/// Validate a form, reporting the first violation to `sink`
pub fn validate_timer_form(data: &TimerFormData, sink: &dyn NotificationSink) -> bool {
    match check_timer_form(data) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Timer form rejected: {}", e);
            sink.notify(&Notification::error(e.to_string()));
            false
        }
    }
}
