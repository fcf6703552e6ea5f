//! Timer collection storage (JSON array under a single key)

use super::KeyValueStore;
use crate::{models::Timer, Error, Result};
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_STORAGE_KEY: &str = "timers";

#[derive(Clone)]
pub struct TimerStorage {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl TimerStorage {
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn with_default_key(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::new(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn load(&self) -> Result<Vec<Timer>> {
        let Some(content) = self.backend.get(&self.key)? else {
            return Ok(Vec::new());
        };

        // Handle empty slot case
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let timers: Vec<Timer> = serde_json::from_str(&content)?;
        check_collection(&timers)?;
        Ok(timers)
    }

    pub fn save(&self, timers: &[Timer]) -> Result<()> {
        let content = serde_json::to_string(timers)?;
        self.backend.set(&self.key, &content)
    }
}

fn check_collection(timers: &[Timer]) -> Result<()> {
    let mut seen = HashSet::new();
    for timer in timers {
        if !seen.insert(timer.id.as_str()) {
            return Err(Error::InvalidData(format!("Duplicate timer id '{}'", timer.id)));
        }
        if timer.remaining_time > timer.duration {
            return Err(Error::InvalidData(format!(
                "Timer '{}' has {}s remaining of a {}s duration",
                timer.id, timer.remaining_time, timer.duration
            )));
        }
    }
    Ok(())
}
