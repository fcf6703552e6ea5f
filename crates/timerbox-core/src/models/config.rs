//! Application configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    pub log_level: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tick: TickConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Key the timer collection is stored under
    pub key: String,
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    pub desktop: bool,
    pub bell: bool,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        self.storage.validate()?;
        self.tick.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            log_level: "info".to_string(),
            storage: StorageConfig::default(),
            tick: TickConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(Error::Validation("Storage key cannot be empty".to_string()));
        }

        if self.key.contains(['/', '\\']) {
            return Err(Error::Validation(format!(
                "Storage key '{}' cannot contain path separators",
                self.key
            )));
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: "timers".to_string(),
            data_dir: None,
        }
    }
}

impl TickConfig {
    pub fn validate(&self) -> Result<()> {
        const MAX_INTERVAL_MS: u64 = 60_000;

        if self.interval_ms == 0 {
            return Err(Error::Validation(
                "Tick interval must be greater than 0".to_string(),
            ));
        }

        if self.interval_ms > MAX_INTERVAL_MS {
            return Err(Error::Validation(format!(
                "Tick interval too long (max {} ms)",
                MAX_INTERVAL_MS
            )));
        }

        Ok(())
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            desktop: true,
            bell: true,
        }
    }
}
