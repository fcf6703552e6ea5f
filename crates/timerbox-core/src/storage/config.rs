//! Configuration storage, kept as the `config` slot of a [`FileStore`]

use super::{FileStore, KeyValueStore};
use crate::{models::Config, Result};
use std::path::PathBuf;

const CONFIG_KEY: &str = "config";

pub struct ConfigStorage {
    slot: FileStore,
}

impl ConfigStorage {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            slot: FileStore::new(config_dir),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.slot.path_for(CONFIG_KEY)
    }

    /// Read `config.json`. A missing or blank file is replaced by the defaults.
    pub fn load(&self) -> Result<Config> {
        match self.slot.get(CONFIG_KEY)? {
            Some(content) if !content.trim().is_empty() => {
                let config: Config = serde_json::from_str(&content)?;
                config.validate()?;
                Ok(config)
            }
            _ => {
                let config = Config::default();
                self.save(&config)?;
                Ok(config)
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;
        self.slot.set(CONFIG_KEY, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().to_path_buf());

        let config = storage.load().unwrap();
        assert_eq!(config, Config::default());
        assert!(storage.path().exists());
    }

    #[test]
    fn test_empty_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().to_path_buf());
        std::fs::write(storage.path(), "  \n").unwrap();

        assert_eq!(storage.load().unwrap(), Config::default());
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().to_path_buf());

        let mut config = Config::default();
        config.tick.interval_ms = 500;
        config.notifications.desktop = false;
        storage.save(&config).unwrap();

        assert_eq!(storage.load().unwrap(), config);
    }

    #[test]
    fn test_load_rejects_out_of_range_values() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().to_path_buf());

        let mut config = Config::default();
        config.tick.interval_ms = 0;
        storage.save(&config).unwrap();

        assert!(matches!(storage.load(), Err(crate::Error::Validation(_))));
    }
}
