//! Configuration manager

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use timerbox_core::{
    models::Config,
    storage::{init_config_dir, init_data_dir, ConfigStorage},
    Result as CoreResult,
};

/// Config manager error
#[derive(Debug, thiserror::Error)]
pub enum ConfigManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] timerbox_core::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigManagerError>;

/// Manages application configuration
pub struct ConfigManager {
    storage: ConfigStorage,
    config: Arc<RwLock<Config>>,
}

impl ConfigManager {
    /// Load from the platform config directory
    pub fn new() -> CoreResult<Self> {
        let config_dir = init_config_dir()?;
        Self::with_dir(config_dir)
    }

    pub fn with_dir(config_dir: PathBuf) -> CoreResult<Self> {
        let storage = ConfigStorage::new(config_dir);

        // Load or create default config
        let config = storage.load()?;

        Ok(Self {
            storage,
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub async fn get(&self) -> Config {
        self.config.read().await.clone()
    }

    pub async fn update(&self, config: Config) -> Result<Config> {
        // Validate config
        config
            .validate()
            .map_err(|e| ConfigManagerError::Invalid(e.to_string()))?;

        // Save to storage
        self.storage.save(&config)?;

        // Update in-memory config
        {
            let mut current = self.config.write().await;
            *current = config.clone();
        }

        Ok(config)
    }

    pub async fn set_tick_interval(&self, interval_ms: u64) -> Result<Config> {
        let mut config = self.get().await;
        config.tick.interval_ms = interval_ms;
        self.update(config).await
    }

    pub async fn update_notifications(
        &self,
        desktop: Option<bool>,
        bell: Option<bool>,
    ) -> Result<Config> {
        let mut config = self.get().await;

        if let Some(desktop) = desktop {
            config.notifications.desktop = desktop;
        }

        if let Some(bell) = bell {
            config.notifications.bell = bell;
        }

        self.update(config).await
    }

    pub async fn update_storage(
        &self,
        key: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Config> {
        let mut config = self.get().await;

        if let Some(key) = key {
            config.storage.key = key;
        }

        if let Some(dir) = data_dir {
            config.storage.data_dir = Some(dir);
        }

        self.update(config).await
    }

    /// Directory timers are stored in, created if missing
    pub async fn data_dir(&self) -> Result<PathBuf> {
        let config = self.get().await;
        match config.storage.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir).map_err(timerbox_core::Error::from)?;
                Ok(dir)
            }
            None => Ok(init_data_dir()?),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.storage.path()
    }
}
