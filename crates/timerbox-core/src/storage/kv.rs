//! Key-value backends the timer collection is persisted into

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// A durable string slot per key
pub trait KeyValueStore: Send + Sync {
    /// Read a key; `Ok(None)` when it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<key>.json` inside a directory
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        // Replaced atomically via a sibling temp file
        let path = self.path_for(key);
        let tmp_path = self.data_dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp_path, value)?;
        std::fs::rename(&tmp_path, &path)?;

        Ok(())
    }
}

/// Process-local store, used for tests and `--ephemeral` runs
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| Error::Storage(format!("Memory store poisoned: {}", e)))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| Error::Storage(format!("Memory store poisoned: {}", e)))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
