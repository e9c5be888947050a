//! Storage providers for settings persistence.
//!
//! Each runtime surface persists settings differently; the
//! [`StorageProvider`] trait abstracts over them. The concrete providers
//! mirror the browser storage tiers the original surfaces used: a shared
//! config file (sync analog), a local file, and an in-memory map (session
//! analog). [`FallbackStorage`] chains them in preference order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::{PrismError, Result};

/// Key prefix applied to every persisted settings key.
pub const KEY_PREFIX: &str = "prismweave.";

/// Capability abstraction over a key/value settings store.
///
/// Values are stored as strings; callers are responsible for typed
/// encoding. Keys are namespaced with [`KEY_PREFIX`] by the settings
/// manager before they reach a provider.
pub trait StorageProvider {
    /// Read a value, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Write a value, replacing any existing one.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Remove a value if present.
    fn remove(&mut self, key: &str) -> Result<()>;
    /// All stored keys, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Volatile in-memory storage, the session-storage analog.
///
/// Used by tests and as the last resort in the fallback chain.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageProvider for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}

/// File-backed storage holding a single JSON object.
///
/// The default path is `prismweave/settings.json` under the platform
/// config directory. Reads tolerate a missing file; writes create parent
/// directories as needed.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage at an explicit file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Storage at the platform default location.
    pub fn default_location() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| PrismError::StorageError("no config directory on this platform".to_string()))?;
        Ok(Self::new(base.join("prismweave").join("settings.json")))
    }

    /// The file this storage reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| PrismError::StorageError(e.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(PrismError::from(e)),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, contents).map_err(PrismError::from)
    }
}

impl StorageProvider for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read_map()?.keys().cloned().collect())
    }
}

/// Ordered chain of providers, the sync → local → session fallback.
///
/// Reads return the first provider's value for the key; writes and
/// removals go to the first provider that accepts them, falling through
/// on error.
pub struct FallbackStorage {
    providers: Vec<Box<dyn StorageProvider>>,
}

impl FallbackStorage {
    /// Chain providers in preference order.
    pub fn new(providers: Vec<Box<dyn StorageProvider>>) -> Self {
        Self { providers }
    }
}

impl StorageProvider for FallbackStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        for provider in &self.providers {
            match provider.get(key) {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => continue,
                Err(_) => continue,
            }
        }
        Ok(None)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut last_err = None;
        for provider in &mut self.providers {
            match provider.set(key, value) {
                Ok(()) => return Ok(()),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| PrismError::StorageError("no storage provider accepted the write".to_string())))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        // remove everywhere so a lower tier cannot resurrect the key
        for provider in &mut self.providers {
            let _ = provider.remove(key);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut all = Vec::new();
        for provider in &self.providers {
            if let Ok(keys) = provider.keys() {
                for key in keys {
                    if !all.contains(&key) {
                        all.push(key);
                    }
                }
            }
        }
        Ok(all)
    }
}
