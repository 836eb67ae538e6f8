//! Named application settings
//!
//! Settings are string key/value pairs behind the [`SettingsStore`] trait so
//! callers can inject whichever backing they need. Writes are buffered until
//! the caller flushes.

use crate::config::ConfigStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Read and write named settings.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    /// Persist pending changes.
    fn flush(&mut self) -> Result<()>;
}

/// Settings held only in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Settings persisted to a TOML, JSON or YAML file.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
    dirty: bool,
    store: ConfigStore,
}

impl FileSettings {
    /// Load settings from `path`. A missing file starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = ConfigStore::new();
        let values = if path.exists() {
            store.load(&path)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            values,
            dirty: false,
            store,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are changes not yet flushed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            self.dirty = true;
        }
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.store.save(&self.path, &self.values)?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// Where a hosted service lives and how it is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInfo {
    pub base_address: Option<String>,
    pub port: String,
    pub path: String,
    pub version: String,
    pub namespace: Option<String>,
    /// Endpoint name
    pub interface: Option<String>,
    /// Implementing type
    pub comply_type: Option<String>,
    /// Library file containing the implementation
    pub service_file: Option<String>,
    /// Whether responses are gzip-compressed
    pub compress: bool,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            base_address: None,
            port: "80".into(),
            path: String::new(),
            version: String::new(),
            namespace: None,
            interface: None,
            comply_type: None,
            service_file: None,
            compress: false,
        }
    }
}
