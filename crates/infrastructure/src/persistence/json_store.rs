use crate::fs::write_atomic_sync;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use trackerblocker_application::ports::KeyValueStore;
use trackerblocker_domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum StoredValue {
    String(String),
    /// Base64 encoded.
    Bytes(String),
}

/// Key/value store backed by a single JSON file, rewritten on every change.
pub struct JsonKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, StoredValue>>,
}

impl JsonKeyValueStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Corrupt key/value file, starting empty");
                BTreeMap::new()
            }),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No key/value file yet");
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, key: &str, value: Option<StoredValue>) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| DomainError::Persistence("key/value store poisoned".to_string()))?;
        match value {
            Some(value) => entries.insert(key.to_string(), value),
            None => entries.remove(key),
        };

        let raw = serde_json::to_vec_pretty(&*entries)
            .map_err(|e| DomainError::Persistence(e.to_string()))?;
        write_atomic_sync(&self.path, &raw).map_err(|e| {
            DomainError::Persistence(format!("write {}: {}", self.path.display(), e))
        })
    }

    fn get(&self, key: &str) -> Option<StoredValue> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

impl KeyValueStore for JsonKeyValueStore {
    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            StoredValue::String(value) => Some(value),
            StoredValue::Bytes(_) => None,
        }
    }

    fn set_string(&self, key: &str, value: Option<&str>) -> Result<(), DomainError> {
        self.update(key, value.map(|v| StoredValue::String(v.to_string())))
    }

    fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        match self.get(key)? {
            StoredValue::Bytes(encoded) => STANDARD.decode(encoded).ok(),
            StoredValue::String(_) => None,
        }
    }

    fn set_bytes(&self, key: &str, value: Option<&[u8]>) -> Result<(), DomainError> {
        self.update(key, value.map(|v| StoredValue::Bytes(STANDARD.encode(v))))
    }
}
