use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// On-disk locations used by the adapters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for caches and persisted state (default: "./trackerblocker-data")
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Tracker data document used when nothing has been downloaded yet
    #[serde(default)]
    pub bundled_tds_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bundled_tds_path: None,
        }
    }
}

impl StorageConfig {
    pub fn tds_cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("TDSCache")
    }

    pub fn rule_store_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("ContentRuleLists")
    }

    pub fn persistence_file(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("defaults.json")
    }

    pub fn whitelist_file(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("whitelistDomains.txt")
    }
}

fn default_data_dir() -> String {
    "./trackerblocker-data".to_string()
}
