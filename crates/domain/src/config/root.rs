use super::{ConfigError, LoggingConfig, RefreshConfig, StorageConfig, TdsConfig};
use crate::validators::validate_url;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "trackerblocker.toml";
const MIN_REFRESH_INTERVAL_SECS: u64 = 60;
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tds: TdsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values supplied on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub tds_url: Option<String>,
    pub data_dir: Option<String>,
    pub log_level: Option<String>,
    pub refresh_interval_secs: Option<u64>,
}

impl Config {
    /// Load configuration from `path`, or from `trackerblocker.toml` in the
    /// working directory when present, falling back to defaults.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(url) = overrides.tds_url {
            self.tds.url = url;
        }
        if let Some(dir) = overrides.data_dir {
            self.storage.data_dir = dir;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(secs) = overrides.refresh_interval_secs {
            self.refresh.interval_secs = secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url(&self.tds.url).map_err(ConfigError::Validation)?;

        if self.tds.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "tds.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.data_dir cannot be empty".to_string(),
            ));
        }
        if self.refresh.enabled && self.refresh.interval_secs < MIN_REFRESH_INTERVAL_SECS {
            return Err(ConfigError::Validation(format!(
                "refresh.interval_secs must be at least {MIN_REFRESH_INTERVAL_SECS}"
            )));
        }
        if !VALID_LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown logging.level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }
}
