//! Configuration module for TrackerBlocker
//!
//! This module contains all configuration structures organized by concern:
//! - `root`: Main configuration and CLI overrides
//! - `tds`: Tracker data set download settings
//! - `storage`: On-disk locations for caches and persisted state
//! - `refresh`: Periodic tracker data refresh
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod logging;
pub mod refresh;
pub mod root;
pub mod storage;
pub mod tds;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use refresh::RefreshConfig;
pub use root::{CliOverrides, Config};
pub use storage::StorageConfig;
pub use tds::TdsConfig;
