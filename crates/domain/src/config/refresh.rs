use serde::{Deserialize, Serialize};

/// Periodic tracker data refresh
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Run the background refresh job (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between download attempts (default: 86400)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    86400
}
