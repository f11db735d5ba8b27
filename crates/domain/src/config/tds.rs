use serde::{Deserialize, Serialize};

/// Tracker data set download configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TdsConfig {
    /// URL of the tracker data set JSON document
    #[serde(default = "default_tds_url")]
    pub url: String,

    /// HTTP timeout for the download in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent sent with the download request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for TdsConfig {
    fn default() -> Self {
        Self {
            url: default_tds_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_tds_url() -> String {
    "https://staticcdn.duckduckgo.com/trackerblocking/v5/current/ios-tds.json".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "TrackerBlocker/0.3 (tds-sync)".to_string()
}
