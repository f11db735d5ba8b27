use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use trackerblocker_application::services::RuleListManager;

/// Periodically asks the rule list manager to look for newer tracker data.
///
/// The first tick is skipped: `on_init()` already performs a download.
pub struct TdsRefreshJob {
    manager: Arc<RuleListManager>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl TdsRefreshJob {
    pub fn new(manager: Arc<RuleListManager>) -> Self {
        Self {
            manager,
            interval_secs: 86400,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.interval_secs,
            "Starting tracker data refresh job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("TdsRefreshJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        info!("TdsRefreshJob: checking for new tracker data");
                        if self.manager.refresh_tracker_data().await {
                            info!("TdsRefreshJob: new tracker data accepted");
                        } else {
                            debug!("TdsRefreshJob: tracker data unchanged");
                        }
                    }
                }
            }
        });
    }
}
