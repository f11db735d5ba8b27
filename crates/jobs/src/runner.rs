use crate::TdsRefreshJob;
use std::sync::Arc;
use tracing::info;

/// Central orchestrator for all background jobs.
///
/// Use the builder pattern to register jobs, then call `.start()` once.
///
/// # Example
///
/// ```rust,ignore
/// JobRunner::new()
///     .with_tds_refresh(TdsRefreshJob::new(manager).with_interval(86400))
///     .start()
///     .await;
/// ```
pub struct JobRunner {
    tds_refresh: Option<TdsRefreshJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self { tds_refresh: None }
    }

    pub fn with_tds_refresh(mut self, job: TdsRefreshJob) -> Self {
        self.tds_refresh = Some(job);
        self
    }

    /// Start all registered background jobs.
    pub async fn start(self) {
        info!("Starting background job runner");

        if let Some(job) = self.tds_refresh {
            Arc::new(job).start().await;
        }

        info!("All background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
