use async_trait::async_trait;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use trackerblocker_application::ports::{TdsDownload, TrackerDataSource};
use trackerblocker_domain::config::TdsConfig;
use trackerblocker_domain::DomainError;

/// Conditional HTTP download of the tracker data set.
pub struct ReqwestTrackerDataSource {
    client: reqwest::Client,
    url: String,
}

impl ReqwestTrackerDataSource {
    pub fn new(config: &TdsConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Download(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TrackerDataSource for ReqwestTrackerDataSource {
    async fn download_latest(&self, etag: Option<&str>) -> Result<TdsDownload, DomainError> {
        let started = Instant::now();
        let mut request = self.client.get(&self.url);
        if let Some(etag) = etag {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Download(format!("fetch error for {}: {}", self.url, e)))?;

        match response.status() {
            StatusCode::OK => {
                let new_etag = response
                    .headers()
                    .get(ETAG)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let data = response.bytes().await.map_err(|e| {
                    DomainError::Download(format!("read error for {}: {}", self.url, e))
                })?;

                info!(
                    url = %self.url,
                    bytes = data.len(),
                    etag = new_etag.as_deref().unwrap_or("none"),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Tracker data set fetched"
                );
                if new_etag.is_none() {
                    warn!(url = %self.url, "Response carries no ETag, ignoring it");
                    return Ok(TdsDownload::not_modified());
                }
                Ok(TdsDownload {
                    data: Some(data),
                    etag: new_etag,
                })
            }
            StatusCode::NOT_MODIFIED => {
                debug!(url = %self.url, "Tracker data set not modified");
                Ok(TdsDownload::not_modified())
            }
            status => {
                warn!(url = %self.url, status = status.as_u16(), "Unexpected tracker data response");
                Ok(TdsDownload::not_modified())
            }
        }
    }
}
