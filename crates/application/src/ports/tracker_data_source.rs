use async_trait::async_trait;
use bytes::Bytes;
use trackerblocker_domain::DomainError;

/// Result of a conditional tracker data download.
///
/// Both fields are `None` when the server answered "not modified" or the
/// response was not usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TdsDownload {
    pub data: Option<Bytes>,
    pub etag: Option<String>,
}

impl TdsDownload {
    pub fn not_modified() -> Self {
        Self::default()
    }
}

#[async_trait]
pub trait TrackerDataSource: Send + Sync {
    /// Download the latest tracker data set, sending `etag` as `If-None-Match`.
    async fn download_latest(&self, etag: Option<&str>) -> Result<TdsDownload, DomainError>;
}
