use async_trait::async_trait;
use bytes::Bytes;
use trackerblocker_domain::DomainError;

#[async_trait]
pub trait TdsFileCache: Send + Sync {
    /// Persist a freshly downloaded document.
    async fn save(&self, data: &Bytes, etag: &str) -> Result<(), DomainError>;

    /// Latest cached document, or the bundled default when nothing was cached.
    async fn get_cached_data(&self) -> Bytes;
}
