use crate::fs::write_atomic;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use trackerblocker_application::ports::TdsFileCache;
use trackerblocker_domain::DomainError;

pub const TDS_CACHE_FILE_NAME: &str = "tds_cached.json";

/// Last-resort tracker data set: decodes to a document with no trackers.
pub const EMPTY_TDS: &str = r#"{"trackers":{},"entities":{},"domains":{},"cnames":{}}"#;

/// Keeps the latest downloaded tracker data set on disk.
///
/// Reads fall back to the bundled document, then to [`EMPTY_TDS`].
pub struct FileTdsCache {
    cache_file: PathBuf,
    bundled_path: Option<PathBuf>,
}

impl FileTdsCache {
    pub fn new(cache_dir: impl Into<PathBuf>, bundled_path: Option<PathBuf>) -> Self {
        Self {
            cache_file: cache_dir.into().join(TDS_CACHE_FILE_NAME),
            bundled_path,
        }
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    async fn load_bundled(&self) -> Bytes {
        if let Some(path) = &self.bundled_path {
            match tokio::fs::read(path).await {
                Ok(data) => {
                    debug!(path = %path.display(), "Loaded bundled tracker data");
                    return Bytes::from(data);
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Unable to read bundled tracker data");
                }
            }
        }
        warn!("No tracker data available, using empty document");
        Bytes::from_static(EMPTY_TDS.as_bytes())
    }
}

#[async_trait]
impl TdsFileCache for FileTdsCache {
    async fn save(&self, data: &Bytes, etag: &str) -> Result<(), DomainError> {
        write_atomic(&self.cache_file, data).await.map_err(|e| {
            error!(etag, error = %e, "Unable to store tracker data");
            DomainError::IoError(format!(
                "failed to store tracker data at {}: {e}",
                self.cache_file.display()
            ))
        })?;
        debug!(etag, path = %self.cache_file.display(), "Stored tracker data");
        Ok(())
    }

    async fn get_cached_data(&self) -> Bytes {
        match tokio::fs::read(&self.cache_file).await {
            Ok(data) => {
                debug!(path = %self.cache_file.display(), "Retrieved cached tracker data");
                Bytes::from(data)
            }
            Err(e) => {
                debug!(error = %e, "No cached tracker data, loading bundled copy");
                self.load_bundled().await
            }
        }
    }
}
