use crate::fs::write_atomic;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;
use trackerblocker_application::ports::WhitelistRepository;
use trackerblocker_domain::DomainError;

/// One domain per line. Blank lines and `#` comments are ignored.
pub struct FileWhitelistRepository {
    path: PathBuf,
}

impl FileWhitelistRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WhitelistRepository for FileWhitelistRepository {
    async fn load(&self) -> Result<Vec<String>, DomainError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No whitelist file yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(DomainError::IoError(format!(
                    "Failed to read whitelist: {}",
                    e
                )))
            }
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect())
    }

    async fn save(&self, domains: &[String]) -> Result<(), DomainError> {
        let mut content = domains.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        write_atomic(&self.path, content.as_bytes())
            .await
            .map_err(|e| DomainError::IoError(format!("Failed to write whitelist: {}", e)))
    }
}
