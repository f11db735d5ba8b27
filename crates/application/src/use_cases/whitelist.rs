use crate::ports::WhitelistRepository;
use std::sync::Arc;
use tracing::info;
use trackerblocker_domain::validators::normalize_domain;
use trackerblocker_domain::DomainError;

/// Offline whitelist edits, used by the CLI when the service is not running.
pub struct AddWhitelistDomainUseCase {
    repository: Arc<dyn WhitelistRepository>,
}

impl AddWhitelistDomainUseCase {
    pub fn new(repository: Arc<dyn WhitelistRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, domain: &str) -> Result<bool, DomainError> {
        let domain = normalize_domain(domain).map_err(DomainError::InvalidDomainName)?;
        let mut domains = self.repository.load().await?;
        if domains.contains(&domain) {
            return Ok(false);
        }
        domains.push(domain.clone());
        domains.sort();
        self.repository.save(&domains).await?;
        info!(domain = %domain, "Domain whitelisted");
        Ok(true)
    }
}

pub struct RemoveWhitelistDomainUseCase {
    repository: Arc<dyn WhitelistRepository>,
}

impl RemoveWhitelistDomainUseCase {
    pub fn new(repository: Arc<dyn WhitelistRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, domain: &str) -> Result<bool, DomainError> {
        let domain = normalize_domain(domain).map_err(DomainError::InvalidDomainName)?;
        let mut domains = self.repository.load().await?;
        let before = domains.len();
        domains.retain(|d| d != &domain);
        if domains.len() == before {
            return Ok(false);
        }
        self.repository.save(&domains).await?;
        info!(domain = %domain, "Domain removed from whitelist");
        Ok(true)
    }
}

pub struct ListWhitelistDomainsUseCase {
    repository: Arc<dyn WhitelistRepository>,
}

impl ListWhitelistDomainsUseCase {
    pub fn new(repository: Arc<dyn WhitelistRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<Vec<String>, DomainError> {
        let mut domains = self.repository.load().await?;
        domains.sort();
        domains.dedup();
        Ok(domains)
    }
}
