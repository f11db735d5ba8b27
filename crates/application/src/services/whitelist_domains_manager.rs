use crate::ports::WhitelistRepository;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};
use trackerblocker_domain::validators::normalize_domain;
use trackerblocker_domain::DomainError;

/// Owns the whitelisted domain set and publishes its sorted snapshot on every
/// change.
pub struct WhitelistDomainsManager {
    repository: Arc<dyn WhitelistRepository>,
    domains: Mutex<BTreeSet<String>>,
    updates: watch::Sender<Vec<String>>,
}

impl WhitelistDomainsManager {
    pub fn new(repository: Arc<dyn WhitelistRepository>, updates: watch::Sender<Vec<String>>) -> Self {
        Self {
            repository,
            domains: Mutex::new(BTreeSet::new()),
            updates,
        }
    }

    /// Load the persisted whitelist and publish it.
    pub async fn load(&self) -> Result<usize, DomainError> {
        let stored = self.repository.load().await?;
        let mut domains = self.domains.lock().await;
        *domains = stored
            .iter()
            .filter_map(|d| normalize_domain(d).ok())
            .collect();
        self.publish(&domains);
        info!(count = domains.len(), "Whitelist domains loaded");
        Ok(domains.len())
    }

    pub async fn get_all(&self) -> Vec<String> {
        self.domains.lock().await.iter().cloned().collect()
    }

    /// Add a domain. Returns `false` when it was already whitelisted.
    pub async fn add(&self, domain: &str) -> Result<bool, DomainError> {
        let domain = normalize_domain(domain).map_err(DomainError::InvalidDomainName)?;
        let mut domains = self.domains.lock().await;
        if domains.contains(&domain) {
            debug!(domain = %domain, "Domain already whitelisted");
            return Ok(false);
        }
        info!(domain = %domain, "Whitelisting domain");
        let mut updated = domains.clone();
        updated.insert(domain);
        self.persist_and_publish(&mut domains, updated).await?;
        Ok(true)
    }

    /// Remove a domain. Returns `false` when it was not whitelisted.
    pub async fn remove(&self, domain: &str) -> Result<bool, DomainError> {
        let domain = normalize_domain(domain).map_err(DomainError::InvalidDomainName)?;
        let mut domains = self.domains.lock().await;
        if !domains.contains(&domain) {
            debug!(domain = %domain, "Domain not whitelisted");
            return Ok(false);
        }
        info!(domain = %domain, "Removing domain from whitelist");
        let mut updated = domains.clone();
        updated.remove(&domain);
        self.persist_and_publish(&mut domains, updated).await?;
        Ok(true)
    }

    pub fn updates(&self) -> watch::Receiver<Vec<String>> {
        self.updates.subscribe()
    }

    /// Memory and the stream only change once `updated` is on disk.
    async fn persist_and_publish(
        &self,
        domains: &mut BTreeSet<String>,
        updated: BTreeSet<String>,
    ) -> Result<(), DomainError> {
        let snapshot: Vec<String> = updated.iter().cloned().collect();
        self.repository.save(&snapshot).await?;
        *domains = updated;
        self.publish(domains);
        Ok(())
    }

    fn publish(&self, domains: &BTreeSet<String>) {
        self.updates
            .send_replace(domains.iter().cloned().collect());
    }
}
