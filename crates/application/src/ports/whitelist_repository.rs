use async_trait::async_trait;
use trackerblocker_domain::DomainError;

#[async_trait]
pub trait WhitelistRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<String>, DomainError>;

    async fn save(&self, domains: &[String]) -> Result<(), DomainError>;
}
