use async_trait::async_trait;
use trackerblocker_domain::{CompiledRuleList, DomainError};

/// Compiles, registers and resolves rule lists by identifier.
///
/// The compiler is opaque to the application: it receives a ruleset document
/// and returns a handle, or `None` when it rejected the document.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn look_up(&self, identifier: &str) -> Result<Option<CompiledRuleList>, DomainError>;

    async fn compile(
        &self,
        identifier: &str,
        encoded_rules: &str,
    ) -> Result<Option<CompiledRuleList>, DomainError>;

    async fn remove(&self, identifier: &str) -> Result<(), DomainError>;
}
