use crate::ports::{KeyValueStore, RuleStore};
use crate::services::RuleListPersistence;
use std::sync::Arc;
use trackerblocker_domain::{DomainError, RuleListIdentifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleListStatus {
    pub etag: Option<String>,
    pub identifier: Option<RuleListIdentifier>,
    /// Whether the rule store still resolves `identifier`.
    pub compiled: bool,
    pub rule_count: Option<usize>,
}

pub struct GetRuleListStatusUseCase {
    persistence: RuleListPersistence,
    rule_store: Arc<dyn RuleStore>,
}

impl GetRuleListStatusUseCase {
    pub fn new(store: Arc<dyn KeyValueStore>, rule_store: Arc<dyn RuleStore>) -> Self {
        Self {
            persistence: RuleListPersistence::new(store),
            rule_store,
        }
    }

    pub async fn execute(&self) -> Result<RuleListStatus, DomainError> {
        let identifier = self.persistence.last_identifier();
        let compiled = match &identifier {
            Some(id) => self.rule_store.look_up(&id.value()).await?,
            None => None,
        };

        Ok(RuleListStatus {
            etag: self.persistence.last_etag(),
            identifier,
            compiled: compiled.is_some(),
            rule_count: compiled.map(|list| list.rule_count()),
        })
    }
}
