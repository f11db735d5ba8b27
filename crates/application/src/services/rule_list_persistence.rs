use crate::ports::KeyValueStore;
use std::sync::Arc;
use tracing::warn;
use trackerblocker_domain::{DomainError, RuleListIdentifier};

pub const IDENTIFIER_KEY: &str = "LastRuleListIdentifier";
pub const ETAG_KEY: &str = "ETag";

/// Typed accessors for the state the rule list manager persists.
#[derive(Clone)]
pub struct RuleListPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl RuleListPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn last_etag(&self) -> Option<String> {
        self.store.get_string(ETAG_KEY)
    }

    pub fn set_last_etag(&self, etag: Option<&str>) -> Result<(), DomainError> {
        self.store.set_string(ETAG_KEY, etag)
    }

    /// Identifier of the last published rule list. An undecodable value reads
    /// as absent.
    pub fn last_identifier(&self) -> Option<RuleListIdentifier> {
        let bytes = self.store.get_bytes(IDENTIFIER_KEY)?;
        match RuleListIdentifier::from_json(&bytes) {
            Ok(identifier) => Some(identifier),
            Err(e) => {
                warn!(error = %e, "Ignoring undecodable persisted rule list identifier");
                None
            }
        }
    }

    pub fn set_last_identifier(
        &self,
        identifier: Option<&RuleListIdentifier>,
    ) -> Result<(), DomainError> {
        match identifier {
            Some(id) => {
                let encoded = id
                    .to_json()
                    .map_err(|e| DomainError::Encode(e.to_string()))?;
                self.store.set_bytes(IDENTIFIER_KEY, Some(&encoded))
            }
            None => self.store.set_bytes(IDENTIFIER_KEY, None),
        }
    }
}
