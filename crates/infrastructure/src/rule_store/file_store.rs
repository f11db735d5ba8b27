use crate::fs::write_atomic;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use trackerblocker_application::ports::RuleStore;
use trackerblocker_domain::{CompiledRuleList, ContentBlockerRule, DomainError};

#[derive(Debug, Serialize, Deserialize)]
struct StoredRuleList {
    identifier: String,
    rule_count: usize,
    rules: String,
}

/// Rule store keeping one validated ruleset document per identifier.
///
/// Identifiers are arbitrary strings (base64 included), so entries are named
/// by the SHA-256 of the identifier.
pub struct FileRuleStore {
    dir: PathBuf,
}

impl FileRuleStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, identifier: &str) -> PathBuf {
        let digest = Sha256::digest(identifier.as_bytes());
        let name: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl RuleStore for FileRuleStore {
    async fn look_up(&self, identifier: &str) -> Result<Option<CompiledRuleList>, DomainError> {
        let path = self.entry_path(identifier);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DomainError::Lookup(format!("{}: {}", path.display(), e))),
        };

        let stored: StoredRuleList = serde_json::from_slice(&raw)
            .map_err(|e| DomainError::Lookup(format!("{}: {}", path.display(), e)))?;
        if stored.identifier != identifier {
            warn!(path = %path.display(), "Stored rule list belongs to another identifier");
            return Ok(None);
        }

        debug!(identifier, rules = stored.rule_count, "Rule list found");
        Ok(Some(CompiledRuleList::new(
            identifier,
            stored.rule_count,
            Arc::from(stored.rules),
        )))
    }

    async fn compile(
        &self,
        identifier: &str,
        encoded_rules: &str,
    ) -> Result<Option<CompiledRuleList>, DomainError> {
        let rules = ContentBlockerRule::decode_all(encoded_rules)
            .map_err(|e| DomainError::Compile(e.to_string()))?;

        let stored = StoredRuleList {
            identifier: identifier.to_string(),
            rule_count: rules.len(),
            rules: encoded_rules.to_string(),
        };
        let raw = serde_json::to_vec(&stored).map_err(|e| DomainError::Compile(e.to_string()))?;
        let path = self.entry_path(identifier);
        write_atomic(&path, &raw)
            .await
            .map_err(|e| DomainError::Compile(format!("{}: {}", path.display(), e)))?;

        info!(identifier, rules = stored.rule_count, "Rule list compiled");
        Ok(Some(CompiledRuleList::new(
            identifier,
            stored.rule_count,
            Arc::from(stored.rules),
        )))
    }

    async fn remove(&self, identifier: &str) -> Result<(), DomainError> {
        let path = self.entry_path(identifier);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(identifier, "Rule list removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Remove(format!("{}: {}", path.display(), e))),
        }
    }
}
