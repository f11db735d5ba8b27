use std::collections::BTreeSet;

/// Difference between two whitelist snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhitelistDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl WhitelistDiff {
    /// `added = new − old`, `removed = old − new`, both sorted.
    pub fn between(old: &[String], new: &[String]) -> Self {
        let old: BTreeSet<&String> = old.iter().collect();
        let new: BTreeSet<&String> = new.iter().collect();
        Self {
            added: new.difference(&old).map(|d| (*d).clone()).collect(),
            removed: old.difference(&new).map(|d| (*d).clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
