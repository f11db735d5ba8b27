//! Tracker Data Set (TDS) model.
//!
//! Maps are ordered so that everything derived from a decoded document
//! (rule order, encoded ruleset) is deterministic.

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerData {
    #[serde(default)]
    pub trackers: BTreeMap<String, KnownTracker>,
    #[serde(default)]
    pub entities: BTreeMap<String, Entity>,
    /// Domain → owning entity name.
    #[serde(default)]
    pub domains: BTreeMap<String, String>,
    #[serde(default)]
    pub cnames: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerAction {
    Block,
    Ignore,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerOwner {
    pub name: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownTracker {
    pub domain: Option<String>,
    pub owner: Option<TrackerOwner>,
    pub prevalence: Option<f64>,
    pub fingerprinting: Option<i64>,
    pub cookies: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(rename = "default")]
    pub default_action: Option<TrackerAction>,
    #[serde(default)]
    pub rules: Vec<TrackerRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerRule {
    /// Regular expression matched against the request URL.
    pub rule: String,
    pub action: Option<TrackerAction>,
    pub exceptions: Option<RuleMatcher>,
    pub options: Option<RuleMatcher>,
    pub fingerprinting: Option<i64>,
    pub cookies: Option<f64>,
    pub surrogate: Option<String>,
}

/// Domain / resource-type constraints attached to a tracker rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleMatcher {
    pub domains: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub domains: Vec<String>,
    pub prevalence: Option<f64>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

impl TrackerData {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DomainError> {
        serde_json::from_slice(bytes).map_err(|e| DomainError::Decode(e.to_string()))
    }

    /// Entity owning `tracker`, resolved through its owner name.
    pub fn entity_for(&self, tracker: &KnownTracker) -> Option<&Entity> {
        let owner = tracker.owner.as_ref()?.name.as_ref()?;
        self.entities.get(owner)
    }
}
