//! Content blocker ruleset document (WebKit JSON shape).

use crate::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlockerRule {
    pub trigger: RuleTrigger,
    pub action: RuleAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTrigger {
    #[serde(rename = "url-filter")]
    pub url_filter: String,

    #[serde(rename = "if-domain", default, skip_serializing_if = "Option::is_none")]
    pub if_domain: Option<Vec<String>>,

    #[serde(rename = "unless-domain", default, skip_serializing_if = "Option::is_none")]
    pub unless_domain: Option<Vec<String>>,

    #[serde(rename = "load-type", default, skip_serializing_if = "Option::is_none")]
    pub load_type: Option<Vec<LoadType>>,

    #[serde(rename = "resource-type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadType {
    #[serde(rename = "first-party")]
    FirstParty,
    #[serde(rename = "third-party")]
    ThirdParty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    #[serde(rename = "block")]
    Block,
    #[serde(rename = "ignore-previous-rules")]
    IgnorePreviousRules,
}

impl ContentBlockerRule {
    pub fn block(trigger: RuleTrigger) -> Self {
        Self {
            trigger,
            action: RuleAction {
                action_type: ActionType::Block,
            },
        }
    }

    pub fn ignore_previous(trigger: RuleTrigger) -> Self {
        Self {
            trigger,
            action: RuleAction {
                action_type: ActionType::IgnorePreviousRules,
            },
        }
    }

    /// Serialize a ruleset into the document handed to the rule store.
    pub fn encode_all(rules: &[ContentBlockerRule]) -> Result<String, DomainError> {
        serde_json::to_string(rules).map_err(|e| DomainError::Encode(e.to_string()))
    }

    pub fn decode_all(document: &str) -> Result<Vec<ContentBlockerRule>, DomainError> {
        serde_json::from_str(document).map_err(|e| DomainError::Decode(e.to_string()))
    }
}
