//! TrackerBlocker Domain Layer
pub mod compilation;
pub mod config;
pub mod content_blocker;
pub mod errors;
pub mod rule_list_identifier;
pub mod tracker_data;
pub mod validators;
pub mod whitelist;

pub use compilation::{CompilationReason, CompiledRuleList, RuleListStateUpdate};
pub use config::{CliOverrides, Config, ConfigError};
pub use content_blocker::{ActionType, ContentBlockerRule, LoadType, RuleAction, RuleTrigger};
pub use errors::DomainError;
pub use rule_list_identifier::RuleListIdentifier;
pub use tracker_data::{Entity, KnownTracker, TrackerAction, TrackerData, TrackerOwner, TrackerRule};
pub use whitelist::WhitelistDiff;
