pub mod rule_list_manager;
pub mod rule_list_persistence;
pub mod user_content_controller;
pub mod whitelist_domains_manager;

pub use rule_list_manager::{
    ManagerState, RuleListManager, RuleListManagerStats, RuleListPorts, RuleListStateUpdates,
    WhitelistDomainsUpdates,
};
pub use rule_list_persistence::{RuleListPersistence, ETAG_KEY, IDENTIFIER_KEY};
pub use user_content_controller::UserContentController;
pub use whitelist_domains_manager::WhitelistDomainsManager;
