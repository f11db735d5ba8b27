pub mod error_tracker;
pub mod fs;
pub mod persistence;
pub mod rule_builder;
pub mod rule_store;
pub mod tds;
pub mod whitelist;

pub use error_tracker::TracingErrorTracker;
pub use persistence::JsonKeyValueStore;
pub use rule_builder::ContentBlockerRulesBuilder;
pub use rule_store::FileRuleStore;
pub use tds::{FileTdsCache, ReqwestTrackerDataSource};
pub use whitelist::FileWhitelistRepository;
