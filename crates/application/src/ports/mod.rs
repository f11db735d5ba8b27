pub mod error_tracker;
pub mod key_value_store;
pub mod rule_builder;
pub mod rule_store;
pub mod tds_file_cache;
pub mod tracker_data_source;
pub mod whitelist_repository;

pub use error_tracker::ErrorTracker;
pub use key_value_store::KeyValueStore;
pub use rule_builder::RuleBuilder;
pub use rule_store::RuleStore;
pub use tds_file_cache::TdsFileCache;
pub use tracker_data_source::{TdsDownload, TrackerDataSource};
pub use whitelist_repository::WhitelistRepository;
