//! Wiring of the concrete adapters into the application services.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use trackerblocker_application::ports::{KeyValueStore, RuleStore, WhitelistRepository};
use trackerblocker_application::services::RuleListPorts;
use trackerblocker_domain::Config;
use trackerblocker_infrastructure::{
    ContentBlockerRulesBuilder, FileRuleStore, FileTdsCache, FileWhitelistRepository,
    JsonKeyValueStore, ReqwestTrackerDataSource, TracingErrorTracker,
};

pub struct Adapters {
    pub key_value_store: Arc<JsonKeyValueStore>,
    pub rule_store: Arc<FileRuleStore>,
    pub tds_source: Arc<ReqwestTrackerDataSource>,
    pub file_cache: Arc<FileTdsCache>,
    pub whitelist_repository: Arc<FileWhitelistRepository>,
    pub error_tracker: Arc<TracingErrorTracker>,
}

impl Adapters {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let storage = &config.storage;
        let adapters = Self {
            key_value_store: Arc::new(JsonKeyValueStore::open(storage.persistence_file())),
            rule_store: Arc::new(FileRuleStore::new(storage.rule_store_dir())),
            tds_source: Arc::new(ReqwestTrackerDataSource::new(&config.tds)?),
            file_cache: Arc::new(FileTdsCache::new(
                storage.tds_cache_dir(),
                storage.bundled_tds_path.as_ref().map(PathBuf::from),
            )),
            whitelist_repository: Arc::new(FileWhitelistRepository::new(
                storage.whitelist_file(),
            )),
            error_tracker: Arc::new(TracingErrorTracker::new()),
        };

        info!(data_dir = %storage.data_dir, "Adapters initialized");
        Ok(adapters)
    }

    pub fn rule_list_ports(&self) -> RuleListPorts {
        RuleListPorts {
            persistence: self.key_value_store.clone(),
            rule_store: self.rule_store.clone(),
            tds_source: self.tds_source.clone(),
            file_cache: self.file_cache.clone(),
            rule_builder: Arc::new(ContentBlockerRulesBuilder::new()),
            error_tracker: self.error_tracker.clone(),
        }
    }

    pub fn key_value_store(&self) -> Arc<dyn KeyValueStore> {
        self.key_value_store.clone()
    }

    pub fn rule_store(&self) -> Arc<dyn RuleStore> {
        self.rule_store.clone()
    }

    pub fn whitelist_repository(&self) -> Arc<dyn WhitelistRepository> {
        self.whitelist_repository.clone()
    }
}
