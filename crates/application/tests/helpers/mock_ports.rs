use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use trackerblocker_application::ports::{
    ErrorTracker, KeyValueStore, RuleBuilder, RuleStore, TdsDownload, TdsFileCache,
    TrackerDataSource, WhitelistRepository,
};
use trackerblocker_application::services::{RuleListManager, RuleListPorts, IDENTIFIER_KEY};
use trackerblocker_domain::{
    CompilationReason, CompiledRuleList, ContentBlockerRule, DomainError, RuleListIdentifier,
    RuleListStateUpdate, RuleTrigger, TrackerData,
};

pub const MOCKED_TDS: &str = r#"{
    "trackers": {
        "1558334541.rsc.cdn77.org": {
            "domain": "1558334541.rsc.cdn77.org",
            "owner": {"name": "DataCamp Limited", "displayName": "DataCamp"},
            "prevalence": 0.0000613,
            "fingerprinting": 3,
            "cookies": 0.0000545,
            "categories": [],
            "default": "ignore",
            "rules": [
                {"rule": "1558334541\\.rsc\\.cdn77\\.org\\/nfs\\/20221227\\/etp\\.min\\.js", "fingerprinting": 3, "cookies": 0.0000136},
                {"rule": "1558334541\\.rsc\\.cdn77\\.org\\/nfs\\/20221104\\/etpnoauid\\.min\\.js", "fingerprinting": 3, "cookies": 0.0000136}
            ]
        }
    },
    "entities": {
        "DataCamp Limited": {
            "domains": ["cdn77.org", "datacamp.com", "rdocumentation.org"],
            "prevalence": 0.0551,
            "displayName": "DataCamp"
        }
    },
    "domains": {"cdn77.org": "DataCamp Limited"},
    "cnames": {"aax-eu.amazon.se": "aax-eu-retail-direct.amazon-adsystem.com"}
}"#;

pub fn mocked_tds() -> Bytes {
    Bytes::from_static(MOCKED_TDS.as_bytes())
}

// ============================================================================
// Mock KeyValueStore
// ============================================================================

#[derive(Default)]
pub struct MockKeyValueStore {
    strings: Mutex<HashMap<String, String>>,
    bytes: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identifier(identifier: &RuleListIdentifier) -> Self {
        let store = Self::new();
        store
            .set_bytes(IDENTIFIER_KEY, Some(&identifier.to_json().unwrap()))
            .unwrap();
        store
    }
}

impl KeyValueStore for MockKeyValueStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.strings.lock().unwrap().get(key).cloned()
    }

    fn set_string(&self, key: &str, value: Option<&str>) -> Result<(), DomainError> {
        let mut strings = self.strings.lock().unwrap();
        match value {
            Some(v) => strings.insert(key.to_string(), v.to_string()),
            None => strings.remove(key),
        };
        Ok(())
    }

    fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.bytes.lock().unwrap().get(key).cloned()
    }

    fn set_bytes(&self, key: &str, value: Option<&[u8]>) -> Result<(), DomainError> {
        let mut bytes = self.bytes.lock().unwrap();
        match value {
            Some(v) => bytes.insert(key.to_string(), v.to_vec()),
            None => bytes.remove(key),
        };
        Ok(())
    }
}

// ============================================================================
// Mock RuleStore
// ============================================================================

pub struct MockRuleStore {
    lookup_hit: AtomicBool,
    lookup_fails: AtomicBool,
    compile_success: AtomicBool,
    compile_delay: Mutex<Option<Duration>>,
    compile_calls: AtomicU64,
    lookup_calls: AtomicU64,
    compiled: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
}

impl MockRuleStore {
    pub fn new() -> Self {
        Self {
            lookup_hit: AtomicBool::new(false),
            lookup_fails: AtomicBool::new(false),
            compile_success: AtomicBool::new(true),
            compile_delay: Mutex::new(None),
            compile_calls: AtomicU64::new(0),
            lookup_calls: AtomicU64::new(0),
            compiled: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_lookup_hit(self) -> Self {
        self.lookup_hit.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_lookup_failure(self) -> Self {
        self.lookup_fails.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_compile_failure(self) -> Self {
        self.compile_success.store(false, Ordering::SeqCst);
        self
    }

    pub fn with_compile_delay(self, delay: Duration) -> Self {
        *self.compile_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn compile_calls(&self) -> u64 {
        self.compile_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> u64 {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn compiled(&self) -> Vec<String> {
        self.compiled.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl RuleStore for MockRuleStore {
    async fn look_up(&self, identifier: &str) -> Result<Option<CompiledRuleList>, DomainError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.lookup_fails.load(Ordering::SeqCst) {
            return Err(DomainError::Lookup("mock lookup failure".to_string()));
        }
        if self.lookup_hit.load(Ordering::SeqCst) {
            return Ok(Some(CompiledRuleList::new(identifier, 0, Arc::from("[]"))));
        }
        Ok(None)
    }

    async fn compile(
        &self,
        identifier: &str,
        encoded_rules: &str,
    ) -> Result<Option<CompiledRuleList>, DomainError> {
        self.compile_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.compile_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if !self.compile_success.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.compiled.lock().unwrap().push(identifier.to_string());
        let count = ContentBlockerRule::decode_all(encoded_rules)
            .map(|rules| rules.len())
            .unwrap_or_default();
        Ok(Some(CompiledRuleList::new(
            identifier,
            count,
            Arc::from(encoded_rules),
        )))
    }

    async fn remove(&self, identifier: &str) -> Result<(), DomainError> {
        self.removed.lock().unwrap().push(identifier.to_string());
        Ok(())
    }
}

// ============================================================================
// Mock TrackerDataSource
// ============================================================================

#[derive(Debug, Clone)]
pub enum DownloadBehavior {
    NewEtag(String),
    NotModified,
    Fail,
}

pub struct MockTrackerDataSource {
    behavior: Mutex<DownloadBehavior>,
    delay: Duration,
    calls: AtomicU64,
    seen_etags: Mutex<Vec<Option<String>>>,
}

impl MockTrackerDataSource {
    pub fn new(behavior: DownloadBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            delay: Duration::from_millis(200),
            calls: AtomicU64::new(0),
            seen_etags: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_behavior(&self, behavior: DownloadBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_etags(&self) -> Vec<Option<String>> {
        self.seen_etags.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackerDataSource for MockTrackerDataSource {
    async fn download_latest(&self, etag: Option<&str>) -> Result<TdsDownload, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_etags
            .lock()
            .unwrap()
            .push(etag.map(str::to_string));
        tokio::time::sleep(self.delay).await;

        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            DownloadBehavior::NewEtag(etag) => Ok(TdsDownload {
                data: Some(mocked_tds()),
                etag: Some(etag),
            }),
            DownloadBehavior::NotModified => Ok(TdsDownload::not_modified()),
            DownloadBehavior::Fail => Err(DomainError::Download("NetworkError".to_string())),
        }
    }
}

// ============================================================================
// Mock TdsFileCache
// ============================================================================

pub struct MockTdsFileCache {
    data: Mutex<Bytes>,
    saved: Mutex<Vec<(Bytes, String)>>,
    fail_saves: AtomicBool,
}

impl MockTdsFileCache {
    pub fn new() -> Self {
        Self::with_data(mocked_tds())
    }

    pub fn with_data(data: Bytes) -> Self {
        Self {
            data: Mutex::new(data),
            saved: Mutex::new(Vec::new()),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn with_save_failure(self) -> Self {
        self.fail_saves.store(true, Ordering::SeqCst);
        self
    }

    pub fn saved(&self) -> Vec<(Bytes, String)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl TdsFileCache for MockTdsFileCache {
    async fn save(&self, data: &Bytes, etag: &str) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::IoError("read-only cache".to_string()));
        }
        self.saved
            .lock()
            .unwrap()
            .push((data.clone(), etag.to_string()));
        *self.data.lock().unwrap() = data.clone();
        Ok(())
    }

    async fn get_cached_data(&self) -> Bytes {
        self.data.lock().unwrap().clone()
    }
}

// ============================================================================
// Mock RuleBuilder / ErrorTracker / WhitelistRepository
// ============================================================================

pub struct MockRuleBuilder;

impl RuleBuilder for MockRuleBuilder {
    fn build_rules(
        &self,
        tracker_data: &TrackerData,
        unprotected_domains: &[String],
    ) -> Vec<ContentBlockerRule> {
        let mut rules: Vec<ContentBlockerRule> = tracker_data
            .trackers
            .keys()
            .map(|domain| {
                ContentBlockerRule::block(RuleTrigger {
                    url_filter: domain.replace('.', "\\."),
                    ..Default::default()
                })
            })
            .collect();
        if !unprotected_domains.is_empty() {
            rules.push(ContentBlockerRule::ignore_previous(RuleTrigger {
                url_filter: ".*".to_string(),
                if_domain: Some(
                    unprotected_domains
                        .iter()
                        .map(|d| format!("*{d}"))
                        .collect(),
                ),
                ..Default::default()
            }));
        }
        rules
    }
}

#[derive(Default)]
pub struct MockErrorTracker {
    reports: Mutex<Vec<(String, String)>>,
}

impl MockErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|(category, _)| category.clone())
            .collect()
    }
}

impl ErrorTracker for MockErrorTracker {
    fn report(&self, category: &str, detail: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((category.to_string(), detail.to_string()));
    }
}

#[derive(Default)]
pub struct MockWhitelistRepository {
    domains: Mutex<Vec<String>>,
    save_calls: AtomicU64,
    fail_saves: AtomicBool,
}

impl MockWhitelistRepository {
    pub fn with_domains(domains: &[&str]) -> Self {
        Self {
            domains: Mutex::new(domains.iter().map(|d| d.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<String> {
        self.domains.lock().unwrap().clone()
    }

    pub fn save_calls(&self) -> u64 {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WhitelistRepository for MockWhitelistRepository {
    async fn load(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.domains.lock().unwrap().clone())
    }

    async fn save(&self, domains: &[String]) -> Result<(), DomainError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::IoError("disk full".to_string()));
        }
        *self.domains.lock().unwrap() = domains.to_vec();
        Ok(())
    }
}

// ============================================================================
// Manager harness
// ============================================================================

pub struct ManagerHarness {
    pub store: Arc<MockKeyValueStore>,
    pub rule_store: Arc<MockRuleStore>,
    pub tds_source: Arc<MockTrackerDataSource>,
    pub file_cache: Arc<MockTdsFileCache>,
    pub error_tracker: Arc<MockErrorTracker>,
    pub whitelist: watch::Sender<Vec<String>>,
    pub state: watch::Sender<Option<RuleListStateUpdate>>,
}

impl ManagerHarness {
    pub fn new(
        store: MockKeyValueStore,
        rule_store: MockRuleStore,
        tds_source: MockTrackerDataSource,
    ) -> Self {
        Self::with_file_cache(store, rule_store, tds_source, MockTdsFileCache::new())
    }

    pub fn with_file_cache(
        store: MockKeyValueStore,
        rule_store: MockRuleStore,
        tds_source: MockTrackerDataSource,
        file_cache: MockTdsFileCache,
    ) -> Self {
        let (whitelist, _) = watch::channel(Vec::new());
        let (state, _) = watch::channel(None);
        Self {
            store: Arc::new(store),
            rule_store: Arc::new(rule_store),
            tds_source: Arc::new(tds_source),
            file_cache: Arc::new(file_cache),
            error_tracker: Arc::new(MockErrorTracker::new()),
            whitelist,
            state,
        }
    }

    pub fn manager(&self) -> Arc<RuleListManager> {
        let ports = RuleListPorts {
            persistence: self.store.clone(),
            rule_store: self.rule_store.clone(),
            tds_source: self.tds_source.clone(),
            file_cache: self.file_cache.clone(),
            rule_builder: Arc::new(MockRuleBuilder),
            error_tracker: self.error_tracker.clone(),
        };
        Arc::new(RuleListManager::new(
            ports,
            self.whitelist.subscribe(),
            self.state.clone(),
        ))
    }

    /// Record every reason published on the state stream.
    pub fn collect_reasons(&self) -> Arc<Mutex<Vec<CompilationReason>>> {
        let reasons = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reasons);
        let mut rx = self.state.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let update = rx.borrow_and_update().clone();
                if let Some(update) = update {
                    sink.lock().unwrap().push(update.reason);
                }
            }
        });
        reasons
    }
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
