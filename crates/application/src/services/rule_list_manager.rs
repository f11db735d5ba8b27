use crate::ports::{
    ErrorTracker, KeyValueStore, RuleBuilder, RuleStore, TdsDownload, TdsFileCache,
    TrackerDataSource,
};
use crate::services::RuleListPersistence;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use trackerblocker_domain::{
    CompilationReason, CompiledRuleList, ContentBlockerRule, DomainError, RuleListIdentifier,
    RuleListStateUpdate, TrackerData, WhitelistDiff,
};

/// Current-value stream of the full whitelist snapshot (sorted).
pub type WhitelistDomainsUpdates = watch::Receiver<Vec<String>>;

/// Current-value stream the manager publishes compiled rule lists into.
pub type RuleListStateUpdates = watch::Sender<Option<RuleListStateUpdate>>;

/// Collaborators of the [`RuleListManager`].
#[derive(Clone)]
pub struct RuleListPorts {
    pub persistence: Arc<dyn KeyValueStore>,
    pub rule_store: Arc<dyn RuleStore>,
    pub tds_source: Arc<dyn TrackerDataSource>,
    pub file_cache: Arc<dyn TdsFileCache>,
    pub rule_builder: Arc<dyn RuleBuilder>,
    pub error_tracker: Arc<dyn ErrorTracker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    Initializing,
    Idle,
    Compiling,
}

/// Counters exposed for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleListManagerStats {
    pub scheduled: u64,
    pub skipped_unchanged: u64,
    pub cancelled: u64,
    pub failed: u64,
    pub published: u64,
}

#[derive(Default)]
struct Counters {
    scheduled: AtomicU64,
    skipped_unchanged: AtomicU64,
    cancelled: AtomicU64,
    failed: AtomicU64,
    published: AtomicU64,
}

struct CompilationRequest {
    tracker_data: Bytes,
    domains: Vec<String>,
    reason: CompilationReason,
    /// Whitelist snapshot preceding a whitelist-driven request.
    whitelist_origin: Option<Vec<String>>,
    /// Compile even when the candidate matches the persisted identifier.
    force: bool,
}

struct InFlight {
    generation: u64,
    token: CancellationToken,
    whitelist_origin: Option<Vec<String>>,
    /// Non-whitelist work this request superseded and has not committed yet.
    carried_reason: Option<CompilationReason>,
}

#[derive(Default)]
struct CompilationSlot {
    in_flight: Option<InFlight>,
}

/// Keeps a compiled content blocking rule list consistent with the latest
/// tracker data and whitelist, and publishes it to consumers.
///
/// ## Lifecycle
///
/// `on_init()` subscribes to whitelist changes, resolves the last published
/// rule list (look-up, or compile from cached tracker data on a miss) and, in
/// parallel, tries to download fresher tracker data.
///
/// ## Compilation
///
/// At most one compilation is in flight. Scheduling a new one cancels the
/// previous one; a cancelled compilation never publishes, never touches the
/// persisted identifier and never removes the active rule list. Commits
/// (remove previous, persist, publish) are serialized.
///
/// The initial load compilation is never superseded. Later requests wait for
/// it to settle before they compile, so both publish and the newer one wins.
///
/// ## Errors
///
/// Every failure is reported to the [`ErrorTracker`] and swallowed; consumers
/// keep the last published rule list.
pub struct RuleListManager {
    persistence: RuleListPersistence,
    rule_store: Arc<dyn RuleStore>,
    tds_source: Arc<dyn TrackerDataSource>,
    file_cache: Arc<dyn TdsFileCache>,
    rule_builder: Arc<dyn RuleBuilder>,
    error_tracker: Arc<dyn ErrorTracker>,

    whitelist_updates: WhitelistDomainsUpdates,
    state_updates: RuleListStateUpdates,

    slot: Mutex<CompilationSlot>,
    commit_lock: Mutex<()>,
    generation: AtomicU64,
    active_generation: AtomicU64,
    initialized: AtomicBool,
    initial_load: watch::Sender<bool>,
    counters: Counters,
    shutdown: CancellationToken,
}

impl RuleListManager {
    pub fn new(
        ports: RuleListPorts,
        whitelist_updates: WhitelistDomainsUpdates,
        state_updates: RuleListStateUpdates,
    ) -> Self {
        Self {
            persistence: RuleListPersistence::new(ports.persistence),
            rule_store: ports.rule_store,
            tds_source: ports.tds_source,
            file_cache: ports.file_cache,
            rule_builder: ports.rule_builder,
            error_tracker: ports.error_tracker,
            whitelist_updates,
            state_updates,
            slot: Mutex::new(CompilationSlot::default()),
            commit_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            active_generation: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
            initial_load: watch::channel(false).0,
            counters: Counters::default(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Start the lifecycle. Returns immediately; the work runs on spawned
    /// tasks. Calling it again is a no-op.
    pub fn on_init(self: &Arc<Self>) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Rule list manager already initialized");
            return;
        }
        info!("Initializing rule list manager");

        self.subscribe_to_whitelist_updates();

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.load_current_rule_list_or_compile().await;
            this.initial_load.send_replace(true);
        });

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.refresh_tracker_data().await;
        });
    }

    /// Try once to download newer tracker data. Returns `true` when new data
    /// was accepted and a compilation scheduled.
    pub async fn refresh_tracker_data(self: &Arc<Self>) -> bool {
        let Some(data) = self.download_new_tds().await else {
            return false;
        };
        let domains = self.whitelist_updates.borrow().clone();
        self.schedule_compilation(CompilationRequest {
            tracker_data: data,
            domains,
            reason: CompilationReason::NewTds,
            whitelist_origin: None,
            force: false,
        })
        .await;
        true
    }

    /// Stop listening to whitelist changes and cancel any in-flight compilation.
    pub fn shutdown(&self) {
        info!("Shutting down rule list manager");
        self.shutdown.cancel();
    }

    pub fn state(&self) -> ManagerState {
        if !self.initialized.load(Ordering::SeqCst) {
            ManagerState::Uninitialized
        } else if self.active_generation.load(Ordering::SeqCst) != 0 {
            ManagerState::Compiling
        } else if !*self.initial_load.borrow() {
            ManagerState::Initializing
        } else {
            ManagerState::Idle
        }
    }

    pub fn stats(&self) -> RuleListManagerStats {
        RuleListManagerStats {
            scheduled: self.counters.scheduled.load(Ordering::Relaxed),
            skipped_unchanged: self.counters.skipped_unchanged.load(Ordering::Relaxed),
            cancelled: self.counters.cancelled.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            published: self.counters.published.load(Ordering::Relaxed),
        }
    }

    /// New receiver on the rule list state stream.
    pub fn rule_list_updates(&self) -> watch::Receiver<Option<RuleListStateUpdate>> {
        self.state_updates.subscribe()
    }

    pub fn last_identifier(&self) -> Option<RuleListIdentifier> {
        self.persistence.last_identifier()
    }

    pub fn last_etag(&self) -> Option<String> {
        self.persistence.last_etag()
    }

    // ------------------------------------------------------------------
    // Initial load
    // ------------------------------------------------------------------

    async fn load_current_rule_list_or_compile(self: &Arc<Self>) {
        let domains = self.whitelist_updates.borrow().clone();
        let whitelisted = RuleListIdentifier::new(None, domains.iter().cloned()).domains;

        match self.persistence.last_identifier() {
            // The whitelist was edited while the manager was not running.
            Some(identifier) if identifier.domains != whitelisted => {
                info!(
                    identifier = %identifier.value(),
                    whitelist = ?whitelisted,
                    "Whitelist changed since the last rule list, recompiling"
                );
            }
            Some(identifier) => {
                let value = identifier.value();
                info!(identifier = %value, "Looking up cached rule list");
                match self.rule_store.look_up(&value).await {
                    Ok(Some(rule_list)) => {
                        self.publish_cached(&identifier, rule_list).await;
                        return;
                    }
                    Ok(None) => {
                        warn!(identifier = %value, "No rule list found, compiling from cached tracker data");
                    }
                    Err(e) => self.track_error(&e),
                }
            }
            None => warn!("No cached rule list found, loading cached tracker data"),
        }

        let tracker_data = self.file_cache.get_cached_data().await;
        let request = CompilationRequest {
            tracker_data,
            domains,
            reason: CompilationReason::InitialLoad,
            whitelist_origin: None,
            force: true,
        };

        // Runs outside the slot: only shutdown cancels it.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.shutdown.child_token();
        info!(generation, reason = %request.reason, "Compiling initial rule list");
        self.active_generation.store(generation, Ordering::SeqCst);
        self.counters.scheduled.fetch_add(1, Ordering::Relaxed);

        self.run_compilation(generation, &token, request).await;
        self.finish_compilation(generation).await;
    }

    /// Publish a looked-up rule list unless something newer was accepted meanwhile.
    async fn publish_cached(&self, identifier: &RuleListIdentifier, rule_list: CompiledRuleList) {
        let _commit = self.commit_lock.lock().await;

        let already_published = self.state_updates.borrow().is_some();
        let still_current = self
            .persistence
            .last_identifier()
            .is_some_and(|last| last.value() == identifier.value());
        if already_published || !still_current {
            info!("Newer rule list already accepted, discarding cached look-up");
            return;
        }

        self.publish(rule_list, CompilationReason::InitialLoad);
    }

    // ------------------------------------------------------------------
    // Tracker data download
    // ------------------------------------------------------------------

    async fn download_new_tds(&self) -> Option<Bytes> {
        let etag = self.persistence.last_etag();
        let started = Instant::now();
        info!(etag = etag.as_deref().unwrap_or("none"), "Downloading latest tracker data");

        match self.tds_source.download_latest(etag.as_deref()).await {
            Ok(TdsDownload {
                data: Some(data),
                etag: Some(new_etag),
            }) => {
                info!(
                    etag = %new_etag,
                    bytes = data.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Tracker data downloaded"
                );
                // The ETag must only ever label bytes that reached the cache.
                if let Err(e) = self.file_cache.save(&data, &new_etag).await {
                    self.track_error(&e);
                    return None;
                }
                if let Err(e) = self.persistence.set_last_etag(Some(&new_etag)) {
                    self.track_error(&e);
                }
                Some(data)
            }
            Ok(_) => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Tracker data not modified"
                );
                None
            }
            Err(e) => {
                self.track_error(&e);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Whitelist updates
    // ------------------------------------------------------------------

    fn subscribe_to_whitelist_updates(self: &Arc<Self>) {
        info!("Subscribing to whitelist domains updates");
        let mut updates = self.whitelist_updates.clone();
        let shutdown = self.shutdown.clone();
        let manager = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut previous = updates.borrow_and_update().clone();
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Whitelist subscription: shutting down");
                        break;
                    }
                    changed = updates.changed() => {
                        if changed.is_err() {
                            debug!("Whitelist stream closed");
                            break;
                        }
                        let current = updates.borrow_and_update().clone();
                        let Some(manager) = manager.upgrade() else {
                            break;
                        };
                        manager.handle_whitelist_change(&previous, &current).await;
                        previous = current;
                    }
                }
            }
        });
    }

    async fn handle_whitelist_change(self: &Arc<Self>, old: &[String], new: &[String]) {
        if WhitelistDiff::between(old, new).is_empty() {
            debug!("Whitelist snapshot unchanged, nothing to compile");
            return;
        }
        info!(old = ?old, new = ?new, "Whitelist domains updated");

        let tracker_data = self.file_cache.get_cached_data().await;

        let mut slot = self.slot.lock().await;
        let origin = slot
            .in_flight
            .as_ref()
            .and_then(|f| f.whitelist_origin.clone())
            .unwrap_or_else(|| old.to_vec());
        let diff = WhitelistDiff::between(&origin, new);

        if diff.is_empty() {
            let carried = slot
                .in_flight
                .as_ref()
                .and_then(|f| f.carried_reason.clone());
            match carried {
                Some(reason) => {
                    info!(
                        reason = %reason,
                        "Whitelist returned to its published state, resuming superseded compilation"
                    );
                    self.schedule_locked(
                        &mut slot,
                        CompilationRequest {
                            tracker_data,
                            domains: new.to_vec(),
                            reason,
                            whitelist_origin: None,
                            force: false,
                        },
                    );
                }
                None => {
                    if let Some(previous) = slot.in_flight.take() {
                        info!(
                            generation = previous.generation,
                            "Whitelist returned to its published state, cancelling in-flight compilation"
                        );
                        previous.token.cancel();
                    }
                }
            }
            return;
        }

        self.schedule_locked(
            &mut slot,
            CompilationRequest {
                tracker_data,
                domains: new.to_vec(),
                reason: CompilationReason::WhitelistUpdated {
                    added: diff.added,
                    removed: diff.removed,
                },
                whitelist_origin: Some(origin),
                force: false,
            },
        );
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    async fn schedule_compilation(self: &Arc<Self>, request: CompilationRequest) {
        let mut slot = self.slot.lock().await;
        self.schedule_locked(&mut slot, request);
    }

    fn schedule_locked(self: &Arc<Self>, slot: &mut CompilationSlot, request: CompilationRequest) {
        let previous = slot.in_flight.take();
        if let Some(previous) = &previous {
            debug!(generation = previous.generation, "Cancelling in-flight compilation");
            previous.token.cancel();
        }
        let carried_reason = match request.whitelist_origin {
            Some(_) => previous.and_then(|p| p.carried_reason),
            None => Some(request.reason.clone()),
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.shutdown.child_token();
        info!(generation, reason = %request.reason, "Scheduling rule list compilation");

        slot.in_flight = Some(InFlight {
            generation,
            token: token.clone(),
            whitelist_origin: request.whitelist_origin.clone(),
            carried_reason,
        });
        self.active_generation.store(generation, Ordering::SeqCst);
        self.counters.scheduled.fetch_add(1, Ordering::Relaxed);

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run_compilation(generation, &token, request).await;
            this.finish_compilation(generation).await;
        });
    }

    async fn run_compilation(
        &self,
        generation: u64,
        token: &CancellationToken,
        request: CompilationRequest,
    ) {
        if !matches!(request.reason, CompilationReason::InitialLoad)
            && !self.wait_for_initial_load(token).await
        {
            info!(generation, "Compilation cancelled before the initial load settled");
            self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let started = Instant::now();
        let CompilationRequest {
            tracker_data,
            domains,
            reason,
            force,
            ..
        } = request;

        let candidate = RuleListIdentifier::new(self.persistence.last_etag(), domains);
        let candidate_value = candidate.value();
        let last_value = self.persistence.last_identifier().map(|id| id.value());
        debug!(
            generation,
            candidate = %candidate_value,
            last = ?last_value,
            "Generated rule list identifier"
        );

        if !force && last_value.as_deref() == Some(candidate_value.as_str()) {
            info!(generation, "Identifier hasn't changed, skipping compilation");
            self.counters.skipped_unchanged.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let builder = Arc::clone(&self.rule_builder);
        let unprotected = candidate.domains.clone();
        let built = tokio::task::spawn_blocking(move || -> Result<(String, usize), DomainError> {
            let tracker_data = TrackerData::from_slice(&tracker_data)?;
            let rules = builder.build_rules(&tracker_data, &unprotected);
            let encoded = ContentBlockerRule::encode_all(&rules)?;
            Ok((encoded, rules.len()))
        })
        .await;

        let encoded_rules = match built {
            Ok(Ok((encoded, rule_count))) => {
                debug!(generation, rule_count, "Content blocker rules built");
                encoded
            }
            Ok(Err(e)) => {
                self.fail(&e);
                return;
            }
            Err(e) => {
                self.fail(&DomainError::Encode(format!("rule builder task failed: {e}")));
                return;
            }
        };

        if token.is_cancelled() {
            info!(generation, "Compilation cancelled");
            self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
            return;
        }

        info!(generation, "Compiling content rule list");
        let rule_list = match self.rule_store.compile(&candidate_value, &encoded_rules).await {
            Ok(Some(rule_list)) => rule_list,
            Ok(None) => {
                self.fail(&DomainError::Compile(
                    "Rule list is empty after compilation".to_string(),
                ));
                return;
            }
            Err(e) => {
                self.fail(&e);
                return;
            }
        };

        self.commit(generation, token, candidate, rule_list, reason, started)
            .await;
    }

    /// Returns `false` when `token` was cancelled while waiting.
    async fn wait_for_initial_load(&self, token: &CancellationToken) -> bool {
        if !self.initialized.load(Ordering::SeqCst) {
            return true;
        }
        let mut initial_load = self.initial_load.subscribe();
        let settled = async move { initial_load.wait_for(|done| *done).await.is_ok() };
        tokio::select! {
            _ = token.cancelled() => false,
            settled = settled => settled,
        }
    }

    async fn commit(
        &self,
        generation: u64,
        token: &CancellationToken,
        candidate: RuleListIdentifier,
        rule_list: CompiledRuleList,
        reason: CompilationReason,
        started: Instant,
    ) {
        let _commit = self.commit_lock.lock().await;

        {
            let mut slot = self.slot.lock().await;
            if token.is_cancelled() {
                info!(generation, "Compilation superseded, discarding compiled rule list");
                self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
                return;
            }
            if let Some(in_flight) = slot
                .in_flight
                .as_mut()
                .filter(|f| f.generation == generation)
            {
                in_flight.whitelist_origin = None;
                in_flight.carried_reason = None;
            }
        }

        let candidate_value = candidate.value();
        if let Some(previous) = self
            .persistence
            .last_identifier()
            .filter(|previous| previous.value() != candidate_value)
        {
            debug!(generation, previous = %previous, "Clearing previous rule list");
            if let Err(e) = self.rule_store.remove(&previous.value()).await {
                debug!(error = %e, "Failed to remove previous rule list");
            }
        }

        if let Err(e) = self.persistence.set_last_identifier(Some(&candidate)) {
            self.track_error(&e);
        }

        self.publish(rule_list, reason);

        info!(
            generation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rule list compiled and published"
        );
    }

    async fn finish_compilation(&self, generation: u64) {
        let mut slot = self.slot.lock().await;
        if slot
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation)
        {
            slot.in_flight = None;
        }
        let _ = self.active_generation.compare_exchange(
            generation,
            0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    fn publish(&self, rule_list: CompiledRuleList, reason: CompilationReason) {
        info!(reason = %reason, rules = rule_list.rule_count(), "Publishing rule list");
        self.state_updates
            .send_replace(Some(RuleListStateUpdate { rule_list, reason }));
        self.counters.published.fetch_add(1, Ordering::Relaxed);
    }

    fn fail(&self, err: &DomainError) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.track_error(err);
    }

    fn track_error(&self, err: &DomainError) {
        let category = err.category();
        let detail = err.to_string();
        error!(category, detail = %detail, "Rule list error");
        self.error_tracker.report(category, &detail);
    }
}
