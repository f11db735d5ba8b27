use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use trackerblocker_domain::{CompilationReason, CompiledRuleList, RuleListStateUpdate};

/// Installs whatever rule list the manager publishes.
///
/// The installed list is swapped atomically, so readers never observe a
/// partially applied update.
pub struct UserContentController {
    installed: ArcSwapOption<CompiledRuleList>,
    last_reason: ArcSwapOption<CompilationReason>,
    current_host: ArcSwapOption<String>,
    install_count: AtomicU64,
    reload_requests: AtomicU64,
}

impl UserContentController {
    pub fn new() -> Self {
        Self {
            installed: ArcSwapOption::empty(),
            last_reason: ArcSwapOption::empty(),
            current_host: ArcSwapOption::empty(),
            install_count: AtomicU64::new(0),
            reload_requests: AtomicU64::new(0),
        }
    }

    /// Start following the rule list state stream until `shutdown` fires.
    pub fn spawn(
        self: &Arc<Self>,
        mut updates: watch::Receiver<Option<RuleListStateUpdate>>,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            // Late subscribers still get the latest published list.
            let initial = updates.borrow_and_update().clone();
            if let Some(update) = initial {
                controller.apply(&update);
            }

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("UserContentController: shutting down");
                        break;
                    }
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let update = updates.borrow_and_update().clone();
                        if let Some(update) = update {
                            controller.apply(&update);
                        }
                    }
                }
            }
        })
    }

    /// Install a published rule list. Returns `true` when the page currently
    /// shown must be reloaded.
    pub fn apply(&self, update: &RuleListStateUpdate) -> bool {
        info!(
            identifier = update.rule_list.identifier(),
            rules = update.rule_list.rule_count(),
            reason = %update.reason,
            "Applying new rules"
        );
        self.installed.store(Some(Arc::new(update.rule_list.clone())));
        self.last_reason.store(Some(Arc::new(update.reason.clone())));
        self.install_count.fetch_add(1, Ordering::Relaxed);

        let reload = self
            .current_host
            .load()
            .as_deref()
            .is_some_and(|host| update.reason.requires_reload(host));
        if reload {
            info!("Protection changed for the current page, reload requested");
            self.reload_requests.fetch_add(1, Ordering::Relaxed);
        }
        reload
    }

    pub fn set_current_host(&self, host: Option<&str>) {
        self.current_host
            .store(host.map(|h| Arc::new(h.to_ascii_lowercase())));
    }

    pub fn installed(&self) -> Option<Arc<CompiledRuleList>> {
        self.installed.load_full()
    }

    pub fn last_reason(&self) -> Option<Arc<CompilationReason>> {
        self.last_reason.load_full()
    }

    pub fn install_count(&self) -> u64 {
        self.install_count.load(Ordering::Relaxed)
    }

    pub fn reload_requests(&self) -> u64 {
        self.reload_requests.load(Ordering::Relaxed)
    }
}

impl Default for UserContentController {
    fn default() -> Self {
        Self::new()
    }
}
