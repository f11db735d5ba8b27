use crate::di::Adapters;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use trackerblocker_application::services::{
    RuleListManager, UserContentController, WhitelistDomainsManager,
};
use trackerblocker_domain::Config;
use trackerblocker_jobs::{JobRunner, TdsRefreshJob};

pub async fn run(config: &Config) -> anyhow::Result<()> {
    info!("TrackerBlocker starting");
    let adapters = Adapters::new(config)?;

    let (whitelist_tx, whitelist_rx) = watch::channel(Vec::new());
    let (state_tx, _) = watch::channel(None);

    let whitelist = WhitelistDomainsManager::new(adapters.whitelist_repository(), whitelist_tx);
    if let Err(e) = whitelist.load().await {
        warn!(error = %e, "Failed to load whitelist, starting with an empty one");
    }

    let manager = Arc::new(RuleListManager::new(
        adapters.rule_list_ports(),
        whitelist_rx,
        state_tx,
    ));
    let shutdown = CancellationToken::new();

    let controller = Arc::new(UserContentController::new());
    let controller_task = controller.spawn(manager.rule_list_updates(), shutdown.clone());

    manager.on_init();

    if config.refresh.enabled {
        JobRunner::new()
            .with_tds_refresh(
                TdsRefreshJob::new(Arc::clone(&manager))
                    .with_interval(config.refresh.interval_secs)
                    .with_cancellation(shutdown.clone()),
            )
            .start()
            .await;
    }

    info!("Ready, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    manager.shutdown();
    shutdown.cancel();
    if let Err(e) = controller_task.await {
        warn!(error = %e, "Content controller task failed");
    }

    let stats = manager.stats();
    info!(
        published = stats.published,
        failed = stats.failed,
        cancelled = stats.cancelled,
        installs = controller.install_count(),
        errors = ?adapters.error_tracker.snapshot(),
        "TrackerBlocker stopped"
    );
    Ok(())
}
