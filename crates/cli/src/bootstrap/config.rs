use trackerblocker_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        tds_url = %config.tds.url,
        data_dir = %config.storage.data_dir,
        refresh_enabled = config.refresh.enabled,
        "Configuration loaded"
    );

    Ok(config)
}
