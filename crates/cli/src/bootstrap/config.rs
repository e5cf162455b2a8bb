use crate::config::AppConfig;
use tracing::info;

pub fn load_config(config_path: Option<&str>) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load(config_path)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        bind_address = %config.bind_address,
        dnsdb_max_size = config.dnsdb.max_size,
        "Configuration loaded"
    );

    Ok(config)
}
