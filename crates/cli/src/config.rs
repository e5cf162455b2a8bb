//! Composition-root configuration: one TOML file combining the config
//! structs the core's crates already define per concern.

use ferrous_dns_domain::config::{DebugConfig, DnsDbConfig, GeoIpConfig, LoggingConfig, QueryLogConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
    #[serde(default)]
    pub dnsdb: DnsDbConfig,
    #[serde(default)]
    pub querylog: QueryLogConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    /// Bind address for the DNSDB CSV-dump HTTP surface (spec §4.2
    /// `ServeCSVDump`). The listener and route itself live in
    /// `ferrous-dns-infrastructure`; this is just where it's bound.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            geoip: GeoIpConfig::default(),
            dnsdb: DnsDbConfig::default(),
            querylog: QueryLogConfig::default(),
            debug: DebugConfig::default(),
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

impl AppConfig {
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("reading config file {path}: {e}"))?;
                let config: AppConfig = toml::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("parsing config file {path}: {e}"))?;
                Ok(config)
            }
            None => Ok(AppConfig::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.bind_address
            .parse::<std::net::SocketAddr>()
            .map_err(|e| anyhow::anyhow!("invalid bind_address {:?}: {e}", self.bind_address))?;
        Ok(())
    }
}
