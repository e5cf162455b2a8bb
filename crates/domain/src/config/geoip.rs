use serde::{Deserialize, Serialize};

/// GeoIP resolver configuration (spec §4.3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeoIpConfig {
    pub asn_db_path: String,
    pub country_db_path: String,
    #[serde(default = "default_host_cache_size")]
    pub host_cache_size: usize,
    #[serde(default = "default_ip_cache_size")]
    pub ip_cache_size: usize,
    /// ASNs considered "top" for a country/location during subnet-map
    /// build (spec §4.3 "all top ASNs").
    #[serde(default)]
    pub all_top_asns: Vec<u32>,
    /// `country -> top ASN`, used by `SubnetByLocation`'s ASN fallback.
    #[serde(default)]
    pub country_top_asns: Vec<(String, u32)>,
    /// How often `GeoipRefreshJob` calls `refresh()`.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            asn_db_path: String::new(),
            country_db_path: String::new(),
            host_cache_size: default_host_cache_size(),
            ip_cache_size: default_ip_cache_size(),
            all_top_asns: Vec::new(),
            country_top_asns: Vec::new(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_host_cache_size() -> usize {
    4096
}

fn default_ip_cache_size() -> usize {
    65536
}

fn default_refresh_interval_secs() -> u64 {
    21600
}
