use serde::{Deserialize, Serialize};

/// DNSDB aggregation buffer and periodic-rotation configuration
/// (spec §4.1, §4.2, and this expansion's `DnsdbRotationJob`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsDbConfig {
    /// Maximum number of distinct `(target, qtype)` keys held at once.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// How often the rotation job calls `rotate()` and dumps a gzip CSV.
    #[serde(default = "default_rotate_interval_secs")]
    pub rotate_interval_secs: u64,
    /// Directory periodic rotation dumps land in.
    #[serde(default = "default_dump_dir")]
    pub dump_dir: String,
}

impl Default for DnsDbConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            rotate_interval_secs: default_rotate_interval_secs(),
            dump_dir: default_dump_dir(),
        }
    }
}

fn default_max_size() -> usize {
    100_000
}

fn default_rotate_interval_secs() -> u64 {
    3600
}

fn default_dump_dir() -> String {
    "/var/lib/ferrous-dns/dnsdb".to_string()
}
