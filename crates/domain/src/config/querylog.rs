use serde::{Deserialize, Serialize};

/// Query-log writer configuration (spec §4.4).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryLogConfig {
    pub destination_path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for QueryLogConfig {
    fn default() -> Self {
        Self {
            destination_path: "/var/log/ferrous-dns/querylog.jsonl".to_string(),
            pool_size: default_pool_size(),
        }
    }
}

fn default_pool_size() -> usize {
    64
}
