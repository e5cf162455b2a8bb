use serde::{Deserialize, Serialize};

/// Debug CHAOS TXT response configuration (spec §4.8, §6.3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebugConfig {
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Optional node identity reported as `node-name` (spec §4.8 lists
    /// it as "(optional)").
    #[serde(default)]
    pub node_name: Option<String>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            node_name: None,
        }
    }
}

fn default_suffix() -> String {
    "adguard-dns.com".to_string()
}
