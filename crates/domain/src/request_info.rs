use crate::blocking_mode::BlockingMode;
use crate::location::Location;
use hickory_proto::rr::{DNSClass, RecordType};
use std::net::{IpAddr, SocketAddr};
use uuid::Uuid;

/// Transport the query arrived over. Wire parsing/transport itself is
/// out of scope (spec §1); this tag is all the core reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
    Dot,
    Doh,
    Doq,
}

impl Protocol {
    /// Stable on-wire protocol code, query-log field `p` (spec §6.2).
    pub fn code(&self) -> u8 {
        match self {
            Protocol::Udp => 0,
            Protocol::Tcp => 1,
            Protocol::Dot => 2,
            Protocol::Doh => 3,
            Protocol::Doq => 4,
        }
    }
}

/// The subset of the external device record the middleware reads
/// (spec §3 "Profile / Device (external)").
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub filtering_enabled: bool,
}

/// Opaque per-profile filter-config handle consumed by the filter
/// engine port; the core never inspects its contents (spec §1, filter-
/// rule engine internals are external).
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub filtering_group_id: String,
}

/// The subset of the external profile record the middleware reads.
#[derive(Debug, Clone)]
pub struct ProfileInfo {
    pub id: String,
    pub query_log_enabled: bool,
    pub ip_log_enabled: bool,
    pub filtering_enabled: bool,
    pub blocking_mode: BlockingMode,
    pub adult_blocking_mode: Option<BlockingMode>,
    pub safe_browsing_blocking_mode: Option<BlockingMode>,
    pub filter_config: FilterConfig,
}

/// Immutable per-query context (spec §3 "RequestInfo"). The core treats
/// every field as read-only; the one mutation path is
/// [`RequestInfo::with_rewritten_host`], which produces a shallow copy
/// carrying a new normalized host for the downstream call after a CNAME
/// rewrite (spec §4.7.2).
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub request_id: Uuid,
    pub remote_ip: IpAddr,
    pub local_addr: SocketAddr,
    /// Lowercase, trailing-dot stripped.
    pub host: String,
    pub qtype: RecordType,
    pub qclass: DNSClass,
    pub protocol: Protocol,
    pub device: Option<DeviceInfo>,
    pub profile: Option<ProfileInfo>,
    pub location: Option<Location>,
    pub filtering_group_id: String,
}

impl RequestInfo {
    pub fn is_anonymous(&self) -> bool {
        self.profile.is_none()
    }

    /// Normalizes a raw hostname the way the upstream transport hands
    /// questions to the core: lowercase, trailing dot stripped.
    pub fn normalize_host(raw: &str) -> String {
        raw.trim_end_matches('.').to_ascii_lowercase()
    }

    /// Shallow-copies this context with a new host, for the downstream
    /// call issued after a request-path CNAME rewrite (spec §4.7.2).
    pub fn with_rewritten_host(&self, new_host: String) -> Self {
        Self {
            host: new_host,
            ..self.clone()
        }
    }
}
