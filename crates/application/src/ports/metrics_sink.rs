use ferrous_dns_domain::location::{Continent, Country};
use std::net::IpAddr;
use std::time::Duration;

/// Per-query metrics emitted by the main middleware (spec §4.7.3).
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    pub remote_ip: IpAddr,
    pub country: Country,
    pub continent: Continent,
    pub asn: u32,
    pub filter_list_id: Option<String>,
    pub filtering_duration: Duration,
    pub is_anonymous: bool,
    pub is_blocked: bool,
}

/// Backend-agnostic counters/observations the core's hot paths report
/// (spec §4.2 `SetRecordCount`/rotation duration, §4.3 refresh
/// failures, §4.4 bytes-written). The concrete metrics backend is out
/// of scope (spec §1); only this port is consumed.
pub trait MetricsSinkPort: Send + Sync {
    fn observe_request(&self, metrics: &RequestMetrics);
    fn set_dnsdb_record_count(&self, count: usize);
    fn observe_dnsdb_rotation(&self, duration: Duration);
    fn observe_geoip_refresh_failure(&self);
    fn observe_geoip_refresh_success(&self, duration: Duration);
    fn observe_query_log_bytes_written(&self, bytes: usize);
}
