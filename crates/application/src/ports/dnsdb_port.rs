use ferrous_dns_domain::request_info::RequestInfo;
use hickory_proto::op::Message;

/// DNSDB ingestion contract the main middleware writes through
/// (spec §4.2 `Record`).
pub trait DnsDbPort: Send + Sync {
    fn record(&self, request_info: &RequestInfo, response: Option<&Message>);
}
