//! Shared fakes for the end-to-end flow tests (spec §8 seed scenarios).
//! Each fake implements one `ferrous-dns-application` port with just
//! enough behavior to drive the main middleware through a scenario;
//! none of them touch real I/O.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ferrous_dns_application::ports::billing::BillingRecorderPort;
use ferrous_dns_application::ports::dnsdb_port::DnsDbPort;
use ferrous_dns_application::ports::downstream_handler::DownstreamHandlerPort;
use ferrous_dns_application::ports::error_collector::ErrorCollectorPort;
use ferrous_dns_application::ports::filter_engine::FilterEnginePort;
use ferrous_dns_application::ports::geoip_port::{AddressFamily, GeoIpPort};
use ferrous_dns_application::ports::metrics_sink::{MetricsSinkPort, RequestMetrics};
use ferrous_dns_application::ports::query_log_port::QueryLogPort;
use ferrous_dns_application::ports::response_writer::ResponseWriterPort;
use ferrous_dns_application::ports::rule_stats::RuleStatsCollectorPort;
use ferrous_dns_domain::errors::CoreError;
use ferrous_dns_domain::filter_result::FilterResult;
use ferrous_dns_domain::location::Location;
use ferrous_dns_domain::query_log::QueryLogEntry;
use ferrous_dns_domain::request_info::{FilterConfig, Protocol, RequestInfo};
use hickory_proto::op::Message;
use ipnetwork::IpNetwork;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// Scripted request/response filter verdicts, keyed by the question's
/// normalized host.
#[derive(Default)]
pub struct ScriptedFilterEngine {
    pub request_results: Mutex<HashMap<String, FilterResult>>,
    pub response_results: Mutex<HashMap<String, FilterResult>>,
}

impl ScriptedFilterEngine {
    pub fn with_request_result(self, host: &str, result: FilterResult) -> Self {
        self.request_results
            .lock()
            .unwrap()
            .insert(host.to_string(), result);
        self
    }
}

#[async_trait]
impl FilterEnginePort for ScriptedFilterEngine {
    async fn filter_request(
        &self,
        _config: &FilterConfig,
        _request: &Message,
        request_info: &RequestInfo,
    ) -> Result<Option<FilterResult>, CoreError> {
        Ok(self
            .request_results
            .lock()
            .unwrap()
            .get(&request_info.host)
            .cloned())
    }

    async fn filter_response(
        &self,
        _config: &FilterConfig,
        _response: &Message,
        request_info: &RequestInfo,
    ) -> Result<Option<FilterResult>, CoreError> {
        Ok(self
            .response_results
            .lock()
            .unwrap()
            .get(&request_info.host)
            .cloned())
    }
}

/// Returns a scripted upstream answer keyed by the query's normalized
/// host, defaulting to a bare NOERROR/no-answer response.
#[derive(Default)]
pub struct ScriptedDownstream {
    pub answers: Mutex<HashMap<String, Message>>,
}

impl ScriptedDownstream {
    pub fn with_answer(self, host: &str, message: Message) -> Self {
        self.answers.lock().unwrap().insert(host.to_string(), message);
        self
    }
}

#[async_trait]
impl DownstreamHandlerPort for ScriptedDownstream {
    async fn serve_dns(
        &self,
        request: &Message,
        _request_info: &RequestInfo,
    ) -> Result<Message, CoreError> {
        let host = request
            .queries()
            .first()
            .map(|q| RequestInfo::normalize_host(&q.name().to_utf8()))
            .unwrap_or_default();
        match self.answers.lock().unwrap().get(&host) {
            Some(msg) => Ok(msg.clone()),
            None => {
                let mut resp = Message::new(
                    request.id(),
                    hickory_proto::op::MessageType::Response,
                    request.op_code(),
                );
                if let Some(q) = request.queries().first() {
                    resp.add_query(q.clone());
                }
                Ok(resp)
            }
        }
    }
}

/// Captures the single message handed to `write_msg`.
#[derive(Default)]
pub struct CapturingResponseWriter {
    pub written: Mutex<Option<Message>>,
}

impl ResponseWriterPort for CapturingResponseWriter {
    fn write_msg(&self, _original_request: &Message, response: &Message) -> Result<(), CoreError> {
        *self.written.lock().unwrap() = Some(response.clone());
        Ok(())
    }
}

/// Captures every query-log entry instead of serializing to disk.
#[derive(Default)]
pub struct CapturingQueryLog {
    pub entries: Mutex<Vec<QueryLogEntry>>,
}

#[async_trait]
impl QueryLogPort for CapturingQueryLog {
    async fn write(&self, entry: QueryLogEntry) -> Result<(), CoreError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

/// Captures billing calls.
#[derive(Default)]
pub struct CapturingBilling {
    pub calls: Mutex<Vec<(Option<String>, Protocol)>>,
}

impl BillingRecorderPort for CapturingBilling {
    fn record(
        &self,
        device_id: Option<&str>,
        _country: ferrous_dns_domain::location::Country,
        _asn: u32,
        _start_time: DateTime<Utc>,
        protocol: Protocol,
    ) {
        self.calls
            .lock()
            .unwrap()
            .push((device_id.map(str::to_string), protocol));
    }
}

#[derive(Default)]
pub struct CapturingRuleStats {
    pub hits: Mutex<Vec<(String, String)>>,
}

impl RuleStatsCollectorPort for CapturingRuleStats {
    fn collect(&self, list_id: &str, rule: &str) {
        self.hits.lock().unwrap().push((list_id.to_string(), rule.to_string()));
    }
}

#[derive(Default)]
pub struct NoopMetrics;

impl MetricsSinkPort for NoopMetrics {
    fn observe_request(&self, _metrics: &RequestMetrics) {}
    fn set_dnsdb_record_count(&self, _count: usize) {}
    fn observe_dnsdb_rotation(&self, _duration: Duration) {}
    fn observe_geoip_refresh_failure(&self) {}
    fn observe_geoip_refresh_success(&self, _duration: Duration) {}
    fn observe_query_log_bytes_written(&self, _bytes: usize) {}
}

#[derive(Default)]
pub struct CapturingErrorCollector {
    pub reports: Mutex<Vec<(Option<Uuid>, String)>>,
}

impl ErrorCollectorPort for CapturingErrorCollector {
    fn report(&self, request_id: Option<Uuid>, context: &str, _error: &CoreError) {
        self.reports.lock().unwrap().push((request_id, context.to_string()));
    }
}

/// Scripted GeoIP responses keyed by host.
#[derive(Default)]
pub struct ScriptedGeoIp {
    pub by_host: Mutex<HashMap<String, Location>>,
}

impl ScriptedGeoIp {
    pub fn with_location(self, host: &str, location: Location) -> Self {
        self.by_host.lock().unwrap().insert(host.to_string(), location);
        self
    }
}

/// Discards every record; used by flows that don't assert on DNSDB.
#[derive(Default)]
pub struct NoopDnsDb;

impl DnsDbPort for NoopDnsDb {
    fn record(&self, _request_info: &RequestInfo, _response: Option<&Message>) {}
}

/// Counts `record` calls; used by flows asserting DNSDB was (not) touched.
#[derive(Default)]
pub struct CapturingDnsDb {
    pub calls: Mutex<usize>,
}

impl DnsDbPort for CapturingDnsDb {
    fn record(&self, _request_info: &RequestInfo, _response: Option<&Message>) {
        *self.calls.lock().unwrap() += 1;
    }
}

impl GeoIpPort for ScriptedGeoIp {
    fn data(&self, host: &str, _ip: IpAddr) -> Result<Option<Location>, CoreError> {
        Ok(self.by_host.lock().unwrap().get(host).cloned())
    }

    fn subnet_by_location(&self, _location: &Location, family: AddressFamily) -> IpNetwork {
        let is_v6 = matches!(family, AddressFamily::V6);
        ferrous_dns_infrastructure::geoip::subnet_map::zero_prefix(is_v6)
    }
}

/// Builds a bare query message for `name`/`qtype`, class IN.
pub fn query_message(name: &str, qtype: hickory_proto::rr::RecordType) -> Message {
    use hickory_proto::op::{MessageType, OpCode, Query};
    use hickory_proto::rr::Name;
    use std::str::FromStr;

    let mut msg = Message::new(42, MessageType::Query, OpCode::Query);
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(qtype);
    msg.add_query(query);
    msg
}

/// A plain `RequestInfo` for `host`, anonymous unless `profile` is set.
pub fn request_info(
    host: &str,
    qtype: hickory_proto::rr::RecordType,
    profile: Option<ferrous_dns_domain::request_info::ProfileInfo>,
) -> RequestInfo {
    RequestInfo {
        request_id: Uuid::nil(),
        remote_ip: "192.168.1.100".parse().unwrap(),
        local_addr: "10.0.0.1:53".parse().unwrap(),
        host: host.to_string(),
        qtype,
        qclass: hickory_proto::rr::DNSClass::IN,
        protocol: Protocol::Udp,
        device: None,
        profile,
        location: None,
        filtering_group_id: "default".to_string(),
    }
}

/// Answer message for `name A ip`, NOERROR.
pub fn a_answer(name: &str, ip: &str) -> Message {
    use hickory_proto::op::{MessageType, OpCode, Query};
    use hickory_proto::rr::rdata::A;
    use hickory_proto::rr::{Name, RData, Record};
    use std::str::FromStr;

    let mut msg = Message::new(1, MessageType::Response, OpCode::Query);
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(hickory_proto::rr::RecordType::A);
    msg.add_query(query);
    msg.add_answer(Record::from_rdata(
        Name::from_str(name).unwrap(),
        60,
        RData::A(A(ip.parse().unwrap())),
    ));
    msg
}
