//! DNSDB engine (spec §4.2): owns an atomically-swappable
//! [`BoundedBuffer`], implements [`DnsDbPort`] for the main middleware,
//! and exposes `rotate()`/`serve_csv_dump()` for the HTTP surface and
//! the periodic rotation job.

use crate::dnsdb::buffer::{BoundedBuffer, ObservedAnswer};
use arc_swap::ArcSwap;
use ferrous_dns_application::ports::dnsdb_port::DnsDbPort;
use ferrous_dns_application::ports::metrics_sink::MetricsSinkPort;
use ferrous_dns_domain::dnsdb::is_android_metric_host;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::{RData, RecordType};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub struct DnsDbEngine {
    buffer: ArcSwap<BoundedBuffer>,
    max_size: usize,
    metrics: Arc<dyn MetricsSinkPort>,
}

impl DnsDbEngine {
    pub fn new(max_size: usize, metrics: Arc<dyn MetricsSinkPort>) -> Self {
        Self {
            buffer: ArcSwap::from_pointee(BoundedBuffer::new(max_size)),
            max_size,
            metrics,
        }
    }

    /// Spec §4.2 `Rotate()`: atomically swaps in a fresh empty buffer,
    /// returns the drained previous one's records.
    pub fn rotate(&self) -> Vec<ferrous_dns_domain::dnsdb::DnsDbRecord> {
        let start = Instant::now();
        let previous = self
            .buffer
            .swap(Arc::new(BoundedBuffer::new(self.max_size)));
        let records = previous.all();
        self.metrics.set_dnsdb_record_count(0);
        self.metrics.observe_dnsdb_rotation(start.elapsed());
        debug!(record_count = records.len(), "dnsdb rotated");
        records
    }

    fn answer_text_and_rr(record: &hickory_proto::rr::Record) -> Option<(String, RecordType)> {
        match record.data() {
            RData::A(a) => Some((a.0.to_string(), RecordType::A)),
            RData::AAAA(aaaa) => Some((aaaa.0.to_string(), RecordType::AAAA)),
            RData::CNAME(name) => Some((
                name.0.to_utf8().trim_end_matches('.').to_string(),
                RecordType::CNAME,
            )),
            _ => None,
        }
    }
}

impl DnsDbPort for DnsDbEngine {
    /// Spec §4.2 `Record`: drops nil/non-response/multi-question/non-
    /// NOERROR messages, Android-metric hosts, and non-A/AAAA questions
    /// before ingesting into the current buffer.
    fn record(&self, request_info: &ferrous_dns_domain::request_info::RequestInfo, response: Option<&Message>) {
        let Some(response) = response else {
            return;
        };
        if response.message_type() != MessageType::Response {
            return;
        }
        if response.queries().len() != 1 {
            return;
        }
        if response.response_code() != ResponseCode::NoError {
            return;
        }
        if !matches!(request_info.qtype, RecordType::A | RecordType::AAAA) {
            return;
        }
        if is_android_metric_host(&request_info.host) {
            return;
        }

        let answers: Vec<ObservedAnswer> = response
            .answers()
            .iter()
            .filter_map(|r| {
                Self::answer_text_and_rr(r).map(|(value, rr_type)| ObservedAnswer {
                    value,
                    rr_type,
                    rcode: response.response_code(),
                })
            })
            .collect();

        let (count, inserted) = self
            .buffer
            .load()
            .add(&request_info.host, request_info.qtype, &answers);
        if inserted {
            self.metrics.set_dnsdb_record_count(count);
        }
    }
}

/// Spec §6.1 CSV-dump body: `<fqdn>,<qtype-string>,<rcode-string>,<answer>,<hits>`,
/// no header row, streamed directly to `out` (gzip-wrapping, if any, is
/// the caller's concern — see `crate::dnsdb::csv_dump`).
pub fn write_csv<W: std::io::Write>(
    records: &[ferrous_dns_domain::dnsdb::DnsDbRecord],
    out: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    for record in records {
        writer.write_record(record.to_csv_fields())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrous_dns_application::ports::metrics_sink::RequestMetrics;
    use ferrous_dns_domain::request_info::{Protocol, RequestInfo};
    use hickory_proto::op::{Message, OpCode, Query};
    use hickory_proto::rr::rdata::A;
    use hickory_proto::rr::{DNSClass, Name, Record};
    use std::str::FromStr;
    use std::time::Duration;

    struct NoopMetrics;
    impl MetricsSinkPort for NoopMetrics {
        fn observe_request(&self, _metrics: &RequestMetrics) {}
        fn set_dnsdb_record_count(&self, _count: usize) {}
        fn observe_dnsdb_rotation(&self, _duration: Duration) {}
        fn observe_geoip_refresh_failure(&self) {}
        fn observe_geoip_refresh_success(&self, _duration: Duration) {}
        fn observe_query_log_bytes_written(&self, _bytes: usize) {}
    }

    fn request_info(host: &str) -> RequestInfo {
        RequestInfo {
            request_id: uuid::Uuid::nil(),
            remote_ip: "127.0.0.1".parse().unwrap(),
            local_addr: "127.0.0.1:53".parse().unwrap(),
            host: host.to_string(),
            qtype: RecordType::A,
            qclass: DNSClass::IN,
            protocol: Protocol::Udp,
            device: None,
            profile: None,
            location: None,
            filtering_group_id: "default".into(),
        }
    }

    fn a_response(name: &str, ip: &str) -> Message {
        let mut msg = Message::new(1, MessageType::Response, OpCode::Query);
        let mut query = Query::new();
        query.set_name(Name::from_str(name).unwrap());
        query.set_query_type(RecordType::A);
        msg.add_query(query);
        msg.add_answer(Record::from_rdata(
            Name::from_str(name).unwrap(),
            60,
            RData::A(A(ip.parse().unwrap())),
        ));
        msg
    }

    #[test]
    fn records_and_rotates() {
        let engine = DnsDbEngine::new(100, Arc::new(NoopMetrics));
        let ri = request_info("example.com");
        let resp = a_response("example.com", "1.2.3.4");
        engine.record(&ri, Some(&resp));
        engine.record(&ri, Some(&resp));

        let records = engine.rotate();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hits, 2);
        assert_eq!(records[0].answer_text, "1.2.3.4");

        // Buffer was swapped; a subsequent rotate starts from empty.
        assert!(engine.rotate().is_empty());
    }

    #[test]
    fn drops_non_noerror_and_wrong_qtype() {
        let engine = DnsDbEngine::new(100, Arc::new(NoopMetrics));
        let ri_txt = {
            let mut r = request_info("txt.example.com");
            r.qtype = RecordType::TXT;
            r
        };
        let resp = a_response("txt.example.com", "1.1.1.1");
        engine.record(&ri_txt, Some(&resp));
        assert!(engine.rotate().is_empty());

        let mut nx = a_response("nx.example.com", "1.1.1.1");
        nx.set_response_code(ResponseCode::NXDomain);
        engine.record(&request_info("nx.example.com"), Some(&nx));
        assert!(engine.rotate().is_empty());
    }

    #[test]
    fn drops_android_metric_host() {
        let engine = DnsDbEngine::new(100, Arc::new(NoopMetrics));
        let ri = request_info("connectivitycheck.gstatic.com");
        let resp = a_response("connectivitycheck.gstatic.com", "8.8.8.8");
        engine.record(&ri, Some(&resp));
        assert!(engine.rotate().is_empty());
    }

    #[test]
    fn csv_round_trip_preserves_fields() {
        let records = vec![ferrous_dns_domain::dnsdb::DnsDbRecord {
            domain_fqdn: "example.com".into(),
            answer_text: "1.2.3.4".into(),
            qtype: RecordType::A,
            rcode: ResponseCode::NoError,
            hits: 3,
        }];
        let mut buf = Vec::new();
        write_csv(&records, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes());
        let row: csv::StringRecord = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "example.com");
        assert_eq!(&row[1], "A");
        assert_eq!(&row[2], "NOERROR");
        assert_eq!(&row[3], "1.2.3.4");
        assert_eq!(&row[4], "3");
    }
}
