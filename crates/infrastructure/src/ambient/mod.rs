//! Tracing-backed default adapters for the ports that have no
//! dedicated backend in scope (spec §1: metrics/error-reporting/
//! billing backends are external systems). Every port the hot path
//! touches needs *a* concrete implementation to wire a binary together;
//! these log structurally instead of calling out to a real sink.

use chrono::{DateTime, Utc};
use ferrous_dns_application::ports::billing::BillingRecorderPort;
use ferrous_dns_application::ports::error_collector::ErrorCollectorPort;
use ferrous_dns_application::ports::metrics_sink::{MetricsSinkPort, RequestMetrics};
use ferrous_dns_application::ports::rule_stats::RuleStatsCollectorPort;
use ferrous_dns_domain::errors::CoreError;
use ferrous_dns_domain::location::Country;
use ferrous_dns_domain::request_info::Protocol;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Reports every non-fatal error through `tracing`, enriched with the
/// request ID when present (spec §7 "Collection policy").
#[derive(Debug, Default)]
pub struct TracingErrorCollector;

impl ErrorCollectorPort for TracingErrorCollector {
    fn report(&self, request_id: Option<Uuid>, context: &str, error: &CoreError) {
        warn!(request_id = ?request_id, context, error = %error, "core error reported");
    }
}

/// Emits every metric as a structured `tracing` event. Adequate for a
/// standalone binary; a real deployment wires a Prometheus/OTel
/// exporter behind the same port instead.
#[derive(Debug, Default)]
pub struct TracingMetricsSink;

impl MetricsSinkPort for TracingMetricsSink {
    fn observe_request(&self, metrics: &RequestMetrics) {
        info!(
            remote_ip = %metrics.remote_ip,
            country = metrics.country.as_str(),
            continent = metrics.continent.as_str(),
            asn = metrics.asn,
            filter_list_id = ?metrics.filter_list_id,
            filtering_duration_us = metrics.filtering_duration.as_micros() as u64,
            is_anonymous = metrics.is_anonymous,
            is_blocked = metrics.is_blocked,
            "request metrics"
        );
    }

    fn set_dnsdb_record_count(&self, count: usize) {
        info!(count, "dnsdb record count");
    }

    fn observe_dnsdb_rotation(&self, duration: Duration) {
        info!(duration_us = duration.as_micros() as u64, "dnsdb rotation");
    }

    fn observe_geoip_refresh_failure(&self) {
        warn!("geoip refresh failed");
    }

    fn observe_geoip_refresh_success(&self, duration: Duration) {
        info!(duration_ms = duration.as_millis() as u64, "geoip refresh succeeded");
    }

    fn observe_query_log_bytes_written(&self, bytes: usize) {
        info!(bytes, "query log bytes written");
    }
}

/// Logs rule hits instead of forwarding them to a stats backend.
#[derive(Debug, Default)]
pub struct TracingRuleStatsCollector;

impl RuleStatsCollectorPort for TracingRuleStatsCollector {
    fn collect(&self, list_id: &str, rule: &str) {
        info!(list_id, rule, "rule hit");
    }
}

/// Logs billing records instead of forwarding them to a usage-billing
/// uploader (spec §1: the uploader itself is external).
#[derive(Debug, Default)]
pub struct TracingBillingRecorder;

impl BillingRecorderPort for TracingBillingRecorder {
    fn record(
        &self,
        device_id: Option<&str>,
        country: Country,
        asn: u32,
        start_time: DateTime<Utc>,
        protocol: Protocol,
    ) {
        info!(
            device_id,
            country = country.as_str(),
            asn,
            start_time = %start_time,
            protocol = ?protocol,
            "billing record"
        );
    }
}
