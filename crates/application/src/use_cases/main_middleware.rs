//! Main filtering middleware (spec §4.7): wires filter -> upstream ->
//! response-filter -> response-synthesis -> telemetry -> debug.

use crate::ports::billing::BillingRecorderPort;
use crate::ports::dnsdb_port::DnsDbPort;
use crate::ports::downstream_handler::DownstreamHandlerPort;
use crate::ports::error_collector::ErrorCollectorPort;
use crate::ports::filter_engine::FilterEnginePort;
use crate::ports::geoip_port::GeoIpPort;
use crate::ports::messages_constructor::MessagesConstructorPort;
use crate::ports::metrics_sink::{MetricsSinkPort, RequestMetrics};
use crate::ports::query_log_port::QueryLogPort;
use crate::ports::response_writer::ResponseWriterPort;
use crate::ports::rule_stats::RuleStatsCollectorPort;
use crate::use_cases::debug_response::DebugResponseBuilder;
use crate::use_cases::filter_dispatch::{filter_blocking_mode, filtering_data, result_blocking_mode};
use chrono::Utc;
use ferrous_dns_domain::blocking_mode::BlockingMode;
use ferrous_dns_domain::dns_message::{is_unspecified, response_data};
use ferrous_dns_domain::errors::{AfterFilteringError, CoreError};
use ferrous_dns_domain::filter_result::{FilterResult, ResultCode};
use ferrous_dns_domain::location::Country;
use ferrous_dns_domain::query_log::QueryLogEntry;
use ferrous_dns_domain::request_info::{FilterConfig, RequestInfo};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub struct MainMiddleware {
    filter_engine: Arc<dyn FilterEnginePort>,
    downstream: Arc<dyn DownstreamHandlerPort>,
    response_writer: Arc<dyn ResponseWriterPort>,
    messages: Arc<dyn MessagesConstructorPort>,
    dnsdb: Arc<dyn DnsDbPort>,
    query_log: Arc<dyn QueryLogPort>,
    geoip: Arc<dyn GeoIpPort>,
    billing: Arc<dyn BillingRecorderPort>,
    rule_stats: Arc<dyn RuleStatsCollectorPort>,
    metrics: Arc<dyn MetricsSinkPort>,
    error_collector: Arc<dyn ErrorCollectorPort>,
    debug_suffix: String,
}

#[allow(clippy::too_many_arguments)]
impl MainMiddleware {
    pub fn new(
        filter_engine: Arc<dyn FilterEnginePort>,
        downstream: Arc<dyn DownstreamHandlerPort>,
        response_writer: Arc<dyn ResponseWriterPort>,
        messages: Arc<dyn MessagesConstructorPort>,
        dnsdb: Arc<dyn DnsDbPort>,
        query_log: Arc<dyn QueryLogPort>,
        geoip: Arc<dyn GeoIpPort>,
        billing: Arc<dyn BillingRecorderPort>,
        rule_stats: Arc<dyn RuleStatsCollectorPort>,
        metrics: Arc<dyn MetricsSinkPort>,
        error_collector: Arc<dyn ErrorCollectorPort>,
        debug_suffix: String,
    ) -> Self {
        Self {
            filter_engine,
            downstream,
            response_writer,
            messages,
            dnsdb,
            query_log,
            geoip,
            billing,
            rule_stats,
            metrics,
            error_collector,
            debug_suffix,
        }
    }

    /// Runs the end-to-end pipeline for one query (spec §4.7). Returns
    /// the message actually written to the client.
    pub async fn wrap(
        &self,
        mut original_request: Message,
        request_info: &RequestInfo,
        cancellation: &CancellationToken,
    ) -> Result<Message, AfterFilteringError> {
        let start = Instant::now();
        let request_started_at = Utc::now();

        let is_debug = original_request
            .queries()
            .first()
            .map(|q| q.query_class() == hickory_proto::rr::DNSClass::CH)
            .unwrap_or(false);
        if is_debug {
            for query in original_request.queries_mut() {
                query.set_query_class(hickory_proto::rr::DNSClass::IN);
            }
        }

        let filter_config = self.select_filter_config(request_info);

        let request_result = self
            .filter_request(&filter_config, &original_request, request_info)
            .await;

        if cancellation.is_cancelled() {
            return Err(AfterFilteringError::cancelled());
        }

        let modified_msg = match &request_result {
            Some(FilterResult::ModifiedRequest { modified_msg, .. }) => Some(modified_msg.clone()),
            _ => None,
        };

        let (downstream_request, downstream_info) = match &modified_msg {
            Some(modified) => {
                let new_host = modified
                    .queries()
                    .first()
                    .map(|q| RequestInfo::normalize_host(&q.name().to_utf8()))
                    .unwrap_or_else(|| request_info.host.clone());
                (modified.clone(), request_info.with_rewritten_host(new_host))
            }
            None => (original_request.clone(), request_info.clone()),
        };

        let mut original_response = self
            .downstream
            .serve_dns(&downstream_request, &downstream_info)
            .await
            .map_err(AfterFilteringError::new)?;

        let response_result = if let Some(modified) = &modified_msg {
            self.restore_and_prepend_cname(
                &mut original_response,
                &original_request,
                modified,
                request_info,
            );
            None
        } else {
            self.filter_response(&filter_config, &original_response, request_info)
                .await
        };

        let filtering_duration = start.elapsed();
        self.report_metrics(
            request_info,
            request_result.as_ref(),
            response_result.as_ref(),
            filtering_duration,
        );

        let filtered_response = self.set_filtered_response(
            &original_request,
            &original_response,
            request_info,
            request_result.as_ref(),
            response_result.as_ref(),
        );

        // Spec §4.7: "if fctx.isDebug: return writeDebugResponse(...)" -
        // the debug path writes and returns before billing, query-log,
        // and DNSDB recording ever run.
        if is_debug {
            let builder = DebugResponseBuilder::new(self.messages.as_ref(), self.debug_suffix.clone());
            let outgoing = match builder.build(
                filtered_response.clone(),
                request_info,
                request_result.as_ref(),
                response_result.as_ref(),
            ) {
                Ok(msg) => msg,
                Err(err) => {
                    self.error_collector
                        .report(Some(request_info.request_id), "debug_response", &err);
                    filtered_response.clone()
                }
            };

            if let Err(err) = self.response_writer.write_msg(&original_request, &outgoing) {
                self.error_collector
                    .report(Some(request_info.request_id), "write_msg", &err);
            }

            return Ok(outgoing);
        }

        if let Err(err) = self
            .response_writer
            .write_msg(&original_request, &filtered_response)
        {
            self.error_collector
                .report(Some(request_info.request_id), "write_msg", &err);
        }

        self.dnsdb.record(request_info, Some(&original_response));
        self.record_query_info(
            request_info,
            &original_response,
            &filtered_response,
            request_result.as_ref(),
            response_result.as_ref(),
            request_started_at,
            filtering_duration,
        )
        .await;

        Ok(filtered_response)
    }

    /// Spec §4.7.1.
    fn select_filter_config(&self, request_info: &RequestInfo) -> FilterConfig {
        match &request_info.profile {
            None => FilterConfig {
                filtering_group_id: request_info.filtering_group_id.clone(),
            },
            Some(profile) => {
                let device_filtering_enabled = request_info
                    .device
                    .as_ref()
                    .map(|d| d.filtering_enabled)
                    .unwrap_or(true);
                if profile.filtering_enabled && device_filtering_enabled {
                    profile.filter_config.clone()
                } else {
                    FilterConfig::default()
                }
            }
        }
    }

    async fn filter_request(
        &self,
        config: &FilterConfig,
        request: &Message,
        request_info: &RequestInfo,
    ) -> Option<FilterResult> {
        match self
            .filter_engine
            .filter_request(config, request, request_info)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                self.error_collector
                    .report(Some(request_info.request_id), "filter_request", &err);
                None
            }
        }
    }

    async fn filter_response(
        &self,
        config: &FilterConfig,
        response: &Message,
        request_info: &RequestInfo,
    ) -> Option<FilterResult> {
        match self
            .filter_engine
            .filter_response(config, response, request_info)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                self.error_collector
                    .report(Some(request_info.request_id), "filter_response", &err);
                None
            }
        }
    }

    /// Spec §4.6.2: restores ID/question, prepends the CNAME RR, skips
    /// `FilterResponse`.
    fn restore_and_prepend_cname(
        &self,
        response: &mut Message,
        original_request: &Message,
        modified_request: &Message,
        request_info: &RequestInfo,
    ) {
        response.set_id(original_request.id());
        if let (Some(original_query), Some(dst)) = (
            original_request.queries().first().cloned(),
            response.queries_mut().first_mut(),
        ) {
            *dst = original_query;
        }

        let original_name = original_request
            .queries()
            .first()
            .map(|q| q.name().to_utf8())
            .unwrap_or_default();
        let modified_name = modified_request
            .queries()
            .first()
            .map(|q| q.name().to_utf8())
            .unwrap_or_default();

        if let Err(err) = self.messages.prepend_cname(response, &original_name, &modified_name) {
            self.error_collector
                .report(Some(request_info.request_id), "prepend_cname", &err);
        }
    }

    /// Spec §4.6.4.
    fn set_filtered_response(
        &self,
        original_request: &Message,
        original_response: &Message,
        request_info: &RequestInfo,
        request_result: Option<&FilterResult>,
        response_result: Option<&FilterResult>,
    ) -> Message {
        match request_result {
            None => match response_result {
                None => original_response.clone(),
                Some(FilterResult::Allowed { .. }) => original_response.clone(),
                Some(FilterResult::Blocked { list_id, .. }) => {
                    let mode = result_blocking_mode(request_info.profile.as_ref(), list_id)
                        .unwrap_or_default();
                    self.synthesize_blocked(original_request, original_response, &mode, request_info)
                }
                Some(FilterResult::ModifiedRequest { .. })
                | Some(FilterResult::ModifiedResponse { .. }) => {
                    panic!(
                        "{}",
                        CoreError::Programmer(
                            "ModifiedRequest/ModifiedResponse is invalid in response-only dispatch"
                                .to_string()
                        )
                    );
                }
            },
            Some(FilterResult::Allowed { .. }) => original_response.clone(),
            Some(FilterResult::Blocked { list_id, .. }) => {
                let mode =
                    result_blocking_mode(request_info.profile.as_ref(), list_id).unwrap_or_default();
                self.synthesize_blocked(original_request, original_response, &mode, request_info)
            }
            Some(FilterResult::ModifiedRequest { list_id, .. }) => {
                match filter_blocking_mode(request_info.profile.as_ref(), list_id) {
                    Some(mode) => {
                        self.synthesize_blocked(original_request, original_response, &mode, request_info)
                    }
                    None => original_response.clone(),
                }
            }
            Some(FilterResult::ModifiedResponse {
                list_id,
                modified_msg,
                ..
            }) => match filter_blocking_mode(request_info.profile.as_ref(), list_id) {
                Some(mode) => {
                    self.synthesize_blocked(original_request, original_response, &mode, request_info)
                }
                None => modified_msg.clone(),
            },
        }
    }

    fn synthesize_blocked(
        &self,
        original_request: &Message,
        original_response: &Message,
        mode: &BlockingMode,
        request_info: &RequestInfo,
    ) -> Message {
        match self.messages.new_blocked_resp(original_request, mode) {
            Ok(msg) => msg,
            Err(err) => {
                self.error_collector
                    .report(Some(request_info.request_id), "synthesis", &err);
                original_response.clone()
            }
        }
    }

    /// Spec §4.7.3.
    fn report_metrics(
        &self,
        request_info: &RequestInfo,
        request_result: Option<&FilterResult>,
        response_result: Option<&FilterResult>,
        duration: Duration,
    ) {
        let data = filtering_data(request_result, response_result);
        let location = request_info.location.clone().unwrap_or_default();
        self.metrics.observe_request(&RequestMetrics {
            remote_ip: request_info.remote_ip,
            country: location.country,
            continent: location.continent,
            asn: location.asn,
            filter_list_id: data.list_id,
            filtering_duration: duration,
            is_anonymous: request_info.is_anonymous(),
            is_blocked: data.blocked,
        });
    }

    /// Spec §4.7.4.
    #[allow(clippy::too_many_arguments)]
    async fn record_query_info(
        &self,
        request_info: &RequestInfo,
        original_response: &Message,
        filtered_response: &Message,
        request_result: Option<&FilterResult>,
        response_result: Option<&FilterResult>,
        started_at: chrono::DateTime<Utc>,
        elapsed: Duration,
    ) {
        let data = filtering_data(request_result, response_result);
        self.rule_stats.collect(
            data.list_id.as_deref().unwrap_or(""),
            data.rule.as_deref().unwrap_or(""),
        );

        let Some(profile) = &request_info.profile else {
            return;
        };

        let location = request_info.location.clone().unwrap_or_default();
        self.billing.record(
            request_info.device.as_ref().map(|d| d.id.as_str()),
            location.country,
            location.asn,
            started_at,
            request_info.protocol,
        );

        if !profile.query_log_enabled {
            return;
        }

        let primary = response_data(Some(filtered_response));
        let answer_ip = if data.blocked {
            response_data(Some(original_response)).answer_ip
        } else {
            primary.answer_ip
        };

        let response_country = if primary.rcode != 0 || is_unspecified(answer_ip) {
            Country::NotApplicable
        } else {
            let geo_host = match request_result {
                Some(FilterResult::ModifiedRequest { modified_msg, .. }) => modified_msg
                    .queries()
                    .first()
                    .map(|q| RequestInfo::normalize_host(&q.name().to_utf8()))
                    .unwrap_or_else(|| request_info.host.clone()),
                _ => request_info.host.clone(),
            };
            match self.geoip.data(&geo_host, answer_ip) {
                Ok(Some(loc)) => loc.country,
                Ok(None) | Err(_) => Country::None,
            }
        };

        let (elapsed_ms, clamped) = QueryLogEntry::clamp_elapsed_ms(elapsed);
        if clamped {
            warn!(request_id = %request_info.request_id, "clamped elapsed to u32::MAX ms");
        }

        let (result_code, list_id, rule) =
            ResultCode::from_results(request_result, response_result);

        let entry = QueryLogEntry {
            request_id: request_info.request_id,
            profile_id: Some(profile.id.clone()),
            device_id: request_info.device.as_ref().map(|d| d.id.clone()),
            client_country: non_empty(request_info.location.as_ref().map(|l| l.country.as_str())),
            response_country: non_empty(Some(response_country.as_str())),
            domain_fqdn: request_info.host.clone(),
            filter_list_id: list_id.map(str::to_string),
            filter_rule: rule.map(str::to_string),
            request_timestamp_unix_ms: started_at.timestamp_millis(),
            client_asn: request_info.location.as_ref().map(|l| l.asn).unwrap_or(0),
            elapsed_ms,
            qtype: u16::from(request_info.qtype),
            rcode: primary.rcode,
            result_code,
            dnssec_validated: primary.dnssec_validated,
            protocol_code: request_info.protocol.code(),
            remote_ip: if profile.ip_log_enabled {
                Some(request_info.remote_ip)
            } else {
                None
            },
        };

        if let Err(err) = self.query_log.write(entry).await {
            self.error_collector
                .report(Some(request_info.request_id), "query_log_write", &err);
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}
