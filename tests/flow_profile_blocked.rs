//! Spec §8 scenario 2: a profiled request matches a block rule on the
//! request path. With the profile's default blocking mode left at
//! `NullIp`, the client gets a synthesized A 0.0.0.0/TTL=10 answer and
//! the query log records `resultCode = 2` (ReqBlocked).

mod common;

use common::*;
use ferrous_dns_application::use_cases::main_middleware::MainMiddleware;
use ferrous_dns_domain::blocking_mode::BlockingMode;
use ferrous_dns_domain::filter_result::{FilterResult, ResultCode};
use ferrous_dns_domain::request_info::{FilterConfig, ProfileInfo};
use ferrous_dns_infrastructure::messages::HickoryMessagesConstructor;
use hickory_proto::rr::RecordType;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn profile() -> ProfileInfo {
    ProfileInfo {
        id: "profile-1".into(),
        query_log_enabled: true,
        ip_log_enabled: true,
        filtering_enabled: true,
        blocking_mode: BlockingMode::NullIp,
        adult_blocking_mode: None,
        safe_browsing_blocking_mode: None,
        filter_config: FilterConfig {
            filtering_group_id: "group-1".into(),
        },
    }
}

#[tokio::test]
async fn blocked_request_gets_null_ip_answer_and_logs_result_code() {
    let filter_engine = Arc::new(ScriptedFilterEngine::default().with_request_result(
        "blocked.test",
        FilterResult::Blocked {
            list_id: "adware".into(),
            rule: "||blocked.test^".into(),
        },
    ));
    let downstream = Arc::new(
        ScriptedDownstream::default().with_answer("blocked.test", a_answer("blocked.test.", "5.6.7.8")),
    );
    let query_log = Arc::new(CapturingQueryLog::default());

    let middleware = MainMiddleware::new(
        filter_engine,
        downstream,
        Arc::new(CapturingResponseWriter::default()),
        Arc::new(HickoryMessagesConstructor::new()),
        Arc::new(NoopDnsDb),
        query_log.clone(),
        Arc::new(ScriptedGeoIp::default()),
        Arc::new(CapturingBilling::default()),
        Arc::new(CapturingRuleStats::default()),
        Arc::new(NoopMetrics),
        Arc::new(CapturingErrorCollector::default()),
        "adguard-dns.com".to_string(),
    );

    let request = query_message("blocked.test.", RecordType::A);
    let ri = request_info("blocked.test", RecordType::A, Some(profile()));
    let outgoing = middleware
        .wrap(request, &ri, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outgoing.answers().len(), 1);
    let record = &outgoing.answers()[0];
    assert_eq!(record.ttl(), 10);
    match record.data() {
        hickory_proto::rr::RData::A(a) => assert_eq!(a.0, std::net::Ipv4Addr::UNSPECIFIED),
        other => panic!("unexpected rdata: {other:?}"),
    }

    let entries = query_log.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].result_code, ResultCode::ReqBlocked);
    assert_eq!(entries[0].filter_list_id.as_deref(), Some("adware"));
}
