use ferrous_dns_application::ports::metrics_sink::{MetricsSinkPort, RequestMetrics};
use ferrous_dns_domain::config::GeoIpConfig;
use ferrous_dns_infrastructure::geoip::GeoIpResolver;
use ferrous_dns_jobs::GeoipRefreshJob;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct NoopMetrics;
impl MetricsSinkPort for NoopMetrics {
    fn observe_request(&self, _metrics: &RequestMetrics) {}
    fn set_dnsdb_record_count(&self, _count: usize) {}
    fn observe_dnsdb_rotation(&self, _duration: Duration) {}
    fn observe_geoip_refresh_failure(&self) {}
    fn observe_geoip_refresh_success(&self, _duration: Duration) {}
    fn observe_query_log_bytes_written(&self, _bytes: usize) {}
}

#[tokio::test]
async fn missing_mmdb_paths_fail_refresh_without_panicking() {
    // Spec §4.3/§7: a failed refresh leaves prior (here: empty)
    // state in place and is reported, not fatal to the process.
    let config = GeoIpConfig {
        asn_db_path: "/nonexistent/asn.mmdb".into(),
        country_db_path: "/nonexistent/country.mmdb".into(),
        ..GeoIpConfig::default()
    };
    let resolver = Arc::new(GeoIpResolver::new(config, Arc::new(NoopMetrics)));
    let shutdown = CancellationToken::new();
    let job = Arc::new(
        GeoipRefreshJob::new(resolver.clone(), 3600).with_cancellation(shutdown.clone()),
    );

    job.start().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();

    use ferrous_dns_application::ports::geoip_port::{AddressFamily, GeoIpPort};
    use ferrous_dns_domain::location::Location;
    let net = resolver.subnet_by_location(&Location::default(), AddressFamily::V4);
    assert_eq!(net.prefix(), 0);
}
