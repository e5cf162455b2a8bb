//! Composition root for the Ferrous DNS filtering core.
//!
//! The DNS wire transport, upstream recursor, and filter-rule engine
//! are external collaborators this binary does not implement (see
//! DESIGN.md): wiring `MainMiddleware` to real traffic is the host
//! application's job. What this binary assembles is everything the
//! core itself owns outright — the GeoIP resolver, the DNSDB engine
//! and its CSV-dump HTTP surface, the query-log writer, and the
//! periodic background jobs that keep GeoIP and DNSDB fresh.

mod bootstrap;
mod config;

use axum::routing::post;
use axum::Router;
use clap::Parser;
use ferrous_dns_application::ports::metrics_sink::MetricsSinkPort;
use ferrous_dns_infrastructure::ambient::TracingMetricsSink;
use ferrous_dns_infrastructure::dnsdb::csv_dump_handler;
use ferrous_dns_infrastructure::{DnsDbEngine, FileQueryLogWriter, GeoIpResolver};
use ferrous_dns_jobs::{DnsdbRotationJob, GeoipRefreshJob, JobRunner};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Parser)]
#[command(name = "ferrous-dns")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ferrous DNS filtering core: GeoIP, DNSDB, and query-log services")]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short = 'c', long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = bootstrap::load_config(cli.config.as_deref())?;
    bootstrap::init_logging(&config);

    let metrics: Arc<dyn MetricsSinkPort> = Arc::new(TracingMetricsSink);
    let shutdown = CancellationToken::new();

    let geoip = Arc::new(GeoIpResolver::new(config.geoip.clone(), metrics.clone()));
    let dnsdb = Arc::new(DnsDbEngine::new(config.dnsdb.max_size, metrics.clone()));
    let _query_log = Arc::new(FileQueryLogWriter::new(
        config.querylog.destination_path.clone(),
        config.querylog.pool_size,
        metrics.clone(),
    ));

    let geoip_job = GeoipRefreshJob::new(geoip.clone(), config.geoip.refresh_interval_secs)
        .with_cancellation(shutdown.clone());
    let dnsdb_job = DnsdbRotationJob::new(
        dnsdb.clone(),
        config.dnsdb.dump_dir.clone(),
        config.dnsdb.rotate_interval_secs,
    )
    .with_cancellation(shutdown.clone());

    JobRunner::new()
        .with_geoip_refresh(geoip_job)
        .with_dnsdb_rotation(dnsdb_job)
        .start()
        .await;

    let app = Router::new()
        .route("/dnsdb/csv", post(csv_dump_handler))
        .with_state(dnsdb)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(bind_address = %config.bind_address, "DNSDB CSV-dump surface listening");

    let serve = axum::serve(listener, app);
    tokio::select! {
        result = serve => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            shutdown.cancel();
        }
    }

    Ok(())
}
