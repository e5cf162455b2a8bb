//! Periodic GeoIP refresh (SPEC_FULL §2): calls
//! [`GeoIpResolver::refresh`] on an interval. Spec §4.3 specifies the
//! `Refresh(ctx)` operation itself but not its trigger; this job
//! supplies the trigger in the teacher's `RetentionJob` idiom.

use ferrous_dns_infrastructure::geoip::GeoIpResolver;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct GeoipRefreshJob {
    resolver: Arc<GeoIpResolver>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl GeoipRefreshJob {
    pub fn new(resolver: Arc<GeoIpResolver>, interval_secs: u64) -> Self {
        Self {
            resolver,
            interval_secs,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Runs one refresh immediately, then on `interval_secs` thereafter.
    /// An initial failure is reported but does not stop the job -
    /// last-good state (possibly empty) remains in effect until the
    /// next tick (spec §4.3 "partial success is not allowed... last-good
    /// data remains in effect").
    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "Starting geoip refresh job");

        if let Err(e) = self.resolver.refresh().await {
            error!(error = %e, "initial geoip refresh failed");
        }

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await; // first tick fires immediately; already refreshed above
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("GeoipRefreshJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = self.resolver.refresh().await {
                            error!(error = %e, "geoip refresh failed");
                        }
                    }
                }
            }
        });
    }
}
