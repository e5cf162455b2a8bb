use crate::{DnsdbRotationJob, GeoipRefreshJob};
use std::sync::Arc;
use tracing::info;

/// Central orchestrator for the core's background jobs. Register what
/// the deployment needs, then call `.start()` once.
pub struct JobRunner {
    dnsdb_rotation: Option<DnsdbRotationJob>,
    geoip_refresh: Option<GeoipRefreshJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            dnsdb_rotation: None,
            geoip_refresh: None,
        }
    }

    pub fn with_dnsdb_rotation(mut self, job: DnsdbRotationJob) -> Self {
        self.dnsdb_rotation = Some(job);
        self
    }

    pub fn with_geoip_refresh(mut self, job: GeoipRefreshJob) -> Self {
        self.geoip_refresh = Some(job);
        self
    }

    pub async fn start(self) {
        info!("Starting background job runner");

        if let Some(job) = self.dnsdb_rotation {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.geoip_refresh {
            Arc::new(job).start().await;
        }

        info!("All background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
