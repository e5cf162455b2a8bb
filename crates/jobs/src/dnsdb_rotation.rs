//! Periodic DNSDB rotation (SPEC_FULL §2 "Supplemented features"):
//! every `interval_secs`, rotate the live buffer and persist the drained
//! records as a gzip CSV snapshot under `dump_dir`. Spec §4.2 defines
//! `Rotate()` as invoked on demand by `ServeCSVDump`; this job is an
//! additional periodic consumer of the same operation, in the teacher's
//! `RetentionJob` idiom.

use ferrous_dns_infrastructure::dnsdb::engine::{write_csv, DnsDbEngine};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct DnsdbRotationJob {
    engine: Arc<DnsDbEngine>,
    dump_dir: PathBuf,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl DnsdbRotationJob {
    pub fn new(engine: Arc<DnsDbEngine>, dump_dir: impl Into<PathBuf>, interval_secs: u64) -> Self {
        Self {
            engine,
            dump_dir: dump_dir.into(),
            interval_secs,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.interval_secs,
            dump_dir = %self.dump_dir.display(),
            "Starting dnsdb rotation job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("DnsdbRotationJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = self.rotate_and_dump().await {
                            error!(error = %e, "dnsdb rotation dump failed");
                        }
                    }
                }
            }
        });
    }

    async fn rotate_and_dump(&self) -> std::io::Result<()> {
        let records = self.engine.rotate();
        let count = records.len();
        let dump_dir = self.dump_dir.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            std::fs::create_dir_all(&dump_dir)?;
            let file_name = dump_dir.join(format!("dnsdb-{}.csv.gz", rotation_file_stamp()));
            let file = std::fs::File::create(&file_name)?;
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            write_csv(&records, encoder)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))??;
        info!(record_count = count, "dnsdb rotation dump written");
        Ok(())
    }
}

/// Monotonic per-process counter giving each rotation tick a distinct
/// file name without depending on wall-clock resolution.
fn rotation_file_stamp() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
