//! File-backed query-log writer (spec §4.4, §6.2).

use crate::pool::StringBufferPool;
use async_trait::async_trait;
use ferrous_dns_application::ports::metrics_sink::MetricsSinkPort;
use ferrous_dns_application::ports::query_log_port::QueryLogPort;
use ferrous_dns_domain::errors::CoreError;
use ferrous_dns_domain::query_log::{JsonlEntry, QueryLogEntry};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub struct FileQueryLogWriter {
    destination_path: PathBuf,
    pool: StringBufferPool,
    metrics: Arc<dyn MetricsSinkPort>,
}

impl FileQueryLogWriter {
    pub fn new(destination_path: impl Into<PathBuf>, pool_size: usize, metrics: Arc<dyn MetricsSinkPort>) -> Self {
        Self {
            destination_path: destination_path.into(),
            pool: StringBufferPool::new(pool_size),
            metrics,
        }
    }

    fn render(&self, entry: &QueryLogEntry) -> Result<String, CoreError> {
        let random_tag = fastrand::u16(..);
        let jsonl = JsonlEntry::from_entry(entry, random_tag);
        jsonl
            .to_jsonl_line()
            .map_err(|e| CoreError::QueryLogWrite(e.to_string()))
    }

    fn append(&self, line: &str) -> Result<usize, CoreError> {
        let mut options = std::fs::OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.destination_path)
            .map_err(|e| CoreError::QueryLogWrite(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| CoreError::QueryLogWrite(e.to_string()))?;
        Ok(line.len())
    }
}

#[async_trait]
impl QueryLogPort for FileQueryLogWriter {
    async fn write(&self, entry: QueryLogEntry) -> Result<(), CoreError> {
        let (_, clamped) = QueryLogEntry::clamp_elapsed_ms(std::time::Duration::from_millis(entry.elapsed_ms as u64));
        if clamped {
            warn!(request_id = %entry.request_id, "query-log elapsed clamped to u32::MAX");
        }

        let mut buffer = self.pool.acquire();
        buffer.clear();
        let rendered = self.render(&entry)?;
        buffer.push_str(&rendered);

        let result = self.append(&buffer);
        self.pool.release(buffer);

        let bytes = result?;
        self.metrics.observe_query_log_bytes_written(bytes);
        Ok(())
    }
}
