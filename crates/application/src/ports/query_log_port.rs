use async_trait::async_trait;
use ferrous_dns_domain::errors::CoreError;
use ferrous_dns_domain::query_log::QueryLogEntry;

/// Query-log writer contract (spec §4.4 `Write`).
#[async_trait]
pub trait QueryLogPort: Send + Sync {
    async fn write(&self, entry: QueryLogEntry) -> Result<(), CoreError>;
}
