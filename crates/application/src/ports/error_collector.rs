use ferrous_dns_domain::errors::CoreError;
use uuid::Uuid;

/// Single error-collector interface all non-fatal errors pass through
/// (spec §7 "Collection policy"). The middleware enriches with the
/// request ID from context where available.
pub trait ErrorCollectorPort: Send + Sync {
    fn report(&self, request_id: Option<Uuid>, context: &str, error: &CoreError);
}
