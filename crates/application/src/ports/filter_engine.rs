use async_trait::async_trait;
use ferrous_dns_domain::errors::CoreError;
use ferrous_dns_domain::filter_result::FilterResult;
use ferrous_dns_domain::request_info::{FilterConfig, RequestInfo};
use hickory_proto::op::Message;

/// The filter engine contract (spec §1: "only the `FilterRequest/
/// FilterResponse` contract is consumed"; rule storage and
/// safe-browsing RPC internals are external). An implementation lives
/// in `infrastructure` or beyond; this crate only calls through the
/// trait.
#[async_trait]
pub trait FilterEnginePort: Send + Sync {
    /// Filters the outbound question. `None` means no rule matched.
    async fn filter_request(
        &self,
        config: &FilterConfig,
        request: &Message,
        request_info: &RequestInfo,
    ) -> Result<Option<FilterResult>, CoreError>;

    /// Filters the upstream answer. `None` means no rule matched.
    async fn filter_response(
        &self,
        config: &FilterConfig,
        response: &Message,
        request_info: &RequestInfo,
    ) -> Result<Option<FilterResult>, CoreError>;
}
