use async_trait::async_trait;
use ferrous_dns_domain::errors::CoreError;
use ferrous_dns_domain::request_info::RequestInfo;
use hickory_proto::op::Message;

/// The next handler in the chain (spec §4.7 `next.ServeDNS`): upstream
/// resolution, cache, access/ratelimit layers — all out of scope
/// (spec §1), consumed only through this port.
#[async_trait]
pub trait DownstreamHandlerPort: Send + Sync {
    async fn serve_dns(
        &self,
        request: &Message,
        request_info: &RequestInfo,
    ) -> Result<Message, CoreError>;
}
