use ferrous_dns_domain::errors::CoreError;
use hickory_proto::op::Message;

/// Writes the final response to the client that sent `original_request`
/// (spec §4.7 `rw.WriteMsg`). Wire encoding and the network send are
/// out of scope (spec §1); this is the last port the core calls.
pub trait ResponseWriterPort: Send + Sync {
    fn write_msg(&self, original_request: &Message, response: &Message) -> Result<(), CoreError>;
}
