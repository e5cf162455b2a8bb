use ferrous_dns_domain::blocking_mode::BlockingMode;
use ferrous_dns_domain::errors::CoreError;
use hickory_proto::op::Message;

/// One key/value datum for the debug CHAOS TXT response (spec §4.8).
#[derive(Debug, Clone)]
pub struct DebugDatum {
    pub owner_name: String,
    pub text: String,
}

/// Response-synthesis contract (spec §3 RequestInfo "messages
/// constructor (response synthesizer)"). Building DNS wire messages is
/// otherwise out of scope (spec §1); the core only asks this port to
/// produce the few synthetic shapes it needs.
pub trait MessagesConstructorPort: Send + Sync {
    /// Builds a blocked response for `original_request` under `mode`
    /// (spec §4.6.4).
    fn new_blocked_resp(
        &self,
        original_request: &Message,
        mode: &BlockingMode,
    ) -> Result<Message, CoreError>;

    /// Prepends a CNAME RR `original_name -> modified_name` to the
    /// front of `response`'s answer section (spec §4.6.2).
    fn prepend_cname(
        &self,
        response: &mut Message,
        original_name: &str,
        modified_name: &str,
    ) -> Result<(), CoreError>;

    /// Appends one TXT RR built from `datum` to `response`'s additional
    /// section (spec §4.8 `AppendDebugExtra`).
    fn append_debug_extra(
        &self,
        response: &mut Message,
        datum: &DebugDatum,
    ) -> Result<(), CoreError>;
}
