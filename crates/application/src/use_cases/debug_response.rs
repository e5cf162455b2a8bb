//! Debug CHAOS TXT response builder (spec §4.8, §6.3).

use crate::ports::messages_constructor::{DebugDatum, MessagesConstructorPort};
use ferrous_dns_domain::errors::CoreError;
use ferrous_dns_domain::filter_result::FilterResult;
use ferrous_dns_domain::request_info::RequestInfo;
use hickory_proto::op::Message;
use hickory_proto::rr::DNSClass;

fn res_type_str(result: Option<&FilterResult>) -> &'static str {
    match result {
        None => "normal",
        Some(FilterResult::Allowed { .. }) => "allowed",
        Some(FilterResult::Blocked { .. }) => "blocked",
        Some(FilterResult::ModifiedRequest { .. }) | Some(FilterResult::ModifiedResponse { .. }) => {
            "modified"
        }
    }
}

pub struct DebugResponseBuilder<'a> {
    messages: &'a dyn MessagesConstructorPort,
    suffix: String,
}

impl<'a> DebugResponseBuilder<'a> {
    pub fn new(messages: &'a dyn MessagesConstructorPort, suffix: String) -> Self {
        Self { messages, suffix }
    }

    fn owner(&self, prefix: &str, name: &str) -> String {
        if prefix.is_empty() {
            format!("{name}.{}.", self.suffix)
        } else {
            format!("{prefix}.{name}.{}.", self.suffix)
        }
    }

    fn push(&self, response: &mut Message, prefix: &str, name: &str, text: String) -> Result<(), CoreError> {
        let datum = DebugDatum {
            owner_name: self.owner(prefix, name),
            text,
        };
        self.messages.append_debug_extra(response, &datum)
    }

    /// Builds the CHAOS-class debug response in place. `filtered_response`
    /// is the response whose answer section is mirrored (spec §4.8
    /// "the answer section mirrors the filteredResponse") and that
    /// already carries the EXTRA TXT records appended by this call.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        &self,
        mut filtered_response: Message,
        request_info: &RequestInfo,
        request_result: Option<&FilterResult>,
        response_result: Option<&FilterResult>,
    ) -> Result<Message, CoreError> {
        filtered_response.set_message_type(hickory_proto::op::MessageType::Response);
        for query in filtered_response.queries_mut() {
            query.set_query_class(DNSClass::CH);
        }

        self.push(
            &mut filtered_response,
            "",
            "client-ip",
            request_info.remote_ip.to_string(),
        )?;
        self.push(
            &mut filtered_response,
            "",
            "server-ip",
            request_info.local_addr.ip().to_string(),
        )?;
        self.push(
            &mut filtered_response,
            "",
            "device-id",
            request_info
                .device
                .as_ref()
                .map(|d| d.id.clone())
                .unwrap_or_default(),
        )?;
        self.push(
            &mut filtered_response,
            "",
            "profile-id",
            request_info
                .profile
                .as_ref()
                .map(|p| p.id.clone())
                .unwrap_or_default(),
        )?;

        let location = request_info.location.clone().unwrap_or_default();
        self.push(
            &mut filtered_response,
            "",
            "country",
            location.country.as_str().to_string(),
        )?;
        self.push(&mut filtered_response, "", "asn", location.asn.to_string())?;
        self.push(
            &mut filtered_response,
            "",
            "subdivision",
            location.top_subdivision.clone(),
        )?;

        for (prefix, result) in [("req", request_result), ("resp", response_result)] {
            self.push(
                &mut filtered_response,
                prefix,
                "res-type",
                res_type_str(result).to_string(),
            )?;
            if let Some(result) = result {
                self.push(&mut filtered_response, prefix, "rule", result.rule().to_string())?;
                self.push(
                    &mut filtered_response,
                    prefix,
                    "rule-list-id",
                    result.list_id().to_string(),
                )?;
            }
        }

        Ok(filtered_response)
    }
}
