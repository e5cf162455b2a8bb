//! Hickory-backed [`MessagesConstructorPort`] (spec §4.6.4, §4.6.2,
//! §4.8). Builds the few synthetic response shapes the core needs;
//! general wire parsing/serialization stays with the transport.

use ferrous_dns_application::ports::messages_constructor::{DebugDatum, MessagesConstructorPort};
use ferrous_dns_domain::blocking_mode::{BlockingMode, FILTERED_RESPONSE_TTL};
use ferrous_dns_domain::errors::CoreError;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, TXT};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

pub struct HickoryMessagesConstructor {
    /// Fallback custom addresses used when a `CustomIp` mode leaves a
    /// family unset but the question asked for it anyway.
    default_ipv4: Ipv4Addr,
    default_ipv6: Ipv6Addr,
}

impl Default for HickoryMessagesConstructor {
    fn default() -> Self {
        Self {
            default_ipv4: Ipv4Addr::UNSPECIFIED,
            default_ipv6: Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl HickoryMessagesConstructor {
    pub fn new() -> Self {
        Self::default()
    }

    fn blocked_answer(&self, name: &Name, qtype: RecordType, mode: &BlockingMode) -> Option<Record> {
        match mode {
            BlockingMode::NullIp => match qtype {
                RecordType::A => Some(Record::from_rdata(
                    name.clone(),
                    FILTERED_RESPONSE_TTL,
                    RData::A(A(Ipv4Addr::UNSPECIFIED)),
                )),
                RecordType::AAAA => Some(Record::from_rdata(
                    name.clone(),
                    FILTERED_RESPONSE_TTL,
                    RData::AAAA(AAAA(Ipv6Addr::UNSPECIFIED)),
                )),
                _ => None,
            },
            BlockingMode::CustomIp { ipv4, ipv6 } => match qtype {
                RecordType::A => {
                    let addr = match ipv4 {
                        Some(std::net::IpAddr::V4(v4)) => *v4,
                        _ => self.default_ipv4,
                    };
                    Some(Record::from_rdata(
                        name.clone(),
                        FILTERED_RESPONSE_TTL,
                        RData::A(A(addr)),
                    ))
                }
                RecordType::AAAA => {
                    let addr = match ipv6 {
                        Some(std::net::IpAddr::V6(v6)) => *v6,
                        _ => self.default_ipv6,
                    };
                    Some(Record::from_rdata(
                        name.clone(),
                        FILTERED_RESPONSE_TTL,
                        RData::AAAA(AAAA(addr)),
                    ))
                }
                _ => None,
            },
            BlockingMode::NxDomain | BlockingMode::Refused | BlockingMode::UnspecifiedTtl => None,
        }
    }
}

impl MessagesConstructorPort for HickoryMessagesConstructor {
    fn new_blocked_resp(
        &self,
        original_request: &Message,
        mode: &BlockingMode,
    ) -> Result<Message, CoreError> {
        let query = original_request
            .queries()
            .first()
            .ok_or_else(|| CoreError::Synthesis("request has no question".to_string()))?
            .clone();

        let mut response = Message::new(
            original_request.id(),
            MessageType::Response,
            original_request.op_code(),
        );
        response.add_query(query.clone());
        response.set_recursion_desired(original_request.recursion_desired());
        response.set_recursion_available(true);

        response.set_response_code(match mode {
            BlockingMode::NxDomain => ResponseCode::NXDomain,
            BlockingMode::Refused => ResponseCode::Refused,
            _ => ResponseCode::NoError,
        });

        if let Some(record) = self.blocked_answer(query.name(), query.query_type(), mode) {
            response.add_answer(record);
        }

        Ok(response)
    }

    fn prepend_cname(
        &self,
        response: &mut Message,
        original_name: &str,
        modified_name: &str,
    ) -> Result<(), CoreError> {
        let owner = Name::from_str(original_name)
            .map_err(|e| CoreError::Synthesis(format!("invalid original name: {e}")))?;
        let target = Name::from_str(modified_name)
            .map_err(|e| CoreError::Synthesis(format!("invalid modified name: {e}")))?;

        let cname_record = Record::from_rdata(owner, FILTERED_RESPONSE_TTL, RData::CNAME(CNAME(target)));

        let mut answers: Vec<Record> = Vec::with_capacity(response.answers().len() + 1);
        answers.push(cname_record);
        answers.extend(response.answers().iter().cloned());
        response.answers_mut().clear();
        for record in answers {
            response.add_answer(record);
        }
        Ok(())
    }

    fn append_debug_extra(&self, response: &mut Message, datum: &DebugDatum) -> Result<(), CoreError> {
        let owner = Name::from_str(&datum.owner_name)
            .map_err(|e| CoreError::Synthesis(format!("invalid debug owner name: {e}")))?;
        let record = Record::from_rdata(
            owner,
            FILTERED_RESPONSE_TTL,
            RData::TXT(TXT::new(vec![datum.text.clone()])),
        );
        response.add_additional(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::{OpCode, Query};

    fn request(name: &str, qtype: RecordType) -> Message {
        let mut msg = Message::new(42, MessageType::Query, OpCode::Query);
        let mut query = Query::new();
        query.set_name(Name::from_str(name).unwrap());
        query.set_query_type(qtype);
        msg.add_query(query);
        msg
    }

    #[test]
    fn null_ip_blocks_a_with_zero_address() {
        let constructor = HickoryMessagesConstructor::new();
        let req = request("blocked.test.", RecordType::A);
        let resp = constructor
            .new_blocked_resp(&req, &BlockingMode::NullIp)
            .unwrap();
        assert_eq!(resp.response_code(), ResponseCode::NoError);
        assert_eq!(resp.answers().len(), 1);
        match resp.answers()[0].data() {
            RData::A(a) => assert_eq!(a.0, Ipv4Addr::UNSPECIFIED),
            other => panic!("unexpected rdata: {other:?}"),
        }
        assert_eq!(resp.answers()[0].ttl(), FILTERED_RESPONSE_TTL);
    }

    #[test]
    fn custom_ip_uses_configured_address() {
        let constructor = HickoryMessagesConstructor::new();
        let req = request("safe-browsing.test.", RecordType::A);
        let mode = BlockingMode::CustomIp {
            ipv4: Some("3.3.3.3".parse().unwrap()),
            ipv6: None,
        };
        let resp = constructor.new_blocked_resp(&req, &mode).unwrap();
        match resp.answers()[0].data() {
            RData::A(a) => assert_eq!(a.0, "3.3.3.3".parse::<Ipv4Addr>().unwrap()),
            other => panic!("unexpected rdata: {other:?}"),
        }
    }

    #[test]
    fn nxdomain_mode_has_no_answer() {
        let constructor = HickoryMessagesConstructor::new();
        let req = request("nx.test.", RecordType::A);
        let resp = constructor
            .new_blocked_resp(&req, &BlockingMode::NxDomain)
            .unwrap();
        assert_eq!(resp.response_code(), ResponseCode::NXDomain);
        assert!(resp.answers().is_empty());
    }

    #[test]
    fn prepend_cname_puts_cname_first() {
        let constructor = HickoryMessagesConstructor::new();
        let mut resp = Message::new(1, MessageType::Response, OpCode::Query);
        resp.add_answer(Record::from_rdata(
            Name::from_str("rewritten-cname.test.").unwrap(),
            60,
            RData::A(A("7.8.9.0".parse().unwrap())),
        ));
        constructor
            .prepend_cname(&mut resp, "rewritten.test.", "rewritten-cname.test.")
            .unwrap();
        assert_eq!(resp.answers().len(), 2);
        match resp.answers()[0].data() {
            RData::CNAME(cname) => {
                assert_eq!(cname.0.to_utf8(), "rewritten-cname.test.")
            }
            other => panic!("unexpected rdata: {other:?}"),
        }
    }

    #[test]
    fn append_debug_extra_adds_txt_record() {
        let constructor = HickoryMessagesConstructor::new();
        let mut resp = Message::new(1, MessageType::Response, OpCode::Query);
        let datum = DebugDatum {
            owner_name: "country.resp.adguard-dns.com.".to_string(),
            text: "AD".to_string(),
        };
        constructor.append_debug_extra(&mut resp, &datum).unwrap();
        assert_eq!(resp.additionals().len(), 1);
        match resp.additionals()[0].data() {
            RData::TXT(txt) => assert_eq!(txt.to_string(), "\"AD\""),
            other => panic!("unexpected rdata: {other:?}"),
        }
    }
}
