//! Helpers over the opaque external DNS message type (spec §3
//! "DNS Message (external)"). The core only ever inspects the question,
//! the answer section, the response code, the authenticated-data flag
//! and the message ID — never full wire parsing/serialization, which
//! stays with the surrounding transport.

use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use std::net::IpAddr;

/// Sentinel rcode `responseData(nil)` returns (spec §4.7.5, §8,
/// §9 "possible source bugs"): an unassigned code used as an opaque
/// error marker, not a real DNS rcode. Preserved verbatim per spec.
pub const RESPONSE_DATA_SENTINEL_RCODE: u16 = 0x00FF;

/// Result of the `responseData` extractor (spec §4.7.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseData {
    pub rcode: u16,
    pub answer_ip: IpAddr,
    pub dnssec_validated: bool,
}

impl ResponseData {
    fn zero_ip() -> IpAddr {
        IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
    }

    pub fn sentinel() -> Self {
        Self {
            rcode: RESPONSE_DATA_SENTINEL_RCODE,
            answer_ip: Self::zero_ip(),
            dnssec_validated: false,
        }
    }
}

/// Extracts `(rcode, answer_ip, dnssec)` from a response (spec §4.7.5):
/// first IP candidate from the answer section, preferring A/AAAA, then
/// HTTPS/SVCB ipv4hint/ipv6hint; all other RR types are skipped.
pub fn response_data(response: Option<&Message>) -> ResponseData {
    let Some(message) = response else {
        return ResponseData::sentinel();
    };

    let rcode: u16 = u16::from(message.response_code());
    let dnssec_validated = message.authentic_data();

    let answer_ip = message
        .answers()
        .iter()
        .find_map(|record| match record.data() {
            RData::A(a) => Some(IpAddr::V4(a.0)),
            RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
            RData::HTTPS(https) => https
                .svc_params()
                .iter()
                .find_map(|(key, value)| {
                    use hickory_proto::rr::rdata::svcb::{SvcParamKey, SvcParamValue};
                    match (key, value) {
                        (SvcParamKey::Ipv4Hint, SvcParamValue::Ipv4Hint(hint)) => {
                            hint.0.first().copied().map(IpAddr::V4)
                        }
                        _ => None,
                    }
                })
                .or_else(|| {
                    https.svc_params().iter().find_map(|(key, value)| {
                        use hickory_proto::rr::rdata::svcb::{SvcParamKey, SvcParamValue};
                        match (key, value) {
                            (SvcParamKey::Ipv6Hint, SvcParamValue::Ipv6Hint(hint)) => {
                                hint.0.first().copied().map(IpAddr::V6)
                            }
                            _ => None,
                        }
                    })
                }),
            _ => None,
        })
        .unwrap_or_else(ResponseData::zero_ip);

    ResponseData {
        rcode,
        answer_ip,
        dnssec_validated,
    }
}

/// The rcode this extractor treats as "nothing to see" for the purpose
/// of response-country resolution (spec §4.7.4: `rcode != NOERROR` or
/// `respIP` zero/unspecified implies `CountryNotApplicable`).
pub fn is_noerror(rcode: ResponseCode) -> bool {
    rcode == ResponseCode::NoError
}

pub fn is_unspecified(ip: IpAddr) -> bool {
    ip.is_unspecified()
}
