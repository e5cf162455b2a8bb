use crate::filter_result::ResultCode;
use serde::Serialize;
use std::net::IpAddr;
use uuid::Uuid;

/// High-level query-log entry assembled by the main middleware (spec §3
/// "Query-log Entry"). Converted to the compact on-disk [`JsonlEntry`]
/// by the query-log writer.
#[derive(Debug, Clone)]
pub struct QueryLogEntry {
    pub request_id: Uuid,
    pub profile_id: Option<String>,
    pub device_id: Option<String>,
    pub client_country: Option<String>,
    pub response_country: Option<String>,
    pub domain_fqdn: String,
    pub filter_list_id: Option<String>,
    pub filter_rule: Option<String>,
    pub request_timestamp_unix_ms: i64,
    pub client_asn: u32,
    pub elapsed_ms: u32,
    pub qtype: u16,
    pub rcode: u16,
    pub result_code: ResultCode,
    pub dnssec_validated: bool,
    pub protocol_code: u8,
    pub remote_ip: Option<IpAddr>,
}

impl QueryLogEntry {
    /// Mills a duration to ms, saturating at `[0, 2^32-1]` (spec §4.4
    /// step 2, §8 "Elapsed clamps"). Callers are expected to log a
    /// warning when clamping actually changed the value.
    pub fn clamp_elapsed_ms(elapsed: std::time::Duration) -> (u32, bool) {
        let millis = elapsed.as_millis();
        if millis > u32::MAX as u128 {
            (u32::MAX, true)
        } else {
            (millis as u32, false)
        }
    }
}

/// On-disk JSONL shape (spec §6.2). Field names are the deliberately
/// short keys the schema specifies; `omit-empty` fields use
/// `skip_serializing_if`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonlEntry {
    pub u: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    pub n: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m: Option<String>,
    pub t: i64,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub a: u32,
    pub e: u32,
    pub q: u16,
    pub r: u16,
    pub rn: u16,
    pub f: u8,
    pub s: u8,
    pub p: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

impl JsonlEntry {
    /// Converts a high-level entry plus the seeded random tag (spec
    /// §3/§4.4 "a uniformly random 16-bit tag for dedup") into its
    /// on-disk shape.
    pub fn from_entry(entry: &QueryLogEntry, random_tag: u16) -> Self {
        Self {
            u: entry.request_id.to_string(),
            b: entry.profile_id.clone(),
            i: entry.device_id.clone(),
            c: entry.client_country.clone(),
            d: entry.response_country.clone(),
            n: entry.domain_fqdn.clone(),
            l: entry.filter_list_id.clone(),
            m: entry.filter_rule.clone(),
            t: entry.request_timestamp_unix_ms,
            a: entry.client_asn,
            e: entry.elapsed_ms,
            q: entry.qtype,
            r: entry.rcode,
            rn: random_tag,
            f: entry.result_code as u8,
            s: u8::from(entry.dnssec_validated),
            p: entry.protocol_code,
            ip: entry.remote_ip.map(|ip| ip.to_string()),
        }
    }

    /// Serializes as one JSON object followed by exactly one trailing
    /// newline (spec §8: "Query-log JSONL line... contains exactly one
    /// newline").
    pub fn to_jsonl_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
