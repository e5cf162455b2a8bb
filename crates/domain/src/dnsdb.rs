use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RecordType;

/// One flattened row of the DNSDB aggregation (spec §3 "DNSDB Record",
/// §4.1 `all()`). `answer_text` is the stringified IP for A/AAAA, the
/// dotless target for CNAME, else empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsDbRecord {
    pub domain_fqdn: String,
    pub answer_text: String,
    pub qtype: RecordType,
    pub rcode: ResponseCode,
    pub hits: u64,
}

impl DnsDbRecord {
    /// CSV row per spec §6.1: `<fqdn>,<qtype-string>,<rcode-string>,<answer>,<hits>`.
    pub fn to_csv_fields(&self) -> [String; 5] {
        [
            self.domain_fqdn.clone(),
            self.qtype.to_string(),
            rcode_to_mnemonic(self.rcode).to_string(),
            self.answer_text.clone(),
            self.hits.to_string(),
        ]
    }
}

/// Maps a [`ResponseCode`] to its IANA mnemonic (spec §6.1: `rcode-string`
/// is "the IANA mnemonic"). `ResponseCode`'s own `Display` renders
/// descriptive text ("No Error", "Non-Existent Domain"), not the
/// mnemonic, so this can't be a `to_string()` call.
pub fn rcode_to_mnemonic(rcode: ResponseCode) -> &'static str {
    match rcode {
        ResponseCode::NoError => "NOERROR",
        ResponseCode::FormErr => "FORMERR",
        ResponseCode::ServFail => "SERVFAIL",
        ResponseCode::NXDomain => "NXDOMAIN",
        ResponseCode::NotImp => "NOTIMP",
        ResponseCode::Refused => "REFUSED",
        ResponseCode::YXDomain => "YXDOMAIN",
        ResponseCode::YXRRSet => "YXRRSET",
        ResponseCode::NXRRSet => "NXRRSET",
        ResponseCode::NotAuth => "NOTAUTH",
        ResponseCode::NotZone => "NOTZONE",
        ResponseCode::BADVERS => "BADVERS",
        ResponseCode::BADSIG => "BADSIG",
        ResponseCode::BADKEY => "BADKEY",
        ResponseCode::BADTIME => "BADTIME",
        ResponseCode::BADMODE => "BADMODE",
        ResponseCode::BADNAME => "BADNAME",
        ResponseCode::BADALG => "BADALG",
        ResponseCode::BADTRUNC => "BADTRUNC",
        ResponseCode::BADCOOKIE => "BADCOOKIE",
        _ => "UNKNOWN",
    }
}

/// Aggregation key: `(target, qtype)` (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsDbKey {
    pub target: String,
    pub qtype: RecordType,
}

/// One observed answer, retained only from the *first* observation of a
/// key (spec §4.1: "the design deliberately trades fidelity for space").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsDbAnswer {
    pub value: String,
    pub rr_type: RecordType,
    pub rcode: ResponseCode,
}

/// Aggregated value stored under a [`DnsDbKey`].
#[derive(Debug, Clone, Default)]
pub struct DnsDbValue {
    pub answer_set: Vec<DnsDbAnswer>,
    pub hits: u64,
}

/// Hostnames carrying Android connectivity-check telemetry; excluded
/// from DNSDB ingestion per spec §3/§4.1/§8 ("Android-metric host").
pub fn is_android_metric_host(host: &str) -> bool {
    const ANDROID_METRIC_HOSTS: &[&str] = &[
        "connectivitycheck.gstatic.com",
        "connectivitycheck.android.com",
        "clients3.google.com",
        "clients.l.google.com",
    ];
    ANDROID_METRIC_HOSTS.contains(&host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_fields_order() {
        let record = DnsDbRecord {
            domain_fqdn: "example.com".into(),
            answer_text: "1.2.3.4".into(),
            qtype: RecordType::A,
            rcode: ResponseCode::NoError,
            hits: 2,
        };
        let fields = record.to_csv_fields();
        assert_eq!(fields[0], "example.com");
        assert_eq!(fields[1], "A");
        assert_eq!(fields[2], "NOERROR");
        assert_eq!(fields[3], "1.2.3.4");
        assert_eq!(fields[4], "2");
    }

    #[test]
    fn rcode_mnemonics_not_display_text() {
        assert_eq!(rcode_to_mnemonic(ResponseCode::NoError), "NOERROR");
        assert_eq!(rcode_to_mnemonic(ResponseCode::NXDomain), "NXDOMAIN");
        assert_eq!(rcode_to_mnemonic(ResponseCode::ServFail), "SERVFAIL");
    }

    #[test]
    fn detects_android_metric_host() {
        assert!(is_android_metric_host("connectivitycheck.gstatic.com"));
        assert!(!is_android_metric_host("example.com"));
    }
}
