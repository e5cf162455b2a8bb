use ferrous_dns_domain::location::Country;
use ferrous_dns_domain::request_info::Protocol;
use chrono::{DateTime, Utc};

/// Usage-billing sink (spec §1 "billing uploader" is external; spec
/// §4.7.4 defines the record shape the middleware emits:
/// `(deviceID, country, ASN, startTime, protocol)`).
pub trait BillingRecorderPort: Send + Sync {
    fn record(
        &self,
        device_id: Option<&str>,
        country: Country,
        asn: u32,
        start_time: DateTime<Utc>,
        protocol: Protocol,
    );
}
