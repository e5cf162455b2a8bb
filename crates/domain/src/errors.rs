use thiserror::Error;

/// Core error taxonomy (spec §7). Each variant is one condition the
/// middleware, DNSDB, GeoIP resolver, or query-log writer can hit; none
/// of them are fatal to the process — callers report them through
/// [`crate::ErrorCollector`] (defined in `ferrous-dns-application`) and
/// continue.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("filter call failed: {0}")]
    FilterCall(String),

    #[error("upstream call failed: {0}")]
    Upstream(String),

    #[error("blocked-response synthesis failed: {0}")]
    Synthesis(String),

    #[error("dnsdb record codec failed for key {domain}/{qtype}: {reason}")]
    DnsDbCodec {
        domain: String,
        qtype: String,
        reason: String,
    },

    #[error("geoip refresh failed: {0}")]
    GeoIpRefresh(String),

    #[error("geoip lookup failed: {0}")]
    GeoIpLookup(String),

    #[error("query log write failed: {0}")]
    QueryLogWrite(String),

    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),

    #[error("invalid continent code: {0}")]
    InvalidContinentCode(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("programmer error: {0}")]
    Programmer(String),
}

/// Wraps a post-filtering-phase error (write, synthesis) with the
/// cancellation classification spec §5/§7 requires: context
/// cancellation/deadline is suppressed from alerting, everything else is
/// reported.
#[derive(Error, Debug)]
#[error("after-filtering error: {source}")]
pub struct AfterFilteringError {
    #[source]
    pub source: CoreError,
    pub cancelled: bool,
}

impl AfterFilteringError {
    pub fn new(source: CoreError) -> Self {
        Self {
            source,
            cancelled: false,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            source: CoreError::Upstream("context cancelled".to_string()),
            cancelled: true,
        }
    }

    /// Whether this error should be suppressed from external alerting.
    pub fn should_report(&self) -> bool {
        !self.cancelled
    }
}
