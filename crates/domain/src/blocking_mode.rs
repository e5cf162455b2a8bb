use std::net::IpAddr;

/// Closed sum type over the synthetic answers a blocked query can get
/// back (spec §4.6.4/§4.6.5, GLOSSARY "Blocking mode"). Dispatch over
/// this must be exhaustive; an unhandled variant is a programmer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockingMode {
    /// Answer with the all-zeroes address for the question's family.
    NullIp,
    /// Answer with an operator-chosen address, one per family.
    CustomIp {
        ipv4: Option<IpAddr>,
        ipv6: Option<IpAddr>,
    },
    /// Answer NXDOMAIN.
    NxDomain,
    /// Answer REFUSED.
    Refused,
    /// Drop the question from the response entirely (empty NOERROR).
    UnspecifiedTtl,
}

impl Default for BlockingMode {
    fn default() -> Self {
        BlockingMode::NullIp
    }
}

/// Well-known filter-list identifiers with dedicated blocking-mode
/// overrides (spec §4.6.5).
pub const ID_ADULT_BLOCKING: &str = "adult_blocking";
pub const ID_SAFE_BROWSING: &str = "safe_browsing";

/// TTL (seconds) attached to any synthesized blocked response, per
/// spec §8 scenario 2 ("FilteredResponseTTL (10s)").
pub const FILTERED_RESPONSE_TTL: u32 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_null_ip() {
        assert_eq!(BlockingMode::default(), BlockingMode::NullIp);
    }
}
