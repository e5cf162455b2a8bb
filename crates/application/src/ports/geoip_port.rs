use ferrous_dns_domain::errors::CoreError;
use ferrous_dns_domain::location::Location;
use ipnetwork::IpNetwork;
use std::net::IpAddr;

/// Address family selector for [`GeoIpPort::subnet_by_location`]
/// (spec §3 "Two maps per address family").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

/// GeoIP resolver contract (spec §4.3). `data` returns `Ok(None)` for
/// the documented no-op case (zero IP, empty host); lookup failures
/// are `Err` and the caller falls back to `CountryNone` (spec §7).
pub trait GeoIpPort: Send + Sync {
    fn data(&self, host: &str, ip: IpAddr) -> Result<Option<Location>, CoreError>;

    /// Always returns a prefix — the zero prefix of `family` if nothing
    /// in the subnet maps matches (spec §4.3 `SubnetByLocation`).
    fn subnet_by_location(&self, location: &Location, family: AddressFamily) -> IpNetwork;
}
