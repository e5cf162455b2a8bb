pub mod dnsdb_rotation;
pub mod geoip_refresh;
pub mod runner;

pub use dnsdb_rotation::DnsdbRotationJob;
pub use geoip_refresh::GeoipRefreshJob;
pub use runner::JobRunner;
