//! Configuration structures for the filtering core, organized by
//! concern the way the upstream workspace does it. Loading these from
//! a file/CLI is out of scope (spec §1); what's here is the shape and
//! the defaults a caller wires in.

pub mod debug;
pub mod dnsdb;
pub mod geoip;
pub mod logging;
pub mod querylog;

pub use debug::DebugConfig;
pub use dnsdb::DnsDbConfig;
pub use geoip::GeoIpConfig;
pub use logging::LoggingConfig;
pub use querylog::QueryLogConfig;
