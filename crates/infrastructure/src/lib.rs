pub mod ambient;
pub mod dnsdb;
pub mod geoip;
pub mod messages;
pub mod pool;
pub mod querylog;

pub use dnsdb::engine::DnsDbEngine;
pub use geoip::resolver::GeoIpResolver;
pub use messages::HickoryMessagesConstructor;
pub use querylog::writer::FileQueryLogWriter;
