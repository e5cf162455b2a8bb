pub mod billing;
pub mod dnsdb_port;
pub mod downstream_handler;
pub mod error_collector;
pub mod filter_engine;
pub mod geoip_port;
pub mod messages_constructor;
pub mod metrics_sink;
pub mod query_log_port;
pub mod response_writer;
pub mod rule_stats;

pub use billing::BillingRecorderPort;
pub use dnsdb_port::DnsDbPort;
pub use downstream_handler::DownstreamHandlerPort;
pub use error_collector::ErrorCollectorPort;
pub use filter_engine::FilterEnginePort;
pub use geoip_port::GeoIpPort;
pub use messages_constructor::MessagesConstructorPort;
pub use metrics_sink::MetricsSinkPort;
pub use query_log_port::QueryLogPort;
pub use response_writer::ResponseWriterPort;
pub use rule_stats::RuleStatsCollectorPort;
