pub mod blocking_mode;
pub mod config;
pub mod dns_message;
pub mod dnsdb;
pub mod errors;
pub mod filter_result;
pub mod location;
pub mod query_log;
pub mod request_info;

pub use blocking_mode::BlockingMode;
pub use dnsdb::DnsDbRecord;
pub use errors::{AfterFilteringError, CoreError};
pub use filter_result::{FilterResult, ResultCode};
pub use location::{Continent, Country, Location};
pub use query_log::{JsonlEntry, QueryLogEntry};
pub use request_info::{DeviceInfo, FilterConfig, Protocol, ProfileInfo, RequestInfo};
