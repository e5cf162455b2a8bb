pub mod buffer;
pub mod csv_dump;
pub mod engine;

pub use csv_dump::{csv_dump_handler, render_csv_dump, CsvDumpOutcome};
pub use engine::DnsDbEngine;
