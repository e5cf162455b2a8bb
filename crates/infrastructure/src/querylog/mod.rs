pub mod writer;

pub use writer::FileQueryLogWriter;
