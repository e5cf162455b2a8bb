pub mod ports;
pub mod use_cases;

pub use use_cases::debug_response::DebugResponseBuilder;
pub use use_cases::main_middleware::MainMiddleware;
