pub mod debug_response;
pub mod filter_dispatch;
pub mod main_middleware;

pub use debug_response::DebugResponseBuilder;
pub use main_middleware::MainMiddleware;
