//! Imaginary Infrastructure Library
//!
//! Shared infrastructure for the HTTP service:
//! - Middleware (request ID)
//! - Telemetry initialization (tracing subscriber)

pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{get_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, shutdown_telemetry};
