//! Imaginary API Library
//!
//! This crate provides the HTTP handlers, the URL batch orchestrator and application setup.

mod api_doc;
pub mod constants;
pub mod handlers;
pub mod services;
pub mod setup;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
