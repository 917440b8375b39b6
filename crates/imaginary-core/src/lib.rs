//! Imaginary Core Library
//!
//! This crate provides the domain models, request validation, error types and configuration
//! shared by the processing engine and the HTTP service.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use validation::{FieldError, ValidationErrors};
