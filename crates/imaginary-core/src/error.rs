//! Error types module
//!
//! All request-level failures are unified under the `AppError` enum: validation of the
//! declarative pipeline, request-shape problems, codec failures and upstream transfer
//! failures of the URL batch path.

use std::io;

use crate::validation::ValidationErrors;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like upstream failures
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{context}: {errors}")]
    Validation {
        context: String,
        errors: ValidationErrors,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    /// The remote endpoint answered with a non-success status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Network-level failure without an HTTP response (DNS, reset, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Validation failure reported under a short context label
    /// (e.g. `invalid pipeline`).
    pub fn validation(context: impl Into<String>, errors: ValidationErrors) -> Self {
        AppError::Validation {
            context: context.into(),
            errors,
        }
    }

    /// Field errors carried by a validation failure, if any.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, sensitive, log_level).
/// The status code is computed separately because upstream errors mirror the remote status.
fn app_error_static_metadata(
    err: &AppError,
) -> (&'static str, bool, Option<&'static str>, bool, LogLevel) {
    match err {
        AppError::Validation { .. } => (
            "VALIDATION_ERROR",
            false,
            Some("Fix the listed fields and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::ImageProcessing(_) => (
            "IMAGE_PROCESSING_ERROR",
            false,
            Some("Check image format and try a different file"),
            false,
            LogLevel::Warn,
        ),
        AppError::Upstream { .. } => (
            "UPSTREAM_ERROR",
            false,
            Some("Check the input and output URLs of the failing target"),
            false,
            LogLevel::Warn,
        ),
        AppError::Transport(_) => (
            "TRANSPORT_ERROR",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::PayloadTooLarge(_) => (
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Validation { .. } => "Validation",
            AppError::BadRequest(_) => "BadRequest",
            AppError::ImageProcessing(_) => "ImageProcessing",
            AppError::Upstream { .. } => "Upstream",
            AppError::Transport(_) => "Transport",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::Validation { .. }
            | AppError::BadRequest(_)
            | AppError::ImageProcessing(_) => 400,
            AppError::Upstream { status, .. } => *status,
            AppError::PayloadTooLarge(_) => 413,
            AppError::Transport(_) | AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                500
            }
        }
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation { .. } => self.to_string(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::ImageProcessing(ref msg) => msg.clone(),
            AppError::Upstream { ref message, .. } => message.clone(),
            AppError::Transport(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
