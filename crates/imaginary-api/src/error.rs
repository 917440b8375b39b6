//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<Response, HttpAppError>`. Use `AppError` (or
//! types that implement `Into<AppError>`) for errors so they render consistently (status,
//! body, logging).

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use imaginary_core::{AppError, ErrorMetadata, FieldError, LogLevel};
use imaginary_processing::CodecError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

use crate::services::batch::{BatchFailure, TargetReport};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Retry after a short delay")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// One entry per rejected field, with its path (e.g. `pipeline[0].args`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    /// Build the response body for an application error.
    ///
    /// Details and the error type are only exposed outside production and for non-sensitive
    /// errors. Field errors are always returned since they describe the caller's input.
    pub fn from_app_error(app_error: &AppError, is_production: bool) -> Self {
        let expose_details = !is_production && !app_error.is_sensitive();
        Self {
            error: app_error.client_message(),
            details: expose_details.then(|| app_error.detailed_message()),
            error_type: expose_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
            field_errors: app_error
                .field_errors()
                .map(|errors| errors.errors().to_vec()),
        }
    }
}

/// Error body of a failed URL batch: the first failure plus one report per target.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchErrorResponse {
    #[serde(flatten)]
    pub error: ErrorResponse,
    pub targets: Vec<TargetReport>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from imaginary-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<CodecError> for HttpAppError {
    fn from(err: CodecError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::BadRequest(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// Multipart stream failures; a body over the configured limit surfaces as 413.
impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let message = err.body_text();
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            HttpAppError(AppError::PayloadTooLarge(message))
        } else {
            HttpAppError(AppError::BadRequest(format!(
                "Invalid multipart body: {}",
                message
            )))
        }
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
/// Use this instead of `Json<T>` when you want a consistent API error shape for invalid bodies.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

pub(crate) fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

pub(crate) fn is_production_env() -> bool {
    ["ENVIRONMENT", "COMMON_ENV", "APP_ENV"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .map(|env| {
            let env = env.to_lowercase();
            env == "production" || env == "prod"
        })
        .unwrap_or(false)
}

pub(crate) fn status_of(error: &AppError) -> StatusCode {
    StatusCode::from_u16(error.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        log_error(app_error);

        let body = ErrorResponse::from_app_error(app_error, is_production_env());
        (status_of(app_error), Json(body)).into_response()
    }
}

/// Rendered with the status of the lowest-index failed target.
impl IntoResponse for BatchFailure {
    fn into_response(self) -> Response {
        log_error(&self.error);

        let body = BatchErrorResponse {
            error: ErrorResponse::from_app_error(&self.error, is_production_env()),
            targets: self.reports,
        };
        (status_of(&self.error), Json(body)).into_response()
    }
}
