use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use imaginary_core::models::{Format, Operation, UploadMethod};
use imaginary_core::validation::validate_convert_urls_request;
use imaginary_core::AppError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{BatchErrorResponse, ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::{BatchOrchestrator, TransferClient};
use crate::state::AppState;

/// Request body of `POST /convert/urls` (documentation schema; the body is validated
/// field by field so every problem is reported at once).
#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertUrlsBody {
    /// Operations applied in order to every input.
    pub pipeline: Vec<Operation>,
    pub urls: Vec<ConvertUrlsTarget>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertUrlsTarget {
    /// http(s) URL of the source image.
    pub input: String,
    pub output: OutputSpec,
    /// Output format, `webp` when omitted.
    pub format: Option<Format>,
}

/// Either a bare URL (uploaded with PUT) or a full destination.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum OutputSpec {
    Url(String),
    Destination {
        url: String,
        /// `PUT` when omitted.
        method: Option<UploadMethod>,
        /// Header value templates; `OUTPUT_LENGTH` is replaced by the encoded size.
        headers: Option<BTreeMap<String, String>>,
    },
}

#[utoipa::path(
    post,
    path = "/convert/urls",
    tag = "convert",
    request_body = ConvertUrlsBody,
    responses(
        (status = 200, description = "Every target was fetched, processed and uploaded"),
        (status = 400, description = "Invalid request; field errors list every problem", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = "default", description = "A target failed; status of the lowest-index failed target", body = BatchErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(operation = "convert_urls"))]
pub async fn convert_urls(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<serde_json::Value>,
) -> Result<Response, HttpAppError> {
    let request = validate_convert_urls_request(&body)
        .map_err(|errors| AppError::validation("invalid request", errors))?;

    let max_batch_size = state.config.max_batch_size;
    if request.targets.len() > max_batch_size {
        return Err(AppError::BadRequest(format!(
            "batch of {} targets exceeds the maximum of {}",
            request.targets.len(),
            max_batch_size
        ))
        .into());
    }

    let orchestrator = BatchOrchestrator::new(
        TransferClient::new(
            state.http_client.clone(),
            state.config.max_upload_size_bytes,
        ),
        state.config.target_concurrency(),
    );
    let outcome = orchestrator.run(&request.pipeline, request.targets).await;

    match outcome.into_failure() {
        None => Ok(StatusCode::OK.into_response()),
        Some(failure) => Ok(failure.into_response()),
    }
}
