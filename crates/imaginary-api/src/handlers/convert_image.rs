use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use imaginary_core::models::Format;
use imaginary_core::validation::validate_pipeline_json;
use imaginary_core::AppError;
use imaginary_processing::PipelineExecutor;

use crate::constants::form_fields;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Raw multipart fields, before any of them is interpreted.
#[derive(Default)]
struct ConvertImageForm {
    image: Option<Bytes>,
    pipeline: Option<String>,
    format: Option<String>,
}

impl ConvertImageForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, HttpAppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some(form_fields::IMAGE) => form.image = Some(field.bytes().await?),
                Some(form_fields::PIPELINE) => form.pipeline = Some(field.text().await?),
                Some(form_fields::FORMAT) => form.format = Some(field.text().await?),
                other => {
                    tracing::debug!(field = ?other, "Ignoring unknown multipart field");
                }
            }
        }

        Ok(form)
    }
}

#[utoipa::path(
    post,
    path = "/convert/image",
    tag = "convert",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Fields: `image` (file), `pipeline` (JSON array of operations), `format` (png, jpeg or webp)"
    ),
    responses(
        (status = 200, description = "Encoded image bytes with the Content-Type of the requested format"),
        (status = 400, description = "Missing field, invalid format or pipeline, or undecodable image", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "convert_image"))]
pub async fn convert_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = ConvertImageForm::read(&mut multipart).await?;

    // Checked in this order so the first missing piece is the one reported.
    let image = form
        .image
        .ok_or_else(|| AppError::BadRequest("image missing".to_string()))?;
    let pipeline = form
        .pipeline
        .ok_or_else(|| AppError::BadRequest("pipeline missing".to_string()))?;
    let format = form
        .format
        .ok_or_else(|| AppError::BadRequest("format missing".to_string()))?;

    let format: Format = format.trim().parse().map_err(|_| {
        AppError::BadRequest(format!(
            "invalid format: expected one of {}",
            Format::allowed_values()
        ))
    })?;
    let pipeline = validate_pipeline_json(&pipeline)
        .map_err(|errors| AppError::validation("invalid pipeline", errors))?;

    if image.len() > state.config.max_upload_size_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "image is {} bytes, the limit is {} bytes",
            image.len(),
            state.config.max_upload_size_bytes
        ))
        .into());
    }

    tracing::info!(
        input_bytes = image.len(),
        operations = pipeline.len(),
        format = %format,
        "Converting uploaded image"
    );

    let output = PipelineExecutor::run_blocking(image, pipeline, format).await?;

    Ok(([(header::CONTENT_TYPE, format.to_mime_type())], output).into_response())
}
