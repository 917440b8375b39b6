//! OpenAPI documentation.
//! Handler annotations use paths relative to `BASE_PATH`; the prefix, when configured, is
//! published as the server URL of the served document.

use utoipa::openapi::server::Server;
use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::services::batch;
use crate::setup::routes::health;
use imaginary_core::models;
use imaginary_core::validation;

/// Returns the OpenAPI document for a service mounted under `base_path` (may be empty).
pub fn get_openapi_spec(base_path: &str) -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    if !base_path.is_empty() {
        spec.servers = Some(vec![Server::new(base_path)]);
    }
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Imaginary API",
        description = "Declarative image pipelines (resize, rotate, flip, flop, blur) applied to uploaded images or to batches of remote URLs, with results written back over HTTP."
    ),
    paths(
        // Conversion
        handlers::convert_urls::convert_urls,
        handlers::convert_image::convert_image,
        // Infra
        handlers::config::get_config,
        health::healthz,
        health::uptimez,
    ),
    components(
        schemas(
            // Pipeline models
            models::Operation,
            models::ResizeArgs,
            models::Fit,
            models::Kernel,
            models::Format,
            models::UploadMethod,
            // Batch models
            handlers::convert_urls::ConvertUrlsBody,
            handlers::convert_urls::ConvertUrlsTarget,
            handlers::convert_urls::OutputSpec,
            batch::TargetReport,
            batch::TargetStatus,
            // Config
            handlers::config::ConfigResponse,
            handlers::config::RuntimeInfo,
            health::StatusResponse,
            // Error
            error::ErrorResponse,
            error::BatchErrorResponse,
            validation::FieldError,
        )
    ),
    tags(
        (name = "convert", description = "Run a pipeline on an uploaded image or on a batch of URLs"),
        (name = "infra", description = "Health checks and runtime information")
    )
)]
pub struct ApiDoc;
