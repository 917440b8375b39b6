//! Route configuration and setup.
//!
//! Conversion and infra routes share one router, optionally nested under `BASE_PATH`;
//! health checks live in [health](health).

pub(crate) mod health;

use crate::constants::{
    CONFIG_PATH, CONVERT_IMAGE_PATH, CONVERT_URLS_PATH, DEFAULT_HTTP_CONCURRENCY_LIMIT,
    DOCS_PATH, HEALTHZ_PATH, OPENAPI_PATH, UPTIMEZ_PATH,
};
use crate::handlers;
use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use imaginary_core::Config;
use imaginary_infra::request_id_middleware;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Headroom on top of the largest accepted image for the multipart envelope and JSON bodies.
const BODY_LIMIT_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = match std::env::var("HTTP_CONCURRENCY_LIMIT") {
        Ok(raw) => raw.trim().parse::<usize>().with_context(|| {
            format!("HTTP_CONCURRENCY_LIMIT must be a positive integer, got '{}'", raw)
        })?,
        Err(_) => DEFAULT_HTTP_CONCURRENCY_LIMIT,
    }
    .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let api = api_routes(config, state);
    let app = if config.base_path.is_empty() {
        api
    } else {
        tracing::info!(base_path = %config.base_path, "Mounting routes under base path");
        Router::new().nest(&config.base_path, api)
    };

    let app = app
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config
                .max_upload_size_bytes
                .saturating_add(BODY_LIMIT_OVERHEAD_BYTES),
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware));

    Ok(app)
}

fn api_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let base_path = config.base_path.clone();
    let openapi_url = format!("{}{}", config.base_path, OPENAPI_PATH);

    Router::new()
        .route(CONVERT_URLS_PATH, post(handlers::convert_urls::convert_urls))
        .route(CONVERT_IMAGE_PATH, post(handlers::convert_image::convert_image))
        .route(CONFIG_PATH, get(handlers::config::get_config))
        .route(HEALTHZ_PATH, get(health::healthz))
        .route(UPTIMEZ_PATH, get(health::uptimez))
        .route(
            OPENAPI_PATH,
            get(move || {
                let spec = crate::api_doc::get_openapi_spec(&base_path);
                async move { Json(spec) }
            }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new(openapi_url).path(DOCS_PATH))
        .with_state(state)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", o))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
