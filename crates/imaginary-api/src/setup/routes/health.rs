//! Health check handlers and response types.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: &'static str,
}

fn ok() -> impl IntoResponse {
    (StatusCode::OK, Json(StatusResponse { status: "OK" }))
}

/// Liveness probe - process is running.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "infra",
    responses((status = 200, description = "Service is alive", body = StatusResponse))
)]
pub async fn healthz() -> impl IntoResponse {
    ok()
}

/// Uptime probe for external monitors; same contract as `/healthz`.
#[utoipa::path(
    get,
    path = "/uptimez",
    tag = "infra",
    responses((status = 200, description = "Service is up", body = StatusResponse))
)]
pub async fn uptimez() -> impl IntoResponse {
    ok()
}
