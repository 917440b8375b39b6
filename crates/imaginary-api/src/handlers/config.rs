use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RuntimeInfo {
    pub app_name: String,
    pub app_version: String,
    pub environment: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigResponse {
    pub data: RuntimeInfo,
}

/// Public runtime information about the running service.
#[utoipa::path(
    get,
    path = "/config",
    tag = "infra",
    responses(
        (status = 200, description = "Service name, version and environment", body = ConfigResponse)
    )
)]
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let config = &state.config;
    Json(ConfigResponse {
        data: RuntimeInfo {
            app_name: config.app_name.clone(),
            app_version: config.app_version.clone(),
            environment: config.environment.clone(),
        },
    })
}
