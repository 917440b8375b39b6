//! Application setup and initialization
//!
//! Everything between a loaded `Config` and a ready `Router`, kept out of main.rs so tests
//! can build the same application without installing a global subscriber.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use imaginary_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    imaginary_infra::init_telemetry(config.log_level.as_deref(), config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        app_name = %config.app_name,
        app_version = %config.app_version,
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    build_app(config)
}

/// Build state and routes for an already validated configuration.
pub fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let state = Arc::new(AppState::new(config)?);
    let router = routes::setup_routes(&state.config, state.clone())?;
    Ok((state, router))
}
