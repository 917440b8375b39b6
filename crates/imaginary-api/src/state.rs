//! Application state shared by all handlers.

use anyhow::Context;
use imaginary_core::Config;

/// Immutable per-process state. The only shared resource is the pooled HTTP client used
/// by the URL batch path.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let http_client = build_http_client(&config)?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

fn build_http_client(config: &Config) -> Result<reqwest::Client, anyhow::Error> {
    let mut builder = reqwest::Client::builder()
        .user_agent(format!("{}/{}", config.app_name, config.app_version));

    // Applies to the whole exchange: connect, headers and body.
    if let Some(timeout) = config.http_timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build().context("Failed to build HTTP client")
}
