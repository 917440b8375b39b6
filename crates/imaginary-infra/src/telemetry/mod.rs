//! Tracing subscriber initialization
//!
//! Log filtering follows `RUST_LOG` when set, then `LOG_LEVEL`, then a default that keeps the
//! service crates and `tower_http` at `info`.

use imaginary_core::LogFormat;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_DIRECTIVES: &str = "imaginary=info,tower_http=info";

/// Resolve the filter directives from the environment-provided values.
///
/// A bare level in `LOG_LEVEL` (e.g. `debug`) applies to the service crates and `tower_http`;
/// anything else is passed through as a full directive string.
pub fn filter_directives(rust_log: Option<&str>, log_level: Option<&str>) -> String {
    if let Some(directives) = rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        return directives.to_string();
    }

    match log_level.map(|s| s.trim().to_lowercase()) {
        Some(level) if is_bare_level(&level) => {
            format!("imaginary={level},tower_http={level}")
        }
        Some(directives) if !directives.is_empty() => directives,
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}

fn is_bare_level(s: &str) -> bool {
    matches!(s, "trace" | "debug" | "info" | "warn" | "error" | "off")
}

/// Install the global subscriber.
pub fn init_telemetry(
    log_level: Option<&str>,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directives = filter_directives(rust_log.as_deref(), log_level);
    let filter = EnvFilter::try_new(&directives)?;

    match format {
        LogFormat::Text => {
            let console_fmt = tracing_subscriber::fmt::layer()
                .event_format(Format::default().compact().with_target(false));
            tracing_subscriber::registry()
                .with(filter)
                .with(console_fmt)
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
                .try_init()?;
        }
    }

    tracing::info!(filter = %directives, format = ?format, "Tracing initialized");
    Ok(())
}

pub fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
