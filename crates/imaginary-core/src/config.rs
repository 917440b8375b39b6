//! Configuration module
//!
//! Process configuration is read from environment variables (a `.env` file is honoured
//! through `dotenvy`). Unset variables take their defaults; values that fail to parse are
//! errors, and inconsistent combinations are rejected by [`Config::validate`].

use std::env;
use std::str::FromStr;
use std::time::Duration;

const API_PORT: u16 = 4000;
const API_BINDADDR: &str = "127.0.0.1";
const APP_NAME: &str = "imaginary";
const HTTP_TIMEOUT_SECS: u64 = 300;
const MAX_UPLOAD_SIZE_MB: usize = 25;
const MAX_BATCH_SIZE: usize = 100;

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" | "compact" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub bind_addr: String,
    /// Prefix under which every route is nested; empty or `/<segment>...`.
    pub base_path: String,
    pub app_name: String,
    pub app_version: String,
    pub environment: String,
    pub log_level: Option<String>,
    pub log_format: LogFormat,
    /// Per-request deadline for fetch and upload; `0` disables it.
    pub http_timeout_secs: u64,
    pub max_upload_size_bytes: usize,
    /// Concurrent targets per batch; `0` means unbounded.
    pub max_concurrent_targets: usize,
    pub max_batch_size: usize,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Does not call [`Config::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("COMMON_ENV"))
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match var("API_PORT").or_else(|| var("PORT")) {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a valid port number"))?,
            None => API_PORT,
        };

        let build_version =
            var("BUILD_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
        let app_version = match var("BUILD_IMAGE_TAG") {
            Some(tag) => format!("{}+{}", build_version, tag),
            None => format!("{}+local", build_version),
        };

        let log_format = match var("LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw).ok_or_else(|| {
                anyhow::anyhow!("LOG_FORMAT must be 'text' or 'json', got '{}'", raw)
            })?,
            None => LogFormat::default(),
        };

        let max_upload_size_mb: usize =
            parse_or(var("MAX_UPLOAD_SIZE_MB"), "MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB)?;
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            server_port,
            bind_addr: var("API_BINDADDR").unwrap_or_else(|| API_BINDADDR.to_string()),
            base_path: normalize_base_path(var("BASE_PATH").as_deref().unwrap_or("")),
            app_name: var("APP_NAME").unwrap_or_else(|| APP_NAME.to_string()),
            app_version,
            environment,
            log_level: var("LOG_LEVEL"),
            log_format,
            http_timeout_secs: parse_or(
                var("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                HTTP_TIMEOUT_SECS,
            )?,
            max_upload_size_bytes,
            max_concurrent_targets: parse_or(
                var("MAX_CONCURRENT_TARGETS"),
                "MAX_CONCURRENT_TARGETS",
                0,
            )?,
            max_batch_size: parse_or(var("MAX_BATCH_SIZE"), "MAX_BATCH_SIZE", MAX_BATCH_SIZE)?,
            cors_origins,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("API_PORT must be greater than 0"));
        }

        if self.bind_addr.parse::<std::net::IpAddr>().is_err() {
            return Err(anyhow::anyhow!(
                "API_BINDADDR must be an IP address, got '{}'",
                self.bind_addr
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.max_batch_size == 0 {
            return Err(anyhow::anyhow!("MAX_BATCH_SIZE must be greater than 0"));
        }

        if self.cors_origins.is_empty() {
            return Err(anyhow::anyhow!("CORS_ORIGINS must list at least one origin"));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Socket address string for the listener, e.g. `127.0.0.1:4000`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.server_port)
    }

    /// Fetch/upload deadline, `None` when disabled.
    pub fn http_timeout(&self) -> Option<Duration> {
        (self.http_timeout_secs > 0).then(|| Duration::from_secs(self.http_timeout_secs))
    }

    /// Concurrency cap for batch targets, `None` when unbounded.
    pub fn target_concurrency(&self) -> Option<usize> {
        (self.max_concurrent_targets > 0).then_some(self.max_concurrent_targets)
    }
}

/// Parse an optional variable, falling back to `default` only when it is unset.
fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, anyhow::Error> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|_| {
            anyhow::anyhow!("{} must be a non-negative integer, got '{}'", key, raw.trim())
        }),
        None => Ok(default),
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port, 4000);
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.base_path, "");
        assert_eq!(config.app_name, "imaginary");
        assert!(config.app_version.ends_with("+local"));
        assert_eq!(config.environment, "development");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.http_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.max_upload_size_bytes, 25 * 1024 * 1024);
        assert_eq!(config.target_concurrency(), None);
        assert_eq!(config.max_batch_size, 100);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_version_uses_image_tag() {
        let config = config_from(&[("BUILD_VERSION", "1.4.0"), ("BUILD_IMAGE_TAG", "abc123")])
            .unwrap();
        assert_eq!(config.app_version, "1.4.0+abc123");

        let config = config_from(&[("BUILD_VERSION", "1.4.0")]).unwrap();
        assert_eq!(config.app_version, "1.4.0+local");
    }

    #[test]
    fn test_base_path_normalized() {
        assert_eq!(normalize_base_path("/api/"), "/api");
        assert_eq!(normalize_base_path("api/v1"), "/api/v1");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path(""), "");
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(config_from(&[("API_PORT", "not-a-port")]).is_err());
        let config = config_from(&[("API_PORT", "0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unparseable_numbers_rejected() {
        for key in [
            "HTTP_TIMEOUT_SECS",
            "MAX_UPLOAD_SIZE_MB",
            "MAX_CONCURRENT_TARGETS",
            "MAX_BATCH_SIZE",
        ] {
            let err = config_from(&[(key, "ten")]).unwrap_err();
            assert!(err.to_string().contains(key), "{}", err);
            assert!(config_from(&[(key, "-1")]).is_err());
        }
    }

    #[test]
    fn test_upload_size_overflow_rejected() {
        let huge = usize::MAX.to_string();
        let err = config_from(&[("MAX_UPLOAD_SIZE_MB", huge.as_str())]).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = config_from(&[("HTTP_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.http_timeout(), None);
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let config = config_from(&[("COMMON_ENV", "production")]).unwrap();
        assert!(config.is_production());
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://a.example.com, https://b.example.com"),
        ])
        .unwrap();
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_format_parsing() {
        let config = config_from(&[("LOG_FORMAT", "JSON")]).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
