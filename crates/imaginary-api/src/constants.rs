//! API constants
//!
//! Route paths are relative to the optional `BASE_PATH` prefix.

pub const CONVERT_URLS_PATH: &str = "/convert/urls";
pub const CONVERT_IMAGE_PATH: &str = "/convert/image";
pub const HEALTHZ_PATH: &str = "/healthz";
pub const UPTIMEZ_PATH: &str = "/uptimez";
pub const CONFIG_PATH: &str = "/config";
pub const OPENAPI_PATH: &str = "/openapi.json";
pub const DOCS_PATH: &str = "/docs";

/// Multipart field names accepted by `POST /convert/image`
pub mod form_fields {
    pub const IMAGE: &str = "image";
    pub const PIPELINE: &str = "pipeline";
    pub const FORMAT: &str = "format";
}

/// Default cap on in-flight HTTP requests (`HTTP_CONCURRENCY_LIMIT`).
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 1024;
