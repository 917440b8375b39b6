//! Batch targets of the URL conversion endpoint.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

use super::format::Format;

/// HTTP method used to write the processed image back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UploadMethod {
    #[default]
    Put,
    Post,
}

impl UploadMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadMethod::Put => "PUT",
            UploadMethod::Post => "POST",
        }
    }

    /// Case-insensitive parse of `PUT` / `POST`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PUT" => Some(UploadMethod::Put),
            "POST" => Some(UploadMethod::Post),
            _ => None,
        }
    }
}

impl fmt::Display for UploadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved write-back destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OutputTarget {
    pub url: String,
    pub method: UploadMethod,
    /// Header value templates; see [`crate::models::OutputVariables`].
    pub headers: BTreeMap<String, String>,
}

impl OutputTarget {
    /// Shorthand form: a bare URL written with PUT and no extra headers.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: UploadMethod::default(),
            headers: BTreeMap::new(),
        }
    }
}

/// One `(input, output, format)` entry of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Target {
    pub input: String,
    pub output: OutputTarget,
    pub format: Format,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!(UploadMethod::parse("put"), Some(UploadMethod::Put));
        assert_eq!(UploadMethod::parse("POST"), Some(UploadMethod::Post));
        assert_eq!(UploadMethod::parse("PATCH"), None);
    }

    #[test]
    fn test_shorthand_output_defaults_to_put() {
        let output = OutputTarget::from_url("http://example.com/out.webp");
        assert_eq!(output.method, UploadMethod::Put);
        assert!(output.headers.is_empty());
    }
}
