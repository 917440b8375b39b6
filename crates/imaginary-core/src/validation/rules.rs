//! Per-field rules shared by the pipeline and target validators.

use http::{HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use validator::ValidateUrl;

use super::{FieldError, ValidationErrors};

/// Dotted/indexed location of a value inside the request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldPath(String);

impl FieldPath {
    pub(crate) fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    pub(crate) fn key(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{}", self.0, key))
        }
    }

    pub(crate) fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> FieldError {
        FieldError::new(self.0.clone(), message)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates errors so that one request reports every violation at once.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    errors: ValidationErrors,
}

impl Collector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    pub(crate) fn check_all<T>(&mut self, result: Result<T, ValidationErrors>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(errors) => {
                self.errors.extend(errors);
                None
            }
        }
    }

    pub(crate) fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub(crate) fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        self.errors.into_result(value)
    }

    pub(crate) fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn object<'a>(
    value: &'a Value,
    path: &FieldPath,
) -> Result<&'a Map<String, Value>, FieldError> {
    value
        .as_object()
        .ok_or_else(|| path.error(format!("must be an object, got {}", type_name(value))))
}

pub(crate) fn array<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a Vec<Value>, FieldError> {
    value
        .as_array()
        .ok_or_else(|| path.error(format!("must be an array, got {}", type_name(value))))
}

pub(crate) fn non_empty_array<'a>(
    value: &'a Value,
    path: &FieldPath,
    what: &str,
) -> Result<&'a Vec<Value>, FieldError> {
    let items = array(value, path)?;
    if items.is_empty() {
        return Err(path.error(format!("must contain at least one {}", what)));
    }
    Ok(items)
}

pub(crate) fn required<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &FieldPath,
) -> Result<&'a Value, FieldError> {
    match map.get(key) {
        Some(Value::Null) | None => Err(path.key(key).error("is required")),
        Some(value) => Ok(value),
    }
}

/// `null` is treated like an absent key.
pub(crate) fn optional<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

pub(crate) fn reject_unknown_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    path: &FieldPath,
) -> Vec<FieldError> {
    map.keys()
        .filter(|k| !allowed.contains(&k.as_str()))
        .map(|k| path.key(k).error("is not allowed"))
        .collect()
}

pub(crate) fn string<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a str, FieldError> {
    value
        .as_str()
        .ok_or_else(|| path.error(format!("must be a string, got {}", type_name(value))))
}

pub(crate) fn number(value: &Value, path: &FieldPath) -> Result<f64, FieldError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| path.error(format!("must be a number, got {}", type_name(value))))
}

pub(crate) fn number_in_range(
    value: &Value,
    path: &FieldPath,
    min: f64,
    max: f64,
) -> Result<f64, FieldError> {
    let n = number(value, path)?;
    if n < min || n > max {
        return Err(path.error(format!("must be between {} and {}, got {}", min, max, n)));
    }
    Ok(n)
}

/// Positive pixel dimension, rounded to the nearest whole pixel (never below 1).
pub(crate) fn dimension(value: &Value, path: &FieldPath, max: u32) -> Result<u32, FieldError> {
    let n = number(value, path)?;
    if n <= 0.0 {
        return Err(path.error(format!("must be a positive number, got {}", n)));
    }
    if n > f64::from(max) {
        return Err(path.error(format!("must not exceed {}, got {}", max, n)));
    }
    Ok((n.round() as u32).max(1))
}

/// String drawn from a closed set of values.
pub(crate) fn one_of<T>(
    value: &Value,
    path: &FieldPath,
    parse: impl Fn(&str) -> Option<T>,
    allowed: &[&str],
) -> Result<T, FieldError> {
    let s = string(value, path)?;
    parse(s).ok_or_else(|| {
        path.error(format!(
            "must be one of [{}], got '{}'",
            allowed.join(", "),
            s
        ))
    })
}

/// Absolute http(s) URL.
pub(crate) fn http_url(value: &Value, path: &FieldPath) -> Result<String, FieldError> {
    let s = string(value, path)?.trim();
    let lower = s.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(path.error(format!("must be an http or https URL, got '{}'", s)));
    }
    if !s.validate_url() {
        return Err(path.error(format!("must be a valid URI, got '{}'", s)));
    }
    Ok(s.to_string())
}

/// Object of HTTP header names to string values.
///
/// `OUTPUT_LENGTH` expands to digits only, so a value that parses before rendering still
/// parses after.
pub(crate) fn header_map(
    value: &Value,
    path: &FieldPath,
) -> Result<BTreeMap<String, String>, ValidationErrors> {
    let headers = string_map(value, path)?;
    let mut collector = Collector::new();
    for (name, value) in &headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            collector.push(path.key(name).error("is not a valid header name"));
        } else if HeaderValue::from_str(value).is_err() {
            collector.push(path.key(name).error("is not a valid header value"));
        }
    }
    collector.finish(headers)
}

/// Object whose values are all strings.
pub(crate) fn string_map(
    value: &Value,
    path: &FieldPath,
) -> Result<BTreeMap<String, String>, ValidationErrors> {
    let map = object(value, path)?;
    let mut collector = Collector::new();
    let mut out = BTreeMap::new();
    for (key, v) in map {
        if let Some(s) = collector.check(string(v, &path.key(key))) {
            out.insert(key.clone(), s.to_string());
        }
    }
    collector.finish(out)
}
