use serde_json::Value;
use std::collections::BTreeMap;

use super::pipeline::validate_pipeline_at;
use super::rules::{self, Collector, FieldPath};
use super::ValidationErrors;
use crate::models::{Format, OutputTarget, Pipeline, Target, UploadMethod};

const REQUEST_KEYS: [&str; 2] = ["pipeline", "urls"];
const TARGET_KEYS: [&str; 3] = ["input", "output", "format"];
const OUTPUT_KEYS: [&str; 3] = ["url", "method", "headers"];

/// Validated body of `POST /convert/urls`
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertUrlsRequest {
    pub pipeline: Pipeline,
    pub targets: Vec<Target>,
}

/// Validate `{ pipeline, urls }`, reporting errors from both parts together.
pub fn validate_convert_urls_request(body: &Value) -> Result<ConvertUrlsRequest, ValidationErrors> {
    let root = FieldPath::root("");
    let map = rules::object(body, &FieldPath::root("body"))?;

    let mut collector = Collector::new();
    for error in rules::reject_unknown_keys(map, &REQUEST_KEYS, &root) {
        collector.push(error);
    }

    let pipeline = collector
        .check(rules::required(map, "pipeline", &root))
        .and_then(|v| collector.check_all(validate_pipeline_at(v, &root.key("pipeline"))));

    let targets = collector
        .check(rules::required(map, "urls", &root))
        .and_then(|v| collector.check_all(validate_targets_at(v, &root.key("urls"))));

    match (pipeline, targets) {
        (Some(pipeline), Some(targets)) => collector.finish(ConvertUrlsRequest { pipeline, targets }),
        _ => Err(collector.into_errors()),
    }
}

/// Validate a raw target list reported under the `urls` path.
pub fn validate_targets(value: &Value) -> Result<Vec<Target>, ValidationErrors> {
    validate_targets_at(value, &FieldPath::root("urls"))
}

fn validate_targets_at(value: &Value, path: &FieldPath) -> Result<Vec<Target>, ValidationErrors> {
    let items = rules::non_empty_array(value, path, "target")?;

    let mut collector = Collector::new();
    let mut targets = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if let Some(target) = collector.check_all(validate_target(item, &path.index(index))) {
            targets.push(target);
        }
    }
    collector.finish(targets)
}

fn validate_target(value: &Value, path: &FieldPath) -> Result<Target, ValidationErrors> {
    let map = rules::object(value, path)?;

    let mut collector = Collector::new();
    for error in rules::reject_unknown_keys(map, &TARGET_KEYS, path) {
        collector.push(error);
    }

    let input = collector
        .check(rules::required(map, "input", path))
        .and_then(|v| collector.check(rules::http_url(v, &path.key("input"))));

    let output = collector
        .check(rules::required(map, "output", path))
        .and_then(|v| collector.check_all(validate_output(v, &path.key("output"))));

    let format_names: Vec<&str> = Format::ALL.iter().map(|f| f.as_str()).collect();
    let format = match rules::optional(map, "format") {
        Some(v) => collector.check(rules::one_of(
            v,
            &path.key("format"),
            |s| s.parse::<Format>().ok(),
            &format_names,
        )),
        None => Some(Format::default()),
    };

    match (input, output, format) {
        (Some(input), Some(output), Some(format)) => collector.finish(Target {
            input,
            output,
            format,
        }),
        _ => Err(collector.into_errors()),
    }
}

fn validate_output(value: &Value, path: &FieldPath) -> Result<OutputTarget, ValidationErrors> {
    if value.is_string() {
        return Ok(OutputTarget::from_url(rules::http_url(value, path)?));
    }

    let map = rules::object(value, path)?;

    let mut collector = Collector::new();
    for error in rules::reject_unknown_keys(map, &OUTPUT_KEYS, path) {
        collector.push(error);
    }

    let url = collector
        .check(rules::required(map, "url", path))
        .and_then(|v| collector.check(rules::http_url(v, &path.key("url"))));

    let method = match rules::optional(map, "method") {
        Some(v) => collector.check(rules::one_of(
            v,
            &path.key("method"),
            UploadMethod::parse,
            &["PUT", "POST"],
        )),
        None => Some(UploadMethod::default()),
    };

    let headers = match rules::optional(map, "headers") {
        Some(v) => collector.check_all(rules::header_map(v, &path.key("headers"))),
        None => Some(BTreeMap::new()),
    };

    match (url, method, headers) {
        (Some(url), Some(method), Some(headers)) => collector.finish(OutputTarget {
            url,
            method,
            headers,
        }),
        _ => Err(collector.into_errors()),
    }
}
