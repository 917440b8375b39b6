use serde_json::{Map, Value};

use super::rules::{self, Collector, FieldPath};
use super::{FieldError, ValidationErrors};
use crate::models::{
    Fit, Kernel, Operation, Pipeline, ResizeArgs, BLUR_SIGMA_MAX, BLUR_SIGMA_MIN,
};

/// Largest accepted resize dimension (width, height and their max clamps).
pub const MAX_DIMENSION: u32 = 16_384;

const RESIZE_KEYS: [&str; 6] = ["width", "height", "fit", "maxWidth", "maxHeight", "kernel"];
const OPERATION_KEYS: [&str; 2] = ["op", "args"];

/// Validate a raw pipeline description reported under the `pipeline` path.
pub fn validate_pipeline(value: &Value) -> Result<Pipeline, ValidationErrors> {
    validate_pipeline_at(value, &FieldPath::root("pipeline"))
}

/// Parse a JSON-encoded pipeline (multipart form field) and validate it.
pub fn validate_pipeline_json(raw: &str) -> Result<Pipeline, ValidationErrors> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| FieldError::new("pipeline", format!("must be valid JSON: {}", e)))?;
    validate_pipeline(&value)
}

pub(crate) fn validate_pipeline_at(
    value: &Value,
    path: &FieldPath,
) -> Result<Pipeline, ValidationErrors> {
    let items = rules::non_empty_array(value, path, "operation")?;

    let mut collector = Collector::new();
    let mut operations = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if let Some(op) = collector.check_all(validate_operation(item, &path.index(index))) {
            operations.push(op);
        }
    }

    let operations = collector.finish(operations)?;
    Pipeline::new(operations).map_err(|e| path.error(e.to_string()).into())
}

fn validate_operation(value: &Value, path: &FieldPath) -> Result<Operation, ValidationErrors> {
    let map = rules::object(value, path)?;
    let tag = rules::string(rules::required(map, "op", path)?, &path.key("op"))?;

    let mut collector = Collector::new();
    for error in rules::reject_unknown_keys(map, &OPERATION_KEYS, path) {
        collector.push(error);
    }

    let args_path = path.key("args");
    let op = match tag {
        "resize" => rules::required(map, "args", path)
            .map_err(ValidationErrors::from)
            .and_then(|args| validate_resize_args(args, &args_path))
            .map(Operation::Resize),
        "rotate" => rules::required(map, "args", path)
            .and_then(|args| rules::number(args, &args_path))
            .map(Operation::Rotate)
            .map_err(ValidationErrors::from),
        "blur" => rules::required(map, "args", path)
            .and_then(|args| rules::number_in_range(args, &args_path, BLUR_SIGMA_MIN, BLUR_SIGMA_MAX))
            .map(Operation::Blur)
            .map_err(ValidationErrors::from),
        // `args` is ignored for the argument-less mirrors
        "flip" => Ok(Operation::Flip),
        "flop" => Ok(Operation::Flop),
        other => Err(path.key("op").error(format!(
            "unrecognized operation '{}', expected one of [{}]",
            other,
            Operation::TAGS.join(", ")
        ))
        .into()),
    };

    let op = collector.check_all(op);
    let errors = collector.into_errors();
    match op {
        Some(op) if errors.is_empty() => Ok(op),
        _ => Err(errors),
    }
}

fn validate_resize_args(value: &Value, path: &FieldPath) -> Result<ResizeArgs, ValidationErrors> {
    let map: &Map<String, Value> = rules::object(value, path)?;

    let mut collector = Collector::new();
    for error in rules::reject_unknown_keys(map, &RESIZE_KEYS, path) {
        collector.push(error);
    }

    let dimension = |collector: &mut Collector, key: &str| -> Option<u32> {
        rules::optional(map, key)
            .and_then(|v| collector.check(rules::dimension(v, &path.key(key), MAX_DIMENSION)))
    };

    let width = dimension(&mut collector, "width");
    let height = dimension(&mut collector, "height");
    let max_width = dimension(&mut collector, "maxWidth");
    let max_height = dimension(&mut collector, "maxHeight");

    let fit_names: Vec<&str> = Fit::ALL.iter().map(|f| f.as_str()).collect();
    let fit = rules::optional(map, "fit")
        .and_then(|v| collector.check(rules::one_of(v, &path.key("fit"), Fit::parse, &fit_names)));

    let kernel_names: Vec<&str> = Kernel::ALL.iter().map(|k| k.as_str()).collect();
    let kernel = rules::optional(map, "kernel").and_then(|v| {
        collector.check(rules::one_of(
            v,
            &path.key("kernel"),
            Kernel::parse,
            &kernel_names,
        ))
    });

    collector.finish(ResizeArgs {
        width,
        height,
        fit,
        max_width,
        max_height,
        kernel,
    })
}
