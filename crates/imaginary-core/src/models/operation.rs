//! Closed vocabulary of pipeline operations.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Minimum accepted blur sigma.
pub const BLUR_SIGMA_MIN: f64 = 0.3;
/// Maximum accepted blur sigma.
pub const BLUR_SIGMA_MAX: f64 = 1000.0;

/// One step of a pipeline.
///
/// Only the schema validator (or Rust code) can build these, so the executor never sees an
/// unknown tag or malformed arguments.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "op", content = "args", rename_all = "lowercase")]
pub enum Operation {
    Resize(ResizeArgs),
    /// Rotation angle in degrees, clockwise.
    Rotate(f64),
    /// Mirror vertically (top becomes bottom).
    Flip,
    /// Mirror horizontally (left becomes right).
    Flop,
    /// Gaussian blur sigma.
    Blur(f64),
}

impl Operation {
    pub const TAGS: [&'static str; 5] = ["resize", "rotate", "flip", "flop", "blur"];

    pub fn tag(&self) -> &'static str {
        match self {
            Operation::Resize(_) => "resize",
            Operation::Rotate(_) => "rotate",
            Operation::Flip => "flip",
            Operation::Flop => "flop",
            Operation::Blur(_) => "blur",
        }
    }
}

/// Arguments of the `resize` operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResizeArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<Fit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel: Option<Kernel>,
}

/// How the image is fitted into the requested box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale to cover the box, cropping the overflow (centered).
    #[default]
    Cover,
    /// Scale to fit inside the box, preserving aspect ratio, padding with the background.
    Contain,
    /// Stretch to the exact box, ignoring aspect ratio.
    Fill,
    /// Scale to fit inside the box without padding.
    Inside,
    /// Scale to cover the box without cropping.
    Outside,
}

impl Fit {
    pub const ALL: [Fit; 5] = [Fit::Cover, Fit::Contain, Fit::Fill, Fit::Inside, Fit::Outside];

    pub fn as_str(self) -> &'static str {
        match self {
            Fit::Cover => "cover",
            Fit::Contain => "contain",
            Fit::Fill => "fill",
            Fit::Inside => "inside",
            Fit::Outside => "outside",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resampling kernel used by `resize`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Nearest,
    Linear,
    Cubic,
    Mitchell,
    Lanczos2,
    #[default]
    Lanczos3,
}

impl Kernel {
    pub const ALL: [Kernel; 6] = [
        Kernel::Nearest,
        Kernel::Linear,
        Kernel::Cubic,
        Kernel::Mitchell,
        Kernel::Lanczos2,
        Kernel::Lanczos3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Kernel::Nearest => "nearest",
            Kernel::Linear => "linear",
            Kernel::Cubic => "cubic",
            Kernel::Mitchell => "mitchell",
            Kernel::Lanczos2 => "lanczos2",
            Kernel::Lanczos3 => "lanczos3",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape_matches_request_shape() {
        let op = Operation::Rotate(90.0);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            serde_json::json!({"op": "rotate", "args": 90.0})
        );

        let op = Operation::Flip;
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            serde_json::json!({"op": "flip"})
        );

        let op = Operation::Resize(ResizeArgs {
            max_width: Some(100),
            fit: Some(Fit::Contain),
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            serde_json::json!({"op": "resize", "args": {"fit": "contain", "maxWidth": 100}})
        );
    }

    #[test]
    fn test_parse_fit_and_kernel() {
        assert_eq!(Fit::parse("contain"), Some(Fit::Contain));
        assert_eq!(Fit::parse("stretch"), None);
        assert_eq!(Kernel::parse("lanczos2"), Some(Kernel::Lanczos2));
        assert_eq!(Kernel::parse("bilinear"), None);
    }
}
