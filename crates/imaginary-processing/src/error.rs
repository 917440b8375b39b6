use imaginary_core::models::Format;
use imaginary_core::AppError;

/// Failure inside the codec: decoding, an operation primitive or the final encoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image as {format}: {message}")]
    Encode { format: Format, message: String },

    /// An operation would produce an image beyond the output size limits.
    #[error(
        "operation output of {width}x{height} exceeds the limit of {max_dimension} pixels per side or {max_pixels} pixels in total",
        max_dimension = crate::image::limits::MAX_OUTPUT_DIMENSION,
        max_pixels = crate::image::limits::MAX_OUTPUT_PIXELS
    )]
    TooLarge { width: u32, height: u32 },

    /// The blocking task running the pipeline did not complete.
    #[error("image worker aborted: {0}")]
    Worker(String),
}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Worker(msg) => AppError::Internal(msg),
            other => AppError::ImageProcessing(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imaginary_core::ErrorMetadata;

    #[test]
    fn test_codec_errors_map_to_processing_errors() {
        let err: AppError = CodecError::Encode {
            format: Format::Webp,
            message: "too large".to_string(),
        }
        .into();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "IMAGE_PROCESSING_ERROR");
        assert!(err.client_message().contains("webp"));

        let err: AppError = CodecError::TooLarge {
            width: 16_384,
            height: 16_384_000,
        }
        .into();
        assert_eq!(err.http_status_code(), 400);
        assert!(err.client_message().contains("16384x16384000"));

        let err: AppError = CodecError::Worker("panicked".to_string()).into();
        assert_eq!(err.http_status_code(), 500);
    }
}
