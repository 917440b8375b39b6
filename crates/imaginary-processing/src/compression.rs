use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use imaginary_core::models::Format;
use std::io::Cursor;

use crate::error::CodecError;

/// Lossy quality used for JPEG output (0-100).
pub const JPEG_QUALITY: u8 = 80;
/// Lossy quality used for WebP output (0-100).
pub const WEBP_QUALITY: f32 = 80.0;
/// Largest width or height libwebp can encode.
const WEBP_MAX_DIMENSION: u32 = 16_383;

/// Encode the final image in the requested output format.
pub fn encode(img: &DynamicImage, format: Format) -> Result<Bytes, CodecError> {
    let data = match format {
        Format::Png => encode_png(img)?,
        Format::Jpeg => encode_jpeg(img)?,
        Format::Webp => encode_webp(img)?,
    };

    tracing::debug!(
        format = %format,
        width = img.width(),
        height = img.height(),
        size_bytes = data.len(),
        "Encoded image"
    );

    Ok(data)
}

fn encode_png(img: &DynamicImage) -> Result<Bytes, CodecError> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| CodecError::Encode {
            format: Format::Png,
            message: e.to_string(),
        })?;
    Ok(Bytes::from(buffer))
}

/// JPEG has no alpha channel; transparent pixels are flattened to their color (black for
/// rotation fill).
fn encode_jpeg(img: &DynamicImage) -> Result<Bytes, CodecError> {
    let rgb_img = img.to_rgb8();
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder
        .encode_image(&rgb_img)
        .map_err(|e| CodecError::Encode {
            format: Format::Jpeg,
            message: e.to_string(),
        })?;
    Ok(Bytes::from(buffer))
}

fn encode_webp(img: &DynamicImage) -> Result<Bytes, CodecError> {
    let (width, height) = img.dimensions();
    if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
        return Err(CodecError::Encode {
            format: Format::Webp,
            message: format!(
                "{}x{} exceeds the maximum webp dimension of {}",
                width, height, WEBP_MAX_DIMENSION
            ),
        });
    }

    let rgba_img = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    let webp_data = encoder
        .encode_simple(false, WEBP_QUALITY)
        .map_err(|e| CodecError::Encode {
            format: Format::Webp,
            message: format!("{:?}", e),
        })?;

    Ok(Bytes::copy_from_slice(&webp_data))
}
