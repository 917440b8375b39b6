use bytes::Bytes;
use imaginary_core::models::{Format, Operation, Pipeline};

use super::filters::ImageFilters;
use super::handle::ImageHandle;
use super::orientation::ImageOrientation;
use super::resize::ResizePlan;
use crate::compression;
use crate::error::CodecError;

/// Applies a validated pipeline to one image, then encodes it.
pub struct PipelineExecutor;

impl PipelineExecutor {
    /// Apply every operation in order and encode the result.
    pub fn apply(
        pipeline: &Pipeline,
        image: ImageHandle,
        format: Format,
    ) -> Result<Bytes, CodecError> {
        let mut image = image;
        for op in pipeline {
            image = Self::apply_operation(image, op)?;
        }
        compression::encode(image.as_image(), format)
    }

    pub fn apply_operation(image: ImageHandle, op: &Operation) -> Result<ImageHandle, CodecError> {
        tracing::trace!(op = op.tag(), width = image.width(), height = image.height());

        match op {
            Operation::Resize(args) => {
                let plan = ResizePlan::compute(image.width(), image.height(), args);
                image.try_map(|img| plan.apply(img))
            }
            Operation::Rotate(degrees) => {
                image.try_map(|img| ImageOrientation::rotate(img, *degrees))
            }
            Operation::Flip => Ok(image.map(ImageOrientation::flip)),
            Operation::Flop => Ok(image.map(ImageOrientation::flop)),
            Operation::Blur(sigma) => Ok(image.map(|img| ImageFilters::blur(img, *sigma))),
        }
    }

    /// Decode `data`, run the pipeline and encode.
    pub fn process(data: &[u8], pipeline: &Pipeline, format: Format) -> Result<Bytes, CodecError> {
        let image = ImageHandle::decode(data)?;
        Self::apply(pipeline, image, format)
    }

    /// [`PipelineExecutor::process`] on the blocking thread pool.
    pub async fn run_blocking(
        data: Bytes,
        pipeline: Pipeline,
        format: Format,
    ) -> Result<Bytes, CodecError> {
        tokio::task::spawn_blocking(move || Self::process(&data, &pipeline, format))
            .await
            .map_err(|e| CodecError::Worker(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
    use imaginary_core::models::{Fit, ResizeArgs};
    use std::io::Cursor;

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 255])))
                .to_rgb8(),
        );
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    #[test]
    fn test_operations_apply_in_order() {
        let pipeline = Pipeline::new(vec![
            Operation::Resize(ResizeArgs {
                width: Some(40),
                height: Some(20),
                fit: Some(Fit::Fill),
                ..Default::default()
            }),
            Operation::Rotate(90.0),
        ])
        .unwrap();

        let data = PipelineExecutor::process(&jpeg_bytes(64, 64), &pipeline, Format::Png).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.dimensions(), (20, 40));
    }

    #[test]
    fn test_corrupt_input_is_codec_error() {
        let pipeline = Pipeline::new(vec![Operation::Flip]).unwrap();
        let err = PipelineExecutor::process(b"\xff\xd8garbage", &pipeline, Format::Webp).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_oversized_resize_fails_instead_of_allocating() {
        let pipeline = Pipeline::new(vec![Operation::Resize(ResizeArgs {
            width: Some(16_384),
            ..Default::default()
        })])
        .unwrap();

        let err = PipelineExecutor::process(&jpeg_bytes(2, 2000), &pipeline, Format::Png)
            .unwrap_err();
        assert!(matches!(err, CodecError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_run_blocking_rotates_jpeg_to_png() {
        let pipeline = Pipeline::new(vec![Operation::Rotate(90.0)]).unwrap();
        let data = PipelineExecutor::run_blocking(
            Bytes::from(jpeg_bytes(30, 10)),
            pipeline,
            Format::Png,
        )
        .await
        .unwrap();

        assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.dimensions(), (10, 30));
    }
}
