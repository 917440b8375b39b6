use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

use crate::error::CodecError;

/// Decoded pixels owned by exactly one pipeline run.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    image: DynamicImage,
}

impl ImageHandle {
    /// Decode any format the codec recognizes from its magic bytes.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(image::ImageError::IoError(e)))?;
        let image = reader.decode().map_err(CodecError::Decode)?;

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            size_bytes = data.len(),
            "Decoded image"
        );

        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// Replace the pixels with the output of one primitive.
    pub(crate) fn map(self, f: impl FnOnce(DynamicImage) -> DynamicImage) -> Self {
        Self {
            image: f(self.image),
        }
    }
}

impl ImageHandle {
    /// Fallible [`ImageHandle::map`].
    pub(crate) fn try_map<E>(
        self,
        f: impl FnOnce(DynamicImage) -> Result<DynamicImage, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            image: f(self.image)?,
        })
    }
}

impl From<DynamicImage> for ImageHandle {
    fn from(image: DynamicImage) -> Self {
        Self { image }
    }
}
