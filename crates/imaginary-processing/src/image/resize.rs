use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use imaginary_core::models::{Fit, Kernel, ResizeArgs};

use super::limits::check_output_size;
use crate::error::CodecError;

/// Background used when `contain` pads the image to the requested box.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Concrete resize request after max-dimension clamping and aspect correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Fit,
    pub kernel: Kernel,
}

impl ResizePlan {
    /// Resolve the target box for an image of `natural_width` x `natural_height`.
    ///
    /// A `maxWidth`/`maxHeight` clamp caps the requested dimension (or stands in for it when
    /// absent) and never exceeds the natural size. With `fit: contain` the shorter side is then
    /// recomputed from the natural aspect ratio.
    pub fn compute(natural_width: u32, natural_height: u32, args: &ResizeArgs) -> Self {
        let fit = args.fit.unwrap_or_default();
        let kernel = args.kernel.unwrap_or_default();

        let mut width = clamp_dimension(args.width, args.max_width, natural_width);
        let mut height = clamp_dimension(args.height, args.max_height, natural_height);

        if fit == Fit::Contain && natural_width > 0 && natural_height > 0 {
            let aspect = f64::from(natural_width) / f64::from(natural_height);
            if natural_width < natural_height {
                if let Some(h) = height {
                    width = Some(round_dimension(aspect * f64::from(h)));
                }
            } else if natural_height < natural_width {
                if let Some(w) = width {
                    height = Some(round_dimension(f64::from(w) / aspect));
                }
            }
        }

        ResizePlan {
            width,
            height,
            fit,
            kernel,
        }
    }

    /// Final `(width, height)` box, deriving a missing side from the aspect ratio.
    ///
    /// `None` when neither side is known, in which case resize is a no-op.
    pub fn target_box(&self, natural_width: u32, natural_height: u32) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            (Some(w), None) => {
                let ratio = f64::from(natural_height) / f64::from(natural_width.max(1));
                Some((w, round_dimension(f64::from(w) * ratio)))
            }
            (None, Some(h)) => {
                let ratio = f64::from(natural_width) / f64::from(natural_height.max(1));
                Some((round_dimension(f64::from(h) * ratio), h))
            }
            (None, None) => None,
        }
    }

    /// Resize `img`, failing when the resulting image would exceed the output limits.
    pub fn apply(&self, img: DynamicImage) -> Result<DynamicImage, CodecError> {
        let (orig_width, orig_height) = img.dimensions();
        let Some((width, height)) = self.target_box(orig_width, orig_height) else {
            return Ok(img);
        };
        check_output_size(width, height)?;
        let filter = filter_for(self.kernel);

        tracing::debug!(
            orig_width,
            orig_height,
            width,
            height,
            fit = %self.fit,
            kernel = %self.kernel,
            "Resizing image"
        );

        // A single requested side already preserves the aspect ratio for every fit.
        if self.width.is_none() || self.height.is_none() {
            return Ok(img.resize_exact(width, height, filter));
        }

        let resized = match self.fit {
            Fit::Cover => img.resize_to_fill(width, height, filter),
            Fit::Contain => resize_with_fill(&img, width, height, filter),
            Fit::Fill => img.resize_exact(width, height, filter),
            Fit::Inside => img.resize(width, height, filter),
            Fit::Outside => {
                let scale = (f64::from(width) / f64::from(orig_width.max(1)))
                    .max(f64::from(height) / f64::from(orig_height.max(1)));
                let (out_width, out_height) = (
                    round_dimension(f64::from(orig_width) * scale),
                    round_dimension(f64::from(orig_height) * scale),
                );
                check_output_size(out_width, out_height)?;
                img.resize_exact(out_width, out_height, filter)
            }
        };
        Ok(resized)
    }
}

fn clamp_dimension(requested: Option<u32>, max: Option<u32>, natural: u32) -> Option<u32> {
    match max {
        Some(max) => Some(requested.map_or(max, |r| r.min(max)).min(natural).max(1)),
        None => requested,
    }
}

fn round_dimension(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Map a resampling kernel onto the closest filter the codec offers.
pub fn filter_for(kernel: Kernel) -> FilterType {
    match kernel {
        Kernel::Nearest => FilterType::Nearest,
        Kernel::Linear => FilterType::Triangle,
        Kernel::Cubic | Kernel::Mitchell => FilterType::CatmullRom,
        Kernel::Lanczos2 | Kernel::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Scale to fit inside the box and center on an opaque background of the box size.
fn resize_with_fill(
    img: &DynamicImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> DynamicImage {
    let scaled = img.resize(target_width, target_height, filter);
    let (scaled_width, scaled_height) = scaled.dimensions();

    let mut canvas = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        target_width,
        target_height,
        BACKGROUND,
    ));

    let x_offset = target_width.saturating_sub(scaled_width) / 2;
    let y_offset = target_height.saturating_sub(scaled_height) / 2;
    imageops::overlay(&mut canvas, &scaled, i64::from(x_offset), i64::from(y_offset));

    canvas
}
