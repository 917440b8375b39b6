use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use super::limits::check_output_size;
use crate::error::CodecError;

/// Pixels uncovered by an arbitrary rotation.
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Image orientation operations (rotation and mirroring)
pub struct ImageOrientation;

impl ImageOrientation {
    /// Normalize an angle in degrees to `[0, 360)`; negative angles turn counter-clockwise.
    pub fn normalize_angle(degrees: f64) -> f64 {
        let angle = degrees.rem_euclid(360.0);
        // rem_euclid rounds tiny negative angles up to exactly 360
        if angle >= 360.0 {
            0.0
        } else {
            angle
        }
    }

    /// Rotate clockwise by `degrees`.
    ///
    /// Quarter turns are lossless. Any other angle grows the canvas to the rotated bounding
    /// box and leaves the uncovered corners transparent.
    pub fn rotate(img: DynamicImage, degrees: f64) -> Result<DynamicImage, CodecError> {
        let angle = Self::normalize_angle(degrees);
        let quarter_turns = angle / 90.0;

        if quarter_turns.fract() == 0.0 {
            return Ok(match quarter_turns as u32 {
                0 => img,
                1 => img.rotate90(),
                2 => img.rotate180(),
                _ => img.rotate270(),
            });
        }

        Self::rotate_expanded(&img, angle)
    }

    fn rotate_expanded(img: &DynamicImage, degrees: f64) -> Result<DynamicImage, CodecError> {
        let (width, height) = img.dimensions();
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (w, h) = (f64::from(width), f64::from(height));

        let bound_width = ((w * cos.abs() + h * sin.abs()).round() as u32).max(1);
        let bound_height = ((w * sin.abs() + h * cos.abs()).round() as u32).max(1);

        // Square canvas large enough to hold the image at any angle.
        let side = (w.hypot(h).ceil() as u32).max(bound_width).max(bound_height);
        check_output_size(side, side)?;
        let mut canvas = RgbaImage::from_pixel(side, side, TRANSPARENT);
        image::imageops::overlay(
            &mut canvas,
            &img.to_rgba8(),
            i64::from((side - width) / 2),
            i64::from((side - height) / 2),
        );

        let rotated = rotate_about_center(
            &canvas,
            degrees.to_radians() as f32,
            Interpolation::Bilinear,
            TRANSPARENT,
        );

        tracing::debug!(
            degrees,
            width,
            height,
            bound_width,
            bound_height,
            "Rotated image by arbitrary angle"
        );

        Ok(DynamicImage::ImageRgba8(rotated).crop_imm(
            (side - bound_width) / 2,
            (side - bound_height) / 2,
            bound_width,
            bound_height,
        ))
    }

    /// Mirror vertically (top becomes bottom)
    pub fn flip(img: DynamicImage) -> DynamicImage {
        img.flipv()
    }

    /// Mirror horizontally (left becomes right)
    pub fn flop(img: DynamicImage) -> DynamicImage {
        img.fliph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(ImageOrientation::normalize_angle(450.0), 90.0);
        assert_eq!(ImageOrientation::normalize_angle(-90.0), 270.0);
        assert_eq!(ImageOrientation::normalize_angle(360.0), 0.0);
        assert_eq!(ImageOrientation::normalize_angle(45.5), 45.5);
        assert_eq!(ImageOrientation::normalize_angle(-1e-20), 0.0);
    }

    #[test]
    fn test_tiny_negative_angle_keeps_orientation() {
        let rotated = ImageOrientation::rotate(marked(4, 2), -1e-20).unwrap();
        assert_eq!(rotated.dimensions(), (4, 2));
        assert_eq!(rotated.to_rgba8(), marked(4, 2).to_rgba8());
    }

    #[test]
    fn test_oversized_arbitrary_rotation_is_rejected() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::new(16_384, 2000));
        let err = ImageOrientation::rotate(img, 45.0).unwrap_err();
        assert!(matches!(err, CodecError::TooLarge { .. }));
    }

    #[test]
    fn test_quarter_turns_swap_dimensions() {
        let img = marked(4, 2);
        assert_eq!(ImageOrientation::rotate(img.clone(), 90.0).unwrap().dimensions(), (2, 4));
        assert_eq!(ImageOrientation::rotate(img.clone(), 180.0).unwrap().dimensions(), (4, 2));
        assert_eq!(ImageOrientation::rotate(img.clone(), -90.0).unwrap().dimensions(), (2, 4));
        assert_eq!(ImageOrientation::rotate(img.clone(), 720.0).unwrap().dimensions(), (4, 2));
    }

    #[test]
    fn test_rotate_90_is_clockwise() {
        // top-left corner ends up top-right after a clockwise quarter turn
        let rotated = ImageOrientation::rotate(marked(4, 2), 90.0).unwrap().to_rgba8();
        assert_eq!(*rotated.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_arbitrary_angle_expands_canvas() {
        let rotated = ImageOrientation::rotate(marked(100, 50), 45.0).unwrap();
        let (w, h) = rotated.dimensions();
        // 100 * cos45 + 50 * sin45 ≈ 106
        assert_eq!((w, h), (106, 106));

        // corners are outside the rotated rectangle
        let rgba = rotated.to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0)[3], 0);
        assert_eq!(rgba.get_pixel(w / 2, h / 2)[3], 255);
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let img = marked(5, 3);
        let twice = ImageOrientation::flip(ImageOrientation::flip(img.clone()));
        assert_eq!(twice.to_rgba8(), img.to_rgba8());

        let twice = ImageOrientation::flop(ImageOrientation::flop(img.clone()));
        assert_eq!(twice.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_flip_and_flop_directions() {
        let flipped = ImageOrientation::flip(marked(5, 3)).to_rgba8();
        assert_eq!(*flipped.get_pixel(0, 2), Rgba([255, 0, 0, 255]));

        let flopped = ImageOrientation::flop(marked(5, 3)).to_rgba8();
        assert_eq!(*flopped.get_pixel(4, 0), Rgba([255, 0, 0, 255]));
    }
}
