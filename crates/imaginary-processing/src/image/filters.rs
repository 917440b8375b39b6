use image::DynamicImage;

pub struct ImageFilters;

impl ImageFilters {
    /// Gaussian blur with standard deviation `sigma` (pixels).
    pub fn blur(img: DynamicImage, sigma: f64) -> DynamicImage {
        img.blur(sigma as f32)
    }
}
