//! Image fixtures for integration tests.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .expect("encode fixture");
    buffer
}

/// Opaque JPEG with a horizontal gradient so dimensions are easy to tell apart.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, _| {
        Rgb([(x * 255 / width.max(1)) as u8, 120, 40])
    });
    encode(&DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([30, 60, 200, 255]));
    encode(&DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

pub fn dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).expect("decode output");
    (img.width(), img.height())
}

pub fn detect_format(data: &[u8]) -> ImageFormat {
    image::guess_format(data).expect("recognizable image format")
}
