//! HTTP handlers

pub mod config;
pub mod convert_image;
pub mod convert_urls;
