//! Imaginary Processing Library
//!
//! Decoding, pipeline execution and encoding of images. All functions here are CPU-bound
//! and synchronous except [`crate::image::PipelineExecutor::run_blocking`], which moves the
//! work onto tokio's blocking pool.

pub mod compression;
pub mod error;
pub mod image;

pub use crate::compression::{encode, JPEG_QUALITY, WEBP_QUALITY};
pub use crate::error::CodecError;
pub use crate::image::{ImageHandle, PipelineExecutor, ResizePlan};
