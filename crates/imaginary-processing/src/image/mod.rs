//! Image processing module
//!
//! This module provides the pipeline engine:
//! - Decoded image ownership (handle)
//! - Operation primitives (resize, orientation, filters)
//! - Ordered application of a validated pipeline (executor)

pub mod executor;
pub mod filters;
pub mod handle;
pub mod limits;
pub mod orientation;
pub mod resize;

pub use executor::PipelineExecutor;
pub use handle::ImageHandle;
pub use resize::ResizePlan;
