//! Domain models: operations, pipelines, batch targets and output formats.

pub mod format;
pub mod operation;
pub mod output_variables;
pub mod pipeline;
pub mod target;

pub use format::{Format, UnknownFormat};
pub use operation::{Fit, Kernel, Operation, ResizeArgs, BLUR_SIGMA_MAX, BLUR_SIGMA_MIN};
pub use output_variables::OutputVariables;
pub use pipeline::{EmptyPipeline, Pipeline};
pub use target::{OutputTarget, Target, UploadMethod};
