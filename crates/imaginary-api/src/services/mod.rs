//! Services behind the HTTP handlers

pub mod batch;
pub mod transfer;

pub use batch::{BatchFailure, BatchOrchestrator, BatchOutcome, TargetReport, TargetStatus};
pub use transfer::TransferClient;
