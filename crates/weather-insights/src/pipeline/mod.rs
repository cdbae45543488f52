//! Pipeline module.
//!
//! This module provides the run orchestrator and its progress reporting.

mod builder;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder, PipelineOutcome};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
