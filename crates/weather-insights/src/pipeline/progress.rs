//! Progress reporting for pipeline runs.
//!
//! Every stage transition is logged through `tracing` and, when a reporter is
//! attached, forwarded as a [`ProgressUpdate`].
//!
//! # Example
//!
//! ```rust,ignore
//! use weather_insights::Pipeline;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the source table
    Loading,
    /// Parsing dates, sorting, filling gaps
    Preprocessing,
    /// Global summary and daily resample
    Statistics,
    /// Rendering chart artifacts
    Charts,
    /// Per-season statistics
    SeasonalAggregation,
    /// Writing tables and the report
    Export,
    /// Run finished successfully
    Complete,
    /// Run aborted with an error
    Failed,
}

impl PipelineStage {
    /// Stages that do work, in order.
    pub const ACTIVE: [PipelineStage; 6] = [
        Self::Loading,
        Self::Preprocessing,
        Self::Statistics,
        Self::Charts,
        Self::SeasonalAggregation,
        Self::Export,
    ];

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Dataset",
            Self::Preprocessing => "Preprocessing",
            Self::Statistics => "Computing Statistics",
            Self::Charts => "Rendering Charts",
            Self::SeasonalAggregation => "Aggregating Seasons",
            Self::Export => "Exporting Results",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run attributed to this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Preprocessing => 0.25,
            Self::Statistics => 0.15,
            Self::Charts => 0.20,
            Self::SeasonalAggregation => 0.10,
            Self::Export => 0.15,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Preprocessing => 0.15,
            Self::Statistics => 0.40,
            Self::Charts => 0.55,
            Self::SeasonalAggregation => 0.75,
            Self::Export => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates during a run.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
