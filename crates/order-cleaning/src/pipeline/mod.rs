//! Pipeline module.
//!
//! This module provides the main cleaning pipeline and related components.

mod builder;
mod executor;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder, clean};
pub use executor::{CleaningExecutor, StageLog};
pub use outliers::OutlierHandler;
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
