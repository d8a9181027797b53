//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the order cleaning workflow.

use crate::config::{CleaningConfig, ConfigValidationError};
use crate::error::{CleaningError, Result};
use crate::pipeline::CleaningExecutor;
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::quality::DataValidator;
use crate::types::{CleaningResult, CleaningSummary, StageSummary, ValidationReport};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// The main cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use order_cleaning::{CleaningConfig, Pipeline};
///
/// let result = Pipeline::builder()
///     .config(CleaningConfig::builder().outlier_std_threshold(2.5).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("{} rows kept", result.data.height());
/// ```
pub struct Pipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    executor: CleaningExecutor,
}

// Pipelines can be handed to a worker thread.
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run every cleaning stage over `df` and validate the result.
    ///
    /// Row-level problems never fail the run; they shrink the table and show
    /// up as warnings in the summary. The returned table may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::CleaningFailed`] naming the stage when the
    /// dataframe engine fails inside a stage.
    pub fn process(&self, df: DataFrame) -> Result<CleaningResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Cleaning complete: {} of {} rows kept",
                    result.summary.rows_after, result.summary.rows_before
                )));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, mut df: DataFrame) -> Result<CleaningResult> {
        let start_time = Instant::now();
        let original_shape = (df.height(), df.width());

        info!(
            "Starting cleaning pipeline on {} rows x {} columns",
            original_shape.0, original_shape.1
        );
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Initializing,
            0.0,
            format!(
                "Starting cleaning pipeline on {} rows...",
                original_shape.0
            ),
        ));

        let mut summary = CleaningSummary::new();
        summary.rows_before = original_shape.0;
        summary.columns_before = original_shape.1;

        for stage in CleaningStage::SEQUENCE {
            if stage == CleaningStage::Validation {
                continue;
            }
            self.run_stage(stage, &mut df, &mut summary)?;
        }

        let validation = self.run_validation(original_shape, &df)?;

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.rows_after = df.height();
        summary.columns_after = df.width();
        summary.rows_removed = summary.rows_before.saturating_sub(summary.rows_after);

        if summary.rows_removed_percentage() > 30.0 {
            summary.add_warning(format!(
                "High data loss: {:.1}% of rows were removed",
                summary.rows_removed_percentage()
            ));
        }

        info!(
            "Cleaning finished in {} ms: {} -> {} rows",
            summary.duration_ms, summary.rows_before, summary.rows_after
        );

        Ok(CleaningResult {
            data: df,
            summary,
            validation,
        })
    }

    /// Run one mutating stage and fold its log into the summary.
    fn run_stage(
        &self,
        stage: CleaningStage,
        df: &mut DataFrame,
        summary: &mut CleaningSummary,
    ) -> Result<()> {
        let rows_before = df.height();

        info!("{}...", stage.display_name());
        self.report_progress(ProgressUpdate::new(
            stage,
            0.0,
            format!("{}...", stage.display_name()),
        ));

        let log = self
            .executor
            .execute_stage(stage, df, &self.config)
            .map_err(|e| CleaningError::CleaningFailed {
                stage: stage.display_name().to_string(),
                reason: format!("{:#}", e),
            })?;

        let total_steps = log.steps.len();
        for (i, step) in log.steps.iter().enumerate() {
            self.report_progress(ProgressUpdate::with_items(
                stage,
                stage.display_name(),
                i + 1,
                total_steps,
                step.clone(),
            ));
        }

        for issue in &log.issues {
            warn!("{}: {}", stage.display_name(), issue);
            self.report_progress(ProgressUpdate::with_sub_stage(
                stage,
                issue.error_code(),
                1.0,
                issue.to_string(),
            ));
            summary.add_warning(issue.to_string());
        }

        if stage == CleaningStage::MissingValues {
            summary.missing_before = log.missing_before;
        }
        summary.columns_added.extend(log.columns_added);
        for action in log.actions {
            summary.add_action(action);
        }

        let stage_summary = StageSummary {
            stage,
            rows_before,
            rows_after: df.height(),
            steps: log.steps,
        };
        self.report_progress(ProgressUpdate::new(
            stage,
            1.0,
            format!(
                "{} complete: {} rows removed",
                stage.display_name(),
                stage_summary.rows_removed()
            ),
        ));
        summary.stages.push(stage_summary);

        Ok(())
    }

    /// Compute the validation report and forward it to the sink.
    fn run_validation(
        &self,
        original_shape: (usize, usize),
        df: &DataFrame,
    ) -> Result<ValidationReport> {
        let stage = CleaningStage::Validation;
        self.report_progress(ProgressUpdate::new(
            stage,
            0.0,
            "Validating cleaned data...",
        ));

        let report = DataValidator::validate(original_shape, df).map_err(|e| {
            CleaningError::CleaningFailed {
                stage: stage.display_name().to_string(),
                reason: format!("{:#}", e),
            }
        })?;

        info!(
            "Validation: {:?} -> {:?}, {} records removed, {} missing values",
            report.original_shape, report.final_shape, report.records_removed, report.missing_values
        );
        if report.has_duplicate_order_ids() {
            warn!(
                "{} duplicate order ids remain",
                report.duplicate_order_ids.unwrap_or_default()
            );
        }

        self.report_progress(ProgressUpdate::with_sub_stage(
            stage,
            "Validation report",
            1.0,
            serde_json::to_string(&report)?,
        ));

        Ok(report)
    }
}

/// Clean a table with the default configuration.
///
/// Convenience wrapper around [`Pipeline::process`] that keeps only the data.
pub fn clean(df: DataFrame) -> Result<DataFrame> {
    let pipeline = Pipeline::builder()
        .build()
        .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;
    Ok(pipeline.process(df)?.data)
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use order_cleaning::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct StderrReporter;
    ///
    /// impl ProgressReporter for StderrReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         eprintln!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(StderrReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For anything beyond a closure, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            executor: CleaningExecutor,
        })
    }
}
