//! Progress reporting for the cleaning pipeline.
//!
//! The pipeline never prints. Every stage transition and every per-column
//! action is pushed to a [`ProgressReporter`] sink supplied by the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use order_cleaning::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline.
///
/// The seven cleaning stages run in the order of [`CleaningStage::SEQUENCE`].
/// `Initializing`, `Complete` and `Failed` only bracket a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Pipeline is initializing and recording the input shape
    Initializing,
    /// Coercing numeric text, imputing, dropping rows missing critical fields
    MissingValues,
    /// Removing repeated order ids
    Deduplication,
    /// Parsing dates, filtering emails, normalizing phone numbers
    TypeNormalization,
    /// Dropping non-positive amounts and `total_amount` outliers
    OutlierHandling,
    /// Title-casing labels and mapping gender values
    CategoricalStandardization,
    /// Adding date parts, age groups and revenue per item
    DerivedColumns,
    /// Computing the validation report
    Validation,
    /// All stages ran and the report is ready
    Complete,
    /// A stage returned an error; the table is lost
    Failed,
}

impl CleaningStage {
    /// The cleaning stages in execution order.
    pub const SEQUENCE: [CleaningStage; 7] = [
        Self::MissingValues,
        Self::Deduplication,
        Self::TypeNormalization,
        Self::OutlierHandling,
        Self::CategoricalStandardization,
        Self::DerivedColumns,
        Self::Validation,
    ];

    /// Name used in logs, progress messages and error reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::MissingValues => "Handling Missing Values",
            Self::Deduplication => "Removing Duplicates",
            Self::TypeNormalization => "Normalizing Types",
            Self::OutlierHandling => "Handling Outliers",
            Self::CategoricalStandardization => "Standardizing Categories",
            Self::DerivedColumns => "Creating Derived Columns",
            Self::Validation => "Validating",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall progress bar given to this stage. The weights of
    /// the non-terminal stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.02,
            Self::MissingValues => 0.20,
            Self::Deduplication => 0.10,
            Self::TypeNormalization => 0.20,
            Self::OutlierHandling => 0.15,
            Self::CategoricalStandardization => 0.13,
            Self::DerivedColumns => 0.15,
            Self::Validation => 0.05,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Sum of the weights of every stage before this one.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing => 0.0,
            Self::MissingValues => 0.02,
            Self::Deduplication => 0.22,
            Self::TypeNormalization => 0.32,
            Self::OutlierHandling => 0.52,
            Self::CategoricalStandardization => 0.67,
            Self::DerivedColumns => 0.80,
            Self::Validation => 0.95,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

impl std::fmt::Display for CleaningStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One progress event emitted while a table is cleaned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: CleaningStage,

    /// What inside the stage the update is about, such as a column name or
    /// "Validation report".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Fraction of the whole run, clamped to 0.0..=1.0.
    pub progress: f32,
    /// Fraction of the current stage.
    pub stage_progress: f32,

    pub message: String,

    /// Steps done so far when a stage reports per-step counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    /// Update placed `stage_progress` of the way through `stage`.
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    pub fn with_sub_stage(
        stage: CleaningStage,
        sub_stage: impl Into<String>,
        stage_progress: f32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sub_stage: Some(sub_stage.into()),
            ..Self::new(stage, stage_progress, message)
        }
    }

    /// Update for step `current` of `total`; stage progress is their ratio.
    pub fn with_items(
        stage: CleaningStage,
        sub_stage: impl Into<String>,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self {
            items_processed: Some(current),
            items_total: Some(total),
            ..Self::with_sub_stage(stage, sub_stage, stage_progress, message)
        }
    }

    /// Final update of a successful run, always at 100%.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(CleaningStage::Complete, 1.0, message)
    }

    /// Final update of an aborted run.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(CleaningStage::Failed, 0.0, message)
    }
}

/// Sink for progress updates and diagnostics emitted while cleaning.
///
/// Implementations must be `Send + Sync` so a pipeline can run on a worker
/// thread while its updates are consumed elsewhere.
pub trait ProgressReporter: Send + Sync {
    /// Receives stage starts and ends, every step message, absorbed parse
    /// failures and the final validation report.
    fn report(&self, update: ProgressUpdate);
}

/// Adapts a plain closure into a [`ProgressReporter`].
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(CleaningStage::Deduplication, 0.5, "Deduplicating...");
        assert_eq!(update.stage, CleaningStage::Deduplication);
        assert!(update.sub_stage.is_none());
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.27).abs() < 1e-6);
    }

    #[test]
    fn test_progress_update_with_items() {
        let update = ProgressUpdate::with_items(
            CleaningStage::MissingValues,
            "Column: customer_age",
            2,
            4,
            "Coercing customer_age",
        );
        assert_eq!(update.sub_stage, Some("Column: customer_age".to_string()));
        assert_eq!(update.stage_progress, 0.5);
        assert_eq!(update.items_processed, Some(2));
        assert_eq!(update.items_total, Some(4));
    }

    #[test]
    fn test_progress_update_terminal_states() {
        let done = ProgressUpdate::complete("Done");
        assert_eq!(done.stage, CleaningStage::Complete);
        assert_eq!(done.progress, 1.0);

        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, CleaningStage::Failed);
        assert_eq!(failed.progress, 0.0);
    }

    #[test]
    fn test_stage_weights_sum() {
        let total_weight: f32 = CleaningStage::Initializing.weight()
            + CleaningStage::SEQUENCE.iter().map(|s| s.weight()).sum::<f32>();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = CleaningStage::Initializing.weight();
        for stage in CleaningStage::SEQUENCE {
            assert!(
                (stage.base_progress() - expected).abs() < 1e-6,
                "{:?} should start at {}",
                stage,
                expected
            );
            expected += stage.weight();
        }
    }

    #[test]
    fn test_stage_json_values() {
        let expectations = [
            (CleaningStage::MissingValues, "\"missing_values\""),
            (CleaningStage::TypeNormalization, "\"type_normalization\""),
            (
                CleaningStage::CategoricalStandardization,
                "\"categorical_standardization\"",
            ),
            (CleaningStage::DerivedColumns, "\"derived_columns\""),
            (CleaningStage::Failed, "\"failed\""),
        ];

        for (stage, expected_json) in expectations {
            let json = serde_json::to_string(&stage).expect("Should serialize");
            assert_eq!(json, expected_json);
        }
    }

    #[test]
    fn test_closure_progress_reporter_across_threads() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::new(
                CleaningStage::Validation,
                0.5,
                "From a worker thread",
            ));
        })
        .join()
        .expect("Thread should not panic");
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }
}
