use crate::pipeline::CleaningStage;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub null_percentage: f64,
    /// Distinct non-missing values.
    pub unique_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueStats {
    pub total: f64,
    /// `None` when the column holds no values.
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStats {
    pub total_customers: usize,
    pub total_orders: usize,
    /// `None` without any customer.
    pub avg_orders_per_customer: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataProfile {
    /// (rows, columns)
    pub shape: (usize, usize),
    pub memory_usage_mb: f64,
    pub column_profiles: Vec<ColumnProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<RevenueStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<CustomerStats>,
}

// ============================================================================
// Validation Types
// ============================================================================

/// Diagnostics computed over the final table. Pure observation, no mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// (rows, columns) of the input table.
    pub original_shape: (usize, usize),
    /// (rows, columns) of the cleaned table.
    pub final_shape: (usize, usize),
    pub records_removed: usize,
    /// Missing cells across all columns.
    pub missing_values: usize,
    /// Rows repeating an earlier `order_id`; `None` without an `order_id` column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_order_ids: Option<usize>,
    /// Earliest `order_date`, as `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_order_date: Option<String>,
    /// Latest `order_date`, as `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_order_date: Option<String>,
}

impl ValidationReport {
    /// Whether the cleaned table still holds duplicate order ids.
    pub fn has_duplicate_order_ids(&self) -> bool {
        self.duplicate_order_ids.is_some_and(|count| count > 0)
    }

    /// Percentage of input rows removed by cleaning.
    pub fn records_removed_percentage(&self) -> f64 {
        if self.original_shape.0 == 0 {
            0.0
        } else {
            (self.records_removed as f64 / self.original_shape.0 as f64) * 100.0
        }
    }
}

// ============================================================================
// Cleaning Summary Types
// ============================================================================

/// Outcome of a full pipeline run.
#[derive(Debug, Clone)]
pub struct CleaningResult {
    /// The cleaned table, owned by the caller.
    pub data: DataFrame,
    pub summary: CleaningSummary,
    pub validation: ValidationReport,
}

/// Human-readable summary of what the pipeline did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Wall-clock time of the whole run.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,

    pub columns_before: usize,
    pub columns_after: usize,
    /// Derived columns added by the pipeline.
    pub columns_added: Vec<String>,

    /// Missing-value count per input column, observed before cleaning.
    pub missing_before: Vec<(String, usize)>,

    /// Per-stage row accounting, in execution order.
    pub stages: Vec<StageSummary>,

    /// List of actions taken during cleaning.
    pub actions: Vec<CleaningAction>,

    /// Row-scoped problems (such as unparseable values) that were absorbed.
    pub warnings: Vec<String>,
}

impl CleaningSummary {
    /// Empty summary; the pipeline fills it in as stages run.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: CleaningAction) {
        self.actions.push(action);
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Rows removed by a given stage, if it ran.
    pub fn rows_removed_by(&self, stage: CleaningStage) -> Option<usize> {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map(StageSummary::rows_removed)
    }

    /// Share of input rows the run dropped, 0 for an empty input.
    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed as f32 / self.rows_before as f32) * 100.0
        }
    }
}

/// Row counts around a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: CleaningStage,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Step messages produced by the stage.
    pub steps: Vec<String>,
}

impl StageSummary {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// A single action taken during cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningAction {
    pub action_type: ActionType,
    /// Column the action touched, or "dataset" for row removals.
    pub target: String,
    pub description: String,
    /// Additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CleaningAction {
    /// Create a new cleaning action.
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Types of actions that can be taken during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Rows with missing or invalid values were removed.
    RowsRemoved,
    /// Duplicate orders were removed.
    DuplicatesRemoved,
    /// Missing values were imputed.
    ValueImputed,
    /// A column's data type was corrected.
    TypeCorrected,
    /// Outliers were removed.
    OutlierHandled,
    /// Categorical labels were standardized.
    CategoriesStandardized,
    /// Derived columns were added.
    ColumnsDerived,
}

impl ActionType {
    /// Title-cased label for the text summary.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RowsRemoved => "Rows Removed",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::ValueImputed => "Value Imputed",
            Self::TypeCorrected => "Type Corrected",
            Self::OutlierHandled => "Outlier Handled",
            Self::CategoriesStandardized => "Categories Standardized",
            Self::ColumnsDerived => "Columns Derived",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaning_summary_default() {
        let summary = CleaningSummary::default();
        assert_eq!(summary.duration_ms, 0);
        assert_eq!(summary.rows_before, 0);
        assert!(summary.actions.is_empty());
        assert_eq!(summary.rows_removed_percentage(), 0.0);
    }

    #[test]
    fn test_rows_removed_by_stage() {
        let mut summary = CleaningSummary::new();
        summary.stages.push(StageSummary {
            stage: CleaningStage::Deduplication,
            rows_before: 10,
            rows_after: 7,
            steps: vec!["Removed 3 duplicate records (30.0%)".to_string()],
        });

        assert_eq!(summary.rows_removed_by(CleaningStage::Deduplication), Some(3));
        assert_eq!(summary.rows_removed_by(CleaningStage::OutlierHandling), None);
    }

    #[test]
    fn test_cleaning_action_with_details() {
        let action = CleaningAction::new(
            ActionType::ValueImputed,
            "customer_age",
            "Imputed 4 missing values",
        )
        .with_details("median 34.5");

        assert_eq!(action.action_type, ActionType::ValueImputed);
        assert_eq!(action.details.as_deref(), Some("median 34.5"));
    }

    #[test]
    fn test_action_type_serialization() {
        let json = serde_json::to_string(&ActionType::DuplicatesRemoved).unwrap();
        assert_eq!(json, "\"duplicates_removed\"");
        assert_eq!(
            ActionType::CategoriesStandardized.display_name(),
            "Categories Standardized"
        );
    }

    #[test]
    fn test_validation_report_helpers() {
        let report = ValidationReport {
            original_shape: (200, 12),
            final_shape: (150, 19),
            records_removed: 50,
            missing_values: 0,
            duplicate_order_ids: Some(0),
            first_order_date: Some("2023-01-01".to_string()),
            last_order_date: Some("2023-12-31".to_string()),
        };

        assert!(!report.has_duplicate_order_ids());
        assert!((report.records_removed_percentage() - 25.0).abs() < 1e-9);

        let json = serde_json::to_string(&report).unwrap();
        let back: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
