//! Cleaning executor module.
//!
//! Runs one cleaning stage at a time against the working table and collects
//! what the stage did.

use crate::cleaner::{CategoricalStandardizer, DataCleaner, TypeNormalizer};
use crate::columns::{CUSTOMER_AGE, PRODUCT_CATEGORY};
use crate::config::CleaningConfig;
use crate::enrichment::FeatureDeriver;
use crate::error::CleaningError;
use crate::imputers::StatisticalImputer;
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::CleaningStage;
use crate::types::{ActionType, CleaningAction};
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// What a single stage produced besides the mutated table.
#[derive(Debug, Default)]
pub struct StageLog {
    /// Step messages, in the order they happened.
    pub steps: Vec<String>,
    pub actions: Vec<CleaningAction>,
    /// Row-scoped problems the stage absorbed.
    pub issues: Vec<CleaningError>,
    /// Missing-value counts per column at stage entry. Only filled by
    /// [`CleaningStage::MissingValues`].
    pub missing_before: Vec<(String, usize)>,
    pub columns_added: Vec<String>,
}

/// Executes cleaning stages on a DataFrame.
pub struct CleaningExecutor;

impl CleaningExecutor {
    /// Run a mutating stage in place.
    ///
    /// `Validation` and the bracketing stages never touch the table and
    /// return an empty log.
    pub fn execute_stage(
        &self,
        stage: CleaningStage,
        df: &mut DataFrame,
        config: &CleaningConfig,
    ) -> Result<StageLog> {
        let mut log = StageLog::default();
        let rows_before = df.height();

        match stage {
            CleaningStage::MissingValues => self.handle_missing_values(df, config, &mut log)?,
            CleaningStage::Deduplication => self.remove_duplicates(df, &mut log)?,
            CleaningStage::TypeNormalization => self.normalize_types(df, config, &mut log)?,
            CleaningStage::OutlierHandling => self.handle_outliers(df, config, &mut log)?,
            CleaningStage::CategoricalStandardization => {
                self.standardize_categories(df, config, &mut log)?
            }
            CleaningStage::DerivedColumns => self.derive_columns(df, &mut log)?,
            CleaningStage::Initializing
            | CleaningStage::Validation
            | CleaningStage::Complete
            | CleaningStage::Failed => {}
        }

        debug!(
            "{}: {} -> {} rows",
            stage.display_name(),
            rows_before,
            df.height()
        );

        Ok(log)
    }

    /// Coerce numeric text, impute optional fields, drop rows missing criticals.
    fn handle_missing_values(
        &self,
        df: &mut DataFrame,
        config: &CleaningConfig,
        log: &mut StageLog,
    ) -> Result<()> {
        let cleaner = DataCleaner;

        log.missing_before = cleaner.missing_counts(df);
        let with_missing: Vec<String> = log
            .missing_before
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, count)| format!("{}={}", name, count))
            .collect();
        if with_missing.is_empty() {
            log.steps.push("No missing values at stage entry".to_string());
        } else {
            log.steps
                .push(format!("Missing values at stage entry: {}", with_missing.join(", ")));
        }

        let converted = cleaner.coerce_numeric_columns(df, &mut log.steps, &mut log.issues)?;
        if converted > 0 {
            log.actions.push(CleaningAction::new(
                ActionType::TypeCorrected,
                "dataset",
                format!("Converted {} text columns to numeric", converted),
            ));
        }

        let imputed = StatisticalImputer::apply_numeric_median(df, CUSTOMER_AGE, &mut log.steps)?;
        if imputed > 0 {
            log.actions.push(
                CleaningAction::new(
                    ActionType::ValueImputed,
                    CUSTOMER_AGE,
                    format!("Imputed {} missing values", imputed),
                )
                .with_details("median"),
            );
        }

        let filled = StatisticalImputer::apply_constant_imputation(
            df,
            PRODUCT_CATEGORY,
            &config.unknown_label,
            &mut log.steps,
        )?;
        if filled > 0 {
            log.actions.push(
                CleaningAction::new(
                    ActionType::ValueImputed,
                    PRODUCT_CATEGORY,
                    format!("Imputed {} missing values", filled),
                )
                .with_details(format!("constant '{}'", config.unknown_label)),
            );
        }

        let removed = cleaner.drop_missing_critical(df, &mut log.steps)?;
        if removed > 0 {
            log.actions.push(CleaningAction::new(
                ActionType::RowsRemoved,
                "dataset",
                format!("Removed {} rows missing critical values", removed),
            ));
        }

        Ok(())
    }

    fn remove_duplicates(&self, df: &mut DataFrame, log: &mut StageLog) -> Result<()> {
        let removed = DataCleaner.remove_duplicate_orders(df, &mut log.steps)?;
        if removed > 0 {
            log.actions.push(CleaningAction::new(
                ActionType::DuplicatesRemoved,
                "order_id",
                format!("Removed {} duplicate orders", removed),
            ));
        }
        Ok(())
    }

    fn normalize_types(
        &self,
        df: &mut DataFrame,
        config: &CleaningConfig,
        log: &mut StageLog,
    ) -> Result<()> {
        let removed = TypeNormalizer.normalize(
            df,
            config.keep_rows_without_email,
            &mut log.steps,
            &mut log.issues,
        )?;
        if removed > 0 {
            log.actions.push(CleaningAction::new(
                ActionType::RowsRemoved,
                "dataset",
                format!("Removed {} rows with invalid dates or emails", removed),
            ));
        }
        Ok(())
    }

    fn handle_outliers(
        &self,
        df: &mut DataFrame,
        config: &CleaningConfig,
        log: &mut StageLog,
    ) -> Result<()> {
        let non_positive = OutlierHandler::remove_non_positive(df, &mut log.steps)?;
        let outliers = OutlierHandler::remove_amount_outliers(
            df,
            config.outlier_std_threshold,
            &mut log.steps,
        )?;

        if non_positive > 0 {
            log.actions.push(CleaningAction::new(
                ActionType::OutlierHandled,
                "dataset",
                format!("Removed {} rows with non-positive amounts", non_positive),
            ));
        }
        if outliers > 0 {
            log.actions.push(
                CleaningAction::new(
                    ActionType::OutlierHandled,
                    "total_amount",
                    format!("Removed {} outliers", outliers),
                )
                .with_details(format!("{} standard deviations", config.outlier_std_threshold)),
            );
        }

        info!(
            "Outlier handling removed {} rows",
            non_positive + outliers
        );
        Ok(())
    }

    fn standardize_categories(
        &self,
        df: &mut DataFrame,
        config: &CleaningConfig,
        log: &mut StageLog,
    ) -> Result<()> {
        CategoricalStandardizer.standardize(df, &config.unknown_label, &mut log.steps)?;
        if !log.steps.is_empty() {
            log.actions.push(
                CleaningAction::new(
                    ActionType::CategoriesStandardized,
                    "dataset",
                    format!("Standardized {} label columns", log.steps.len()),
                )
                .with_details(log.steps.join("; ")),
            );
        }
        Ok(())
    }

    fn derive_columns(&self, df: &mut DataFrame, log: &mut StageLog) -> Result<()> {
        let added = FeatureDeriver.derive_all(df, &mut log.steps)?;
        if !added.is_empty() {
            log.actions.push(
                CleaningAction::new(
                    ActionType::ColumnsDerived,
                    "dataset",
                    format!("Created {} derived columns", added.len()),
                )
                .with_details(added.join(", ")),
            );
        }
        log.columns_added = added.into_iter().map(String::from).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{column_as_f64, column_as_strings};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_values_stage() {
        let mut df = df! {
            "order_id" => [Some(1), Some(2), Some(3), Some(4)],
            "customer_id" => [Some("A"), Some("B"), None, Some("D")],
            "total_amount" => [Some("$100"), Some("1,250.50"), Some("30"), Some("bad")],
            "customer_age" => [Some(20.0), None, Some(40.0), Some(60.0)],
            "product_category" => [Some("books"), None, Some("toys"), Some("games")],
        }
        .unwrap();

        let log = CleaningExecutor
            .execute_stage(
                CleaningStage::MissingValues,
                &mut df,
                &CleaningConfig::default(),
            )
            .unwrap();

        // Row 3 lacks a customer id, row 4 has an unparseable amount.
        assert_eq!(df.height(), 2);
        assert_eq!(
            column_as_f64(&df, "total_amount").unwrap(),
            vec![Some(100.0), Some(1250.5)]
        );
        assert_eq!(
            column_as_f64(&df, "customer_age").unwrap(),
            vec![Some(20.0), Some(40.0)]
        );
        assert_eq!(
            column_as_strings(&df, "product_category").unwrap(),
            vec![Some("books".to_string()), Some("Unknown".to_string())]
        );
        assert_eq!(log.issues.len(), 1);
        assert!(log.missing_before.contains(&("customer_age".to_string(), 1)));
        assert!(
            log.actions
                .iter()
                .any(|a| a.action_type == ActionType::ValueImputed && a.target == "customer_age")
        );
    }

    #[test]
    fn test_derived_columns_stage_records_added_columns() {
        let mut df = df! {
            "total_amount" => [100.0],
            "quantity" => [4i64],
        }
        .unwrap();

        let log = CleaningExecutor
            .execute_stage(
                CleaningStage::DerivedColumns,
                &mut df,
                &CleaningConfig::default(),
            )
            .unwrap();

        assert_eq!(log.columns_added, vec!["revenue_per_item".to_string()]);
        assert_eq!(
            column_as_f64(&df, "revenue_per_item").unwrap(),
            vec![Some(25.0)]
        );
    }

    #[test]
    fn test_validation_stage_does_not_mutate() {
        let mut df = df! { "order_id" => [1, 1] }.unwrap();

        let log = CleaningExecutor
            .execute_stage(CleaningStage::Validation, &mut df, &CleaningConfig::default())
            .unwrap();

        assert_eq!(df.height(), 2);
        assert!(log.steps.is_empty());
    }
}
