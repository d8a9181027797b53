//! Statistical imputation methods.
//!
//! Provides median imputation for numeric columns and constant imputation for
//! categorical columns.

use crate::utils::{column_as_f64, column_as_strings};
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill missing values of a numeric column with the column median.
    ///
    /// The median is taken over the rows present when this is called. Returns
    /// the number of filled cells. A column with no values at all is left
    /// untouched.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let Ok(column) = df.column(col_name) else {
            return Ok(0);
        };
        let missing = column.null_count();
        if missing == 0 {
            return Ok(0);
        }

        let median = column
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .median();
        let Some(median_val) = median else {
            processing_steps.push(format!(
                "Column '{}' has no values to compute a median from",
                col_name
            ));
            return Ok(0);
        };

        let filled: Vec<Option<f64>> = column_as_f64(df, col_name)?
            .into_iter()
            .map(|v| Some(v.unwrap_or(median_val)))
            .collect();
        df.replace(col_name, Series::new(col_name.into(), filled))?;

        debug!("Filled {} missing '{}' values with median {}", missing, col_name, median_val);
        processing_steps.push(format!(
            "Filled {} missing values in '{}' with median: {:.2}",
            missing, col_name, median_val
        ));

        Ok(missing)
    }

    /// Fill missing values of a column with a constant label.
    ///
    /// Returns the number of filled cells.
    pub fn apply_constant_imputation(
        df: &mut DataFrame,
        col_name: &str,
        fill_value: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let Ok(column) = df.column(col_name) else {
            return Ok(0);
        };
        let missing = column.null_count();
        if missing == 0 {
            return Ok(0);
        }

        let filled: Vec<Option<String>> = column_as_strings(df, col_name)?
            .into_iter()
            .map(|v| Some(v.unwrap_or_else(|| fill_value.to_string())))
            .collect();
        df.replace(col_name, Series::new(col_name.into(), filled))?;

        debug!("Filled {} missing '{}' values with '{}'", missing, col_name, fill_value);
        processing_steps.push(format!(
            "Filled {} missing values in '{}' with constant value: '{}'",
            missing, col_name, fill_value
        ));

        Ok(missing)
    }
}
