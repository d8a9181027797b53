//! Data cleaning module for order datasets.
//!
//! This module provides functionality for:
//! - Coercing numeric columns that were read as text
//! - Dropping rows with missing critical fields
//! - Removing duplicate orders
//! - Date, email and phone normalization
//! - Categorical label standardization

mod categorical;
mod converters;
mod sanitizers;
mod type_normalizer;

pub use categorical::CategoricalStandardizer;
pub use type_normalizer::TypeNormalizer;

pub(crate) use converters::{column_to_dates, dates_to_series, parse_date};

use crate::columns::{CRITICAL_COLUMNS, NUMERIC_COLUMNS, ORDER_ID};
use crate::error::CleaningError;
use crate::utils::{RowMask, column_as_strings};
use anyhow::Result;
use converters::coerce_to_numeric;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Data cleaner for row-level cleaning operations.
pub struct DataCleaner;

impl DataCleaner {
    /// Missing-value count of every column, in column order.
    pub fn missing_counts(&self, df: &DataFrame) -> Vec<(String, usize)> {
        df.get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect()
    }

    /// Convert numeric order columns that were read as text into `Float64`.
    ///
    /// Unparseable cells become missing. Each affected column yields one
    /// [`CleaningError::ParseFailure`] in `issues`. Returns the number of
    /// converted columns.
    pub fn coerce_numeric_columns(
        &self,
        df: &mut DataFrame,
        processing_steps: &mut Vec<String>,
        issues: &mut Vec<CleaningError>,
    ) -> Result<usize> {
        let mut converted = 0;

        for col_name in NUMERIC_COLUMNS {
            let Ok(column) = df.column(col_name) else {
                continue;
            };
            let series = column.as_materialized_series();
            if series.dtype() != &DataType::String {
                continue;
            }

            let conversion = coerce_to_numeric(series)?;
            if let Some(issue) = conversion.parse_failure(col_name, "number") {
                warn!("{}", issue);
                issues.push(issue);
            }

            df.replace(col_name, Series::new(col_name.into(), conversion.values))?;
            converted += 1;

            processing_steps.push(format!("Converted '{}' from text to numeric", col_name));
            debug!("Converted '{}' from text to numeric", col_name);
        }

        Ok(converted)
    }

    /// Drop every row with a missing value in a present critical column.
    ///
    /// Returns the number of rows removed.
    pub fn drop_missing_critical(
        &self,
        df: &mut DataFrame,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let mut mask = RowMask::keep_all(df.height());
        let mut checked = Vec::new();

        for col_name in CRITICAL_COLUMNS {
            if let Ok(column) = df.column(col_name) {
                let present = column.as_materialized_series().is_not_null();
                mask.retain(present.into_iter().map(|v| v.unwrap_or(false)));
                checked.push(col_name);
            }
        }

        if checked.is_empty() {
            processing_steps.push("No critical columns present".to_string());
            return Ok(0);
        }

        let removed = mask.dropped();
        *df = mask.apply(df)?;

        if removed > 0 {
            info!("Removed {} rows with missing critical values", removed);
            processing_steps.push(format!(
                "Removed {} rows missing any of: {}",
                removed,
                checked.join(", ")
            ));
        } else {
            processing_steps.push("No rows with missing critical values found".to_string());
        }

        Ok(removed)
    }

    /// Keep only the first row of every `order_id`, in original order.
    ///
    /// Returns the number of rows removed.
    pub fn remove_duplicate_orders(
        &self,
        df: &mut DataFrame,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        if df.column(ORDER_ID).is_err() {
            processing_steps.push(format!("Column '{}' not present, skipping", ORDER_ID));
            return Ok(0);
        }

        let before = df.height();
        let keys = column_as_strings(df, ORDER_ID)?;
        let mut seen: HashSet<Option<String>> = HashSet::with_capacity(keys.len());

        let mut mask = RowMask::keep_all(before);
        mask.retain(keys.into_iter().map(|key| seen.insert(key)));

        let removed = mask.dropped();
        *df = mask.apply(df)?;

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            processing_steps.push(format!(
                "Removed {} duplicate records ({:.1}%)",
                removed, pct
            ));
            info!("Removed {} duplicate records", removed);
        } else {
            processing_steps.push("No duplicate order ids found".to_string());
            debug!("No duplicate order ids found");
        }

        Ok(removed)
    }
}
