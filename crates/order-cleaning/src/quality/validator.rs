use crate::cleaner::column_to_dates;
use crate::columns::{ORDER_DATE, ORDER_ID};
use crate::types::ValidationReport;
use crate::utils::{column_as_strings, total_null_count};
use anyhow::Result;
use polars::prelude::*;
use std::collections::HashSet;

pub struct DataValidator;

impl DataValidator {
    /// Compute the validation report of a cleaned table against the input shape.
    pub fn validate(original_shape: (usize, usize), df: &DataFrame) -> Result<ValidationReport> {
        let final_shape = (df.height(), df.width());
        let (first_order_date, last_order_date) = Self::order_date_range(df)?.unzip();

        Ok(ValidationReport {
            original_shape,
            final_shape,
            records_removed: original_shape.0.saturating_sub(final_shape.0),
            missing_values: total_null_count(df),
            duplicate_order_ids: Self::count_duplicate_order_ids(df)?,
            first_order_date,
            last_order_date,
        })
    }

    /// Rows whose `order_id` already appeared in an earlier row.
    fn count_duplicate_order_ids(df: &DataFrame) -> Result<Option<usize>> {
        if df.column(ORDER_ID).is_err() {
            return Ok(None);
        }

        let mut seen = HashSet::new();
        let duplicates = column_as_strings(df, ORDER_ID)?
            .into_iter()
            .filter(|key| !seen.insert(key.clone()))
            .count();

        Ok(Some(duplicates))
    }

    fn order_date_range(df: &DataFrame) -> Result<Option<(String, String)>> {
        let Ok(column) = df.column(ORDER_DATE) else {
            return Ok(None);
        };

        let dates = column_to_dates(column.as_materialized_series())?.values;
        let present = dates.iter().flatten();
        let range = present
            .clone()
            .min()
            .zip(present.max())
            .map(|(first, last)| {
                (
                    first.format("%Y-%m-%d").to_string(),
                    last.format("%Y-%m-%d").to_string(),
                )
            });

        Ok(range)
    }
}
