//! Categorical label standardization.

use super::sanitizers::{standardize_gender, title_case};
use crate::columns::{CUSTOMER_GENDER, TITLE_CASE_COLUMNS};
use crate::utils::column_as_strings;
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Standardizes free-text categorical columns.
pub struct CategoricalStandardizer;

impl CategoricalStandardizer {
    /// Title-case every present free-text label column and map gender values.
    pub fn standardize(
        &self,
        df: &mut DataFrame,
        unknown_label: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        for col_name in TITLE_CASE_COLUMNS {
            self.title_case_column(df, col_name, processing_steps)?;
        }
        self.standardize_gender_column(df, unknown_label, processing_steps)?;
        Ok(())
    }

    /// Title-case and trim a label column. Missing values stay missing.
    pub fn title_case_column(
        &self,
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        if df.column(col_name).is_err() {
            return Ok(0);
        }

        let values = column_as_strings(df, col_name)?;
        let mut changed = 0;
        let standardized: Vec<Option<String>> = values
            .into_iter()
            .map(|value| {
                value.map(|raw| {
                    let label = title_case(&raw);
                    if label != raw {
                        changed += 1;
                    }
                    label
                })
            })
            .collect();

        df.replace(col_name, Series::new(col_name.into(), standardized))?;

        debug!("Title-cased {} values in '{}'", changed, col_name);
        processing_steps.push(format!(
            "Standardized '{}' to title case ({} values changed)",
            col_name, changed
        ));

        Ok(changed)
    }

    /// Map `customer_gender` onto `Male`, `Female`, or the unknown label.
    ///
    /// Returns the number of values that fell back to the unknown label.
    pub fn standardize_gender_column(
        &self,
        df: &mut DataFrame,
        unknown_label: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        if df.column(CUSTOMER_GENDER).is_err() {
            return Ok(0);
        }

        let values = column_as_strings(df, CUSTOMER_GENDER)?;
        let mut unmapped = 0;
        let standardized: Vec<Option<String>> = values
            .iter()
            .map(|value| {
                let label = match value.as_deref().and_then(standardize_gender) {
                    Some(label) => label.to_string(),
                    None => {
                        unmapped += 1;
                        unknown_label.to_string()
                    }
                };
                Some(label)
            })
            .collect();

        df.replace(CUSTOMER_GENDER, Series::new(CUSTOMER_GENDER.into(), standardized))?;

        processing_steps.push(format!(
            "Standardized '{}' ({} values set to '{}')",
            CUSTOMER_GENDER, unmapped, unknown_label
        ));

        Ok(unmapped)
    }
}
