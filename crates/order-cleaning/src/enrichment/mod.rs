//! Derived column creation.
//!
//! Adds calendar parts of `order_date`, the customer age bracket and the
//! revenue per item. Derived columns overwrite any column of the same name.

use crate::cleaner::column_to_dates;
use crate::columns::{
    AGE_GROUP, CUSTOMER_AGE, ORDER_DATE, ORDER_DAY, ORDER_MONTH, ORDER_QUARTER, ORDER_WEEKDAY,
    ORDER_YEAR, QUANTITY, REVENUE_PER_ITEM, TOTAL_AMOUNT,
};
use crate::utils::{column_as_f64, has_column};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::debug;

/// Age brackets as right-closed intervals `(lower, upper]`.
const AGE_BINS: [(f64, f64, &str); 5] = [
    (0.0, 25.0, "18-25"),
    (25.0, 35.0, "26-35"),
    (35.0, 50.0, "36-50"),
    (50.0, 65.0, "51-65"),
    (65.0, 100.0, "65+"),
];

/// Label for an age, or `None` outside `(0, 100]`.
pub fn age_group(age: f64) -> Option<&'static str> {
    AGE_BINS
        .iter()
        .find(|(lower, upper, _)| age > *lower && age <= *upper)
        .map(|(_, _, label)| *label)
}

/// Calendar quarter (1-4) of a date.
pub fn quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Derives analysis columns from the cleaned order fields.
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Add every derived column whose source columns are present.
    ///
    /// Returns the names of the columns that were added.
    pub fn derive_all(
        &self,
        df: &mut DataFrame,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<&'static str>> {
        let mut added = Vec::new();

        if self.add_date_parts(df)? {
            added.extend([ORDER_YEAR, ORDER_MONTH, ORDER_DAY, ORDER_WEEKDAY, ORDER_QUARTER]);
        }
        if self.add_age_groups(df)? {
            added.push(AGE_GROUP);
        }
        if self.add_revenue_per_item(df)? {
            added.push(REVENUE_PER_ITEM);
        }

        if added.is_empty() {
            processing_steps.push("No source columns for derived columns".to_string());
        } else {
            processing_steps.push(format!("Created derived columns: {}", added.join(", ")));
        }
        debug!("Derived columns: {:?}", added);

        Ok(added)
    }

    /// Add year, month, day, weekday name and quarter of `order_date`.
    pub fn add_date_parts(&self, df: &mut DataFrame) -> Result<bool> {
        let Ok(column) = df.column(ORDER_DATE) else {
            return Ok(false);
        };
        let dates = column_to_dates(column.as_materialized_series())?.values;

        let year: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.year())).collect();
        let month: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.month() as i32)).collect();
        let day: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.day() as i32)).collect();
        let weekday: Vec<Option<String>> = dates
            .iter()
            .map(|d| d.map(|d| d.format("%A").to_string()))
            .collect();
        let quarters: Vec<Option<i32>> = dates
            .iter()
            .map(|d| d.map(|d| quarter(d) as i32))
            .collect();

        df.with_column(Series::new(ORDER_YEAR.into(), year))?;
        df.with_column(Series::new(ORDER_MONTH.into(), month))?;
        df.with_column(Series::new(ORDER_DAY.into(), day))?;
        df.with_column(Series::new(ORDER_WEEKDAY.into(), weekday))?;
        df.with_column(Series::new(ORDER_QUARTER.into(), quarters))?;

        Ok(true)
    }

    /// Bucket `customer_age` into `age_group` labels.
    pub fn add_age_groups(&self, df: &mut DataFrame) -> Result<bool> {
        if !has_column(df, CUSTOMER_AGE) {
            return Ok(false);
        }

        let groups: Vec<Option<&str>> = column_as_f64(df, CUSTOMER_AGE)?
            .into_iter()
            .map(|age| age.and_then(age_group))
            .collect();
        df.with_column(Series::new(AGE_GROUP.into(), groups))?;

        Ok(true)
    }

    /// Add `revenue_per_item = total_amount / quantity`.
    pub fn add_revenue_per_item(&self, df: &mut DataFrame) -> Result<bool> {
        if !has_column(df, TOTAL_AMOUNT) || !has_column(df, QUANTITY) {
            return Ok(false);
        }

        let totals = column_as_f64(df, TOTAL_AMOUNT)?;
        let quantities = column_as_f64(df, QUANTITY)?;
        let revenue: Vec<Option<f64>> = totals
            .into_iter()
            .zip(quantities)
            .map(|(total, qty)| match (total, qty) {
                (Some(total), Some(qty)) if qty != 0.0 => Some(total / qty),
                _ => None,
            })
            .collect();
        df.with_column(Series::new(REVENUE_PER_ITEM.into(), revenue))?;

        Ok(true)
    }
}
