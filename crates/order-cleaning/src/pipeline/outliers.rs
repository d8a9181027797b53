//! Outlier handling module.
//!
//! Removes orders with non-positive amounts and orders whose `total_amount`
//! lies too far from the mean.

use crate::columns::{POSITIVE_COLUMNS, TOTAL_AMOUNT};
use crate::profiler::statistics::{mean, sample_std};
use crate::utils::{RowMask, column_as_f64};
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Handles outlier detection and removal.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Drop rows where `quantity`, `unit_price` or `total_amount` is not
    /// strictly positive, checking each present column in that order.
    ///
    /// Missing and non-finite values fail the check. Returns the number of
    /// rows removed.
    pub fn remove_non_positive(
        df: &mut DataFrame,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let mut removed = 0;

        for col_name in POSITIVE_COLUMNS {
            if df.column(col_name).is_err() {
                continue;
            }

            let values = column_as_f64(df, col_name)?;
            let mut mask = RowMask::keep_all(df.height());
            mask.retain(
                values
                    .iter()
                    .map(|v| v.is_some_and(|x| x.is_finite() && x > 0.0)),
            );

            let dropped = mask.dropped();
            *df = mask.apply(df)?;
            removed += dropped;

            if dropped > 0 {
                debug!("Removed {} rows with non-positive '{}'", dropped, col_name);
                processing_steps.push(format!(
                    "Removed {} rows with non-positive '{}'",
                    dropped, col_name
                ));
            }
        }

        Ok(removed)
    }

    /// Drop rows whose `total_amount` deviates from the mean by more than
    /// `threshold` sample standard deviations.
    ///
    /// The mean and deviation are computed once over the rows present on
    /// entry, so a second pass over the result can find new outliers. With
    /// fewer than two finite amounts the deviation is undefined and no row is
    /// removed. Non-finite amounts are left out of the statistics and removed.
    pub fn remove_amount_outliers(
        df: &mut DataFrame,
        threshold: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        if df.column(TOTAL_AMOUNT).is_err() {
            return Ok(0);
        }

        let values = column_as_f64(df, TOTAL_AMOUNT)?;
        let present: Vec<f64> = values
            .iter()
            .flatten()
            .copied()
            .filter(|x| x.is_finite())
            .collect();

        let (Some(mean_amount), Some(std_amount)) = (mean(&present), sample_std(&present)) else {
            processing_steps.push(format!(
                "Skipped outlier filter on '{}': fewer than two values",
                TOTAL_AMOUNT
            ));
            return Ok(0);
        };

        let bound = threshold * std_amount;
        let mut mask = RowMask::keep_all(df.height());
        mask.retain(
            values
                .iter()
                .map(|v| v.is_some_and(|x| (x - mean_amount).abs() <= bound)),
        );

        let removed = mask.dropped();
        *df = mask.apply(df)?;

        if removed > 0 {
            info!(
                "Removed {} '{}' outliers beyond {:.2} of the mean {:.2}",
                removed, TOTAL_AMOUNT, bound, mean_amount
            );
        }
        processing_steps.push(format!(
            "Removed {} rows with '{}' outside {} standard deviations (mean {:.2}, std {:.2})",
            removed, TOTAL_AMOUNT, threshold, mean_amount, std_amount
        ));

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_remove_non_positive() {
        let mut df = df! {
            "quantity" => [Some(1i64), Some(0), Some(2), None, Some(3)],
            "unit_price" => [Some(5.0), Some(5.0), Some(-1.0), Some(5.0), Some(5.0)],
            "total_amount" => [Some(5.0), Some(0.0), Some(10.0), Some(5.0), Some(-10.0)],
        }
        .unwrap();
        let mut steps = Vec::new();

        let removed = OutlierHandler::remove_non_positive(&mut df, &mut steps).unwrap();

        assert_eq!(removed, 4);
        assert_eq!(df.height(), 1);
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn test_infinite_amount_is_not_positive() {
        let mut df = df! {
            "order_id" => [1, 2, 3, 4],
            "total_amount" => [10.0, 12.0, 11.0, f64::INFINITY],
        }
        .unwrap();
        let mut steps = Vec::new();

        let removed = OutlierHandler::remove_non_positive(&mut df, &mut steps).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(
            column_as_f64(&df, "total_amount").unwrap(),
            vec![Some(10.0), Some(12.0), Some(11.0)]
        );
    }

    #[test]
    fn test_infinite_amount_does_not_poison_bound() {
        let mut df = df! {
            "total_amount" => [10.0, 12.0, 11.0, f64::INFINITY, f64::NAN],
        }
        .unwrap();
        let mut steps = Vec::new();

        let removed = OutlierHandler::remove_amount_outliers(&mut df, 3.0, &mut steps).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(
            column_as_f64(&df, "total_amount").unwrap(),
            vec![Some(10.0), Some(12.0), Some(11.0)]
        );
    }

    #[test]
    fn test_bound_is_computed_once() {
        // 1000 pulls the first bound wide enough to keep 20; only the next
        // pass, without 1000, drops it.
        let mut amounts = vec![10.0; 20];
        amounts.extend([20.0, 1000.0]);
        let mut df = df! { "total_amount" => amounts }.unwrap();
        let mut steps = Vec::new();

        let first = OutlierHandler::remove_amount_outliers(&mut df, 3.0, &mut steps).unwrap();
        let second = OutlierHandler::remove_amount_outliers(&mut df, 3.0, &mut steps).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(df.height(), 20);
    }

    #[test]
    fn test_remove_amount_outliers() {
        let mut amounts = vec![100.0; 20];
        amounts.push(10_000.0);
        let mut df = df! { "total_amount" => amounts }.unwrap();
        let mut steps = Vec::new();

        let removed = OutlierHandler::remove_amount_outliers(&mut df, 3.0, &mut steps).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(df.height(), 20);
    }

    #[test]
    fn test_identical_amounts_are_kept() {
        let mut df = df! { "total_amount" => [50.0, 50.0, 50.0] }.unwrap();
        let mut steps = Vec::new();

        let removed = OutlierHandler::remove_amount_outliers(&mut df, 3.0, &mut steps).unwrap();

        assert_eq!(removed, 0);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_single_row_is_kept() {
        let mut df = df! { "total_amount" => [100.0] }.unwrap();
        let mut steps = Vec::new();

        let removed = OutlierHandler::remove_amount_outliers(&mut df, 3.0, &mut steps).unwrap();

        assert_eq!(removed, 0);
        assert!(steps[0].contains("fewer than two"));
    }
}
