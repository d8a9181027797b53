//! Data profiling module for order datasets.
//!
//! This module provides read-only profiling of a table:
//! - Per-column type, missing values and cardinality
//! - Revenue statistics over `total_amount`
//! - Customer statistics over `customer_id`

pub(crate) mod statistics;

use crate::columns::{CUSTOMER_ID, TOTAL_AMOUNT};
use crate::types::{ColumnProfile, CustomerStats, DataProfile, RevenueStats};
use crate::utils::{column_as_f64, column_as_strings, has_column};
use anyhow::Result;
use polars::prelude::*;
use statistics::{mean, median};
use std::collections::HashSet;
use tracing::debug;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Data profiler for summarizing a dataset.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile a table without modifying it.
    pub fn profile(df: &DataFrame) -> Result<DataProfile> {
        let column_profiles = df
            .get_column_names()
            .into_iter()
            .map(|col_name| Self::profile_column(df, col_name))
            .collect::<Result<Vec<_>>>()?;

        let profile = DataProfile {
            shape: (df.height(), df.width()),
            memory_usage_mb: df.estimated_size() as f64 / BYTES_PER_MB,
            column_profiles,
            revenue: Self::revenue_stats(df)?,
            customers: Self::customer_stats(df)?,
        };
        debug!("Profiled {:?} table", profile.shape);

        Ok(profile)
    }

    fn profile_column(df: &DataFrame, col_name: &str) -> Result<ColumnProfile> {
        let series = df.column(col_name)?.as_materialized_series();
        let null_count = series.null_count();
        let null_percentage = if df.height() > 0 {
            (null_count as f64 / df.height() as f64) * 100.0
        } else {
            0.0
        };

        Ok(ColumnProfile {
            name: col_name.to_string(),
            dtype: series.dtype().to_string(),
            null_count,
            null_percentage,
            unique_count: series.drop_nulls().n_unique()?,
        })
    }

    fn revenue_stats(df: &DataFrame) -> Result<Option<RevenueStats>> {
        if !has_column(df, TOTAL_AMOUNT) {
            return Ok(None);
        }

        let amounts: Vec<f64> = column_as_f64(df, TOTAL_AMOUNT)?
            .into_iter()
            .flatten()
            .collect();

        Ok(Some(RevenueStats {
            total: amounts.iter().sum(),
            mean: mean(&amounts),
            median: median(&amounts),
        }))
    }

    fn customer_stats(df: &DataFrame) -> Result<Option<CustomerStats>> {
        if !has_column(df, CUSTOMER_ID) {
            return Ok(None);
        }

        let total_customers = column_as_strings(df, CUSTOMER_ID)?
            .into_iter()
            .flatten()
            .collect::<HashSet<_>>()
            .len();
        let total_orders = df.height();
        let avg_orders_per_customer =
            (total_customers > 0).then(|| total_orders as f64 / total_customers as f64);

        Ok(Some(CustomerStats {
            total_customers,
            total_orders,
            avg_orders_per_customer,
        }))
    }
}
