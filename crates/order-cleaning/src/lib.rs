//! Order Cleaning Library
//!
//! Cleans raw e-commerce order exports with Polars.
//!
//! # Overview
//!
//! A raw order table runs through seven stages, always in this order:
//!
//! - **Missing values**: numeric text is coerced, `customer_age` and
//!   `product_category` are imputed, rows missing an order id, customer id,
//!   order date or amount are dropped
//! - **Deduplication**: the first row of every `order_id` is kept
//! - **Type normalization**: dates are parsed, invalid emails dropped, phone
//!   numbers reduced to digits
//! - **Outlier handling**: non-positive amounts and `total_amount` values far
//!   from the mean are dropped
//! - **Categorical standardization**: labels are title-cased and gender mapped
//!   onto `Male`, `Female` or `Unknown`
//! - **Derived columns**: date parts, age groups and revenue per item
//! - **Validation**: a read-only report on the cleaned table
//!
//! Every stage acts only on the columns that are present.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use order_cleaning::{CleaningConfig, DataProfiler, Pipeline, load_dataset, save_dataset};
//!
//! let df = load_dataset("raw_ecommerce_data.csv")?;
//!
//! let mut result = Pipeline::builder()
//!     .config(CleaningConfig::builder().outlier_std_threshold(3.0).build()?)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! println!("{} duplicate ids left", result.validation.duplicate_order_ids.unwrap_or(0));
//! save_dataset(&mut result.data, "cleaned_ecommerce_data.csv")?;
//! ```
//!
//! For the defaults alone, [`clean`] returns just the cleaned table.

pub mod cleaner;
pub mod columns;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{CategoricalStandardizer, DataCleaner, TypeNormalizer};
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use enrichment::FeatureDeriver;
pub use error::{CleaningError, ResultExt};
pub use imputers::StatisticalImputer;
pub use io::{load_dataset, save_dataset};
pub use pipeline::{
    CleaningExecutor, CleaningStage, ClosureProgressReporter, OutlierHandler, Pipeline,
    PipelineBuilder, ProgressReporter, ProgressUpdate, clean,
};
pub use profiler::DataProfiler;
pub use quality::DataValidator;
pub use reporting::{CleaningReport, ReportRenderer};
pub use types::{
    ActionType, CleaningAction, CleaningResult, CleaningSummary, ColumnProfile, CustomerStats,
    DataProfile, RevenueStats, StageSummary, ValidationReport,
};
