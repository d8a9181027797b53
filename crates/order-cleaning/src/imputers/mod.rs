//! Imputation module for handling missing values.
//!
//! Provides statistical (median) and constant imputation for the optional
//! order columns that are filled rather than dropped.

mod statistical;

pub use statistical::StatisticalImputer;
