//! Configuration types for the order cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the raw input dataset.
pub const DEFAULT_INPUT_PATH: &str = "raw_ecommerce_data.csv";

/// Default location of the cleaned output dataset.
pub const DEFAULT_OUTPUT_PATH: &str = "cleaned_ecommerce_data.csv";

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use order_cleaning::config::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .input_path("orders_2023.csv")
///     .outlier_std_threshold(2.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Source file for the raw order records.
    /// Default: "raw_ecommerce_data.csv"
    pub input_path: PathBuf,

    /// Destination file for the cleaned records.
    /// Default: "cleaned_ecommerce_data.csv"
    pub output_path: PathBuf,

    /// Number of standard deviations from the mean `total_amount` beyond
    /// which an order is treated as an outlier and dropped.
    /// Default: 3.0
    pub outlier_std_threshold: f64,

    /// Whether rows with a missing `customer_email` survive the email filter.
    /// Rows with a malformed email are always dropped.
    /// Default: false
    pub keep_rows_without_email: bool,

    /// Label used for missing product categories and unmapped genders.
    /// Default: "Unknown"
    pub unknown_label: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            outlier_std_threshold: 3.0,
            keep_rows_without_email: false,
            unknown_label: "Unknown".to_string(),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.outlier_std_threshold.is_finite() || self.outlier_std_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidOutlierThreshold(
                self.outlier_std_threshold,
            ));
        }

        if self.unknown_label.trim().is_empty() {
            return Err(ConfigValidationError::EmptyUnknownLabel);
        }

        if self.input_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("input_path".to_string()));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("output_path".to_string()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid outlier threshold: {0} (must be a positive, finite number)")]
    InvalidOutlierThreshold(f64),

    #[error("The label for unknown values must not be empty")]
    EmptyUnknownLabel,

    #[error("Path '{0}' must not be empty")]
    EmptyPath(String),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    outlier_std_threshold: Option<f64>,
    keep_rows_without_email: Option<bool>,
    unknown_label: Option<String>,
}

impl CleaningConfigBuilder {
    /// Set the source file for the raw dataset.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the destination file for the cleaned dataset.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set the outlier bound, in standard deviations from the mean.
    pub fn outlier_std_threshold(mut self, threshold: f64) -> Self {
        self.outlier_std_threshold = Some(threshold);
        self
    }

    /// Keep rows whose email is missing instead of dropping them.
    pub fn keep_rows_without_email(mut self, keep: bool) -> Self {
        self.keep_rows_without_email = Some(keep);
        self
    }

    /// Set the label used for missing categories and unmapped genders.
    pub fn unknown_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_label = Some(label.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let defaults = CleaningConfig::default();
        let config = CleaningConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_path: self.output_path.unwrap_or(defaults.output_path),
            outlier_std_threshold: self
                .outlier_std_threshold
                .unwrap_or(defaults.outlier_std_threshold),
            keep_rows_without_email: self
                .keep_rows_without_email
                .unwrap_or(defaults.keep_rows_without_email),
            unknown_label: self.unknown_label.unwrap_or(defaults.unknown_label),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.input_path, PathBuf::from("raw_ecommerce_data.csv"));
        assert_eq!(config.output_path, PathBuf::from("cleaned_ecommerce_data.csv"));
        assert_eq!(config.outlier_std_threshold, 3.0);
        assert!(!config.keep_rows_without_email);
        assert_eq!(config.unknown_label, "Unknown");
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .input_path("in.csv")
            .output_path("out.csv")
            .outlier_std_threshold(2.0)
            .keep_rows_without_email(true)
            .build()
            .unwrap();

        assert_eq!(config.input_path, PathBuf::from("in.csv"));
        assert_eq!(config.output_path, PathBuf::from("out.csv"));
        assert_eq!(config.outlier_std_threshold, 2.0);
        assert!(config.keep_rows_without_email);
    }

    #[test]
    fn test_validation_invalid_outlier_threshold() {
        let result = CleaningConfig::builder().outlier_std_threshold(0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidOutlierThreshold(_)
        ));

        let result = CleaningConfig::builder()
            .outlier_std_threshold(f64::NAN)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_empty_label() {
        let result = CleaningConfig::builder().unknown_label("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyUnknownLabel
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "input_path": "data/raw.csv",
            "output_path": "data/clean.csv"
        }"#;

        let config: CleaningConfig =
            serde_json::from_str(json).expect("Should deserialize partial JSON");

        assert_eq!(config.input_path, PathBuf::from("data/raw.csv"));
        assert_eq!(config.output_path, PathBuf::from("data/clean.csv"));
        assert_eq!(config.outlier_std_threshold, 3.0);
        assert!(config.validate().is_ok());
    }
}
