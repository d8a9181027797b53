use crate::error::{CleaningError, Result};
use crate::types::{CleaningResult, CleaningSummary, DataProfile, ValidationReport};
use crate::utils::{format_currency, format_thousands};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const BANNER_WIDTH: usize = 50;

// ============================================================================
// JSON Report
// ============================================================================

/// Everything known about one cleaning run, for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_file: String,
    /// Path of the cleaned CSV, if it was written
    pub output_file: Option<String>,
    pub summary: CleaningSummary,
    pub validation: ValidationReport,
    /// Profile of the cleaned table
    pub profile: DataProfile,
}

/// Renders profiles and run results as console text or JSON.
pub struct ReportRenderer;

impl ReportRenderer {
    /// Assemble the JSON report of a run.
    pub fn build_report(
        input_file: &Path,
        output_file: Option<&Path>,
        result: &CleaningResult,
        profile: &DataProfile,
    ) -> CleaningReport {
        CleaningReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.display().to_string(),
            output_file: output_file.map(|p| p.display().to_string()),
            summary: result.summary.clone(),
            validation: result.validation.clone(),
            profile: profile.clone(),
        }
    }

    /// Write a report as pretty-printed JSON, creating parent directories.
    pub fn write_report_to_file(report: &CleaningReport, path: &Path) -> Result<PathBuf> {
        let write = || -> Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut file = File::create(path)?;
            file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;
            Ok(())
        };
        write().map_err(|e| CleaningError::WriteFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Report saved: {}", path.display());
        Ok(path.to_path_buf())
    }

    // ========================================================================
    // Console Text
    // ========================================================================

    /// The data profiling report.
    pub fn render_profile(profile: &DataProfile) -> String {
        let mut lines = vec![
            String::new(),
            Self::banner(),
            "DATA PROFILING REPORT".to_string(),
            Self::banner(),
            String::new(),
            format!("Dataset Shape: ({}, {})", profile.shape.0, profile.shape.1),
            format!("Memory Usage: {:.2} MB", profile.memory_usage_mb),
            String::new(),
            "Column Information:".to_string(),
        ];

        for col in &profile.column_profiles {
            lines.push(format!(
                "- {}: {} | Nulls: {} ({:.1}%) | Unique: {}",
                col.name, col.dtype, col.null_count, col.null_percentage, col.unique_count
            ));
        }

        if let Some(revenue) = &profile.revenue {
            lines.push(String::new());
            lines.push("Revenue Statistics:".to_string());
            lines.push(format!("- Total Revenue: {}", format_currency(revenue.total)));
            lines.push(format!(
                "- Average Order Value: {}",
                Self::optional_currency(revenue.mean)
            ));
            lines.push(format!(
                "- Median Order Value: {}",
                Self::optional_currency(revenue.median)
            ));
        }

        if let Some(customers) = &profile.customers {
            lines.push(String::new());
            lines.push("Customer Statistics:".to_string());
            lines.push(format!(
                "- Total Customers: {}",
                format_thousands(customers.total_customers as u64)
            ));
            lines.push(format!(
                "- Total Orders: {}",
                format_thousands(customers.total_orders as u64)
            ));
            lines.push(match customers.avg_orders_per_customer {
                Some(avg) => format!("- Avg Orders per Customer: {:.2}", avg),
                None => "- Avg Orders per Customer: n/a".to_string(),
            });
        }

        lines.join("\n")
    }

    /// Per-stage account of a run, numbered in execution order.
    pub fn render_summary(summary: &CleaningSummary) -> String {
        let mut lines = vec!["Data cleaning steps:".to_string()];

        for (i, stage) in summary.stages.iter().enumerate() {
            lines.push(String::new());
            lines.push(format!(
                "{}. {} ({} rows removed)",
                i + 1,
                stage.stage.display_name(),
                stage.rows_removed()
            ));
            for step in &stage.steps {
                lines.push(format!("   - {}", step));
            }
        }

        if !summary.warnings.is_empty() {
            lines.push(String::new());
            lines.push("Warnings:".to_string());
            for warning in &summary.warnings {
                lines.push(format!("- {}", warning));
            }
        }

        lines.push(String::new());
        lines.push(format!("Finished in {} ms", summary.duration_ms));
        lines.join("\n")
    }

    /// Shapes and data quality checks of the cleaned table.
    pub fn render_validation(report: &ValidationReport) -> String {
        let mut lines = vec![
            "Data cleaning completed!".to_string(),
            format!(
                "Original shape: ({}, {})",
                report.original_shape.0, report.original_shape.1
            ),
            format!(
                "Final shape: ({}, {})",
                report.final_shape.0, report.final_shape.1
            ),
            format!("Records removed: {}", report.records_removed),
            String::new(),
            "Data Quality Report:".to_string(),
            format!("- Missing values: {}", report.missing_values),
        ];

        if let Some(duplicates) = report.duplicate_order_ids {
            lines.push(format!("- Duplicate order_ids: {}", duplicates));
        }
        if let (Some(first), Some(last)) = (&report.first_order_date, &report.last_order_date) {
            lines.push(format!("- Date range: {} to {}", first, last));
        }

        lines.join("\n")
    }

    /// Closing banner printed after a successful run.
    pub fn completion_banner() -> String {
        [
            String::new(),
            Self::banner(),
            "DATA CLEANING PROCESS COMPLETED SUCCESSFULLY!".to_string(),
            Self::banner(),
        ]
        .join("\n")
    }

    fn banner() -> String {
        "=".repeat(BANNER_WIDTH)
    }

    fn optional_currency(amount: Option<f64>) -> String {
        amount.map(format_currency).unwrap_or_else(|| "n/a".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnProfile, CustomerStats, RevenueStats};
    use tempfile::tempdir;

    fn sample_profile() -> DataProfile {
        DataProfile {
            shape: (3, 2),
            memory_usage_mb: 0.5,
            column_profiles: vec![ColumnProfile {
                name: "total_amount".to_string(),
                dtype: "f64".to_string(),
                null_count: 0,
                null_percentage: 0.0,
                unique_count: 3,
            }],
            revenue: Some(RevenueStats {
                total: 1_234_567.891,
                mean: Some(411_522.63),
                median: None,
            }),
            customers: Some(CustomerStats {
                total_customers: 1_500,
                total_orders: 3,
                avg_orders_per_customer: Some(0.002),
            }),
        }
    }

    fn sample_validation() -> ValidationReport {
        ValidationReport {
            original_shape: (10, 12),
            final_shape: (7, 19),
            records_removed: 3,
            missing_values: 0,
            duplicate_order_ids: Some(0),
            first_order_date: Some("2023-01-15".to_string()),
            last_order_date: Some("2023-06-30".to_string()),
        }
    }

    #[test]
    fn test_render_profile() {
        let text = ReportRenderer::render_profile(&sample_profile());

        assert!(text.contains("DATA PROFILING REPORT"));
        assert!(text.contains(&"=".repeat(50)));
        assert!(text.contains("- total_amount: f64 | Nulls: 0 (0.0%) | Unique: 3"));
        assert!(text.contains("- Total Revenue: $1,234,567.89"));
        assert!(text.contains("- Median Order Value: n/a"));
        assert!(text.contains("- Total Customers: 1,500"));
        assert!(text.contains("- Avg Orders per Customer: 0.00"));
    }

    #[test]
    fn test_render_validation() {
        let text = ReportRenderer::render_validation(&sample_validation());

        assert!(text.contains("Original shape: (10, 12)"));
        assert!(text.contains("Records removed: 3"));
        assert!(text.contains("- Duplicate order_ids: 0"));
        assert!(text.contains("- Date range: 2023-01-15 to 2023-06-30"));
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        let report = CleaningReport {
            generated_at: "2024-01-01 00:00:00".to_string(),
            input_file: "raw.csv".to_string(),
            output_file: None,
            summary: CleaningSummary::new(),
            validation: sample_validation(),
            profile: sample_profile(),
        };

        let written = ReportRenderer::write_report_to_file(&report, &path).unwrap();

        let contents = std::fs::read_to_string(written).unwrap();
        let parsed: CleaningReport = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.validation, report.validation);
        assert_eq!(parsed.input_file, "raw.csv");
    }
}
