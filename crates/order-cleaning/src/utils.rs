//! Shared utilities for the cleaning pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check whether the table has a column with the given name.
#[inline]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Common missing value markers in data.
pub const MISSING_MARKERS: [&str; 7] = ["n/a", "na", "nan", "null", "missing", "none", "#n/a"];

/// Clean a string for numeric parsing by removing formatting characters.
///
/// ```rust,ignore
/// assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Check if a string is a placeholder for a missing value.
pub fn is_missing_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.is_empty() || MISSING_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a numeric value (f64).
///
/// Handles currency symbols, percentages, and thousands separators.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a float without a trailing `.0` when it holds an integral value.
pub fn format_plain_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Read a column as floats. Values that cannot be cast come back as `None`.
pub fn column_as_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

/// Read a column as owned strings.
///
/// Integral floats render without a fractional part so identifiers and
/// phone numbers that were inferred as floats keep their digits.
pub fn column_as_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let series = df.column(name)?.as_materialized_series();

    if is_float_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        let values = floats
            .f64()?
            .into_iter()
            .map(|v| v.map(format_plain_number))
            .collect();
        return Ok(values);
    }

    let strings = series.cast(&DataType::String)?;
    let values = strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Total number of missing cells across every column.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Row Filtering Utilities
// =============================================================================

/// A keep/drop decision for every row of a table.
///
/// Row-filtering stages build one mask and apply it once, so dropped rows are
/// never reintroduced.
#[derive(Debug, Clone)]
pub struct RowMask {
    keep: Vec<bool>,
}

impl RowMask {
    /// A mask that keeps all `len` rows.
    pub fn keep_all(len: usize) -> Self {
        Self {
            keep: vec![true; len],
        }
    }

    /// Drop every row for which `predicate` yields `false`.
    pub fn retain<I>(&mut self, predicate: I)
    where
        I: IntoIterator<Item = bool>,
    {
        for (keep, passes) in self.keep.iter_mut().zip(predicate) {
            *keep = *keep && passes;
        }
    }

    /// Number of rows the mask drops.
    pub fn dropped(&self) -> usize {
        self.keep.iter().filter(|keep| !**keep).count()
    }

    /// Number of rows the mask keeps.
    pub fn kept(&self) -> usize {
        self.keep.len() - self.dropped()
    }

    /// Filter the table. Columns are shared, so a mask that drops nothing
    /// costs a cheap clone.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        if self.dropped() == 0 {
            return Ok(df.clone());
        }
        let mask = BooleanChunked::from_slice("mask".into(), &self.keep);
        df.filter(&mask)
    }
}

// =============================================================================
// Formatting Utilities
// =============================================================================

/// Group the integer digits of `value` with commas, e.g. `1234567` to `1,234,567`.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format an amount as dollars with thousands separators and two decimals.
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    format!("{}${}.{:02}", sign, format_thousands(cents / 100), cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
        assert_eq!(clean_numeric_string("  42%  "), "42");
        assert_eq!(clean_numeric_string("€100"), "100");
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("$1,234.50"), Some(1234.5));
        assert_eq!(parse_numeric_string("-10"), Some(-10.0));
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("inf"), None);
    }

    #[test]
    fn test_is_missing_marker() {
        assert!(is_missing_marker("N/A"));
        assert!(is_missing_marker("  "));
        assert!(is_missing_marker("NaN"));
        assert!(!is_missing_marker("42"));
    }

    #[test]
    fn test_format_plain_number() {
        assert_eq!(format_plain_number(5551234567.0), "5551234567");
        assert_eq!(format_plain_number(2.5), "2.5");
    }

    #[test]
    fn test_column_as_strings_integral_floats() {
        let df = df! {
            "phone" => [Some(5551234567.0), None],
        }
        .unwrap();
        let values = column_as_strings(&df, "phone").unwrap();
        assert_eq!(values, vec![Some("5551234567".to_string()), None]);
    }

    #[test]
    fn test_row_mask() {
        let df = df! {
            "a" => [1, 2, 3, 4],
        }
        .unwrap();

        let mut mask = RowMask::keep_all(df.height());
        mask.retain([true, false, true, true]);
        mask.retain([true, true, false, true]);
        assert_eq!(mask.dropped(), 2);
        assert_eq!(mask.kept(), 2);

        let filtered = mask.apply(&df).unwrap();
        let values: Vec<Option<i32>> = filtered
            .column("a")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(1), Some(4)]);
    }

    #[test]
    fn test_total_null_count() {
        let df = df! {
            "a" => [Some(1), None, Some(3)],
            "b" => [None::<&str>, None, Some("x")],
        }
        .unwrap();
        assert_eq!(total_null_count(&df), 3);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(0.5), "$0.50");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(12), "12");
    }
}
