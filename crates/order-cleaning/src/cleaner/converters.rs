//! Type conversion functions for data cleaning.

use crate::error::CleaningError;
use crate::utils::{is_missing_marker, parse_numeric_string};
use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Days between 0001-01-01 (day 1 of the common era) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Date-only layouts accepted for `order_date`, tried in order.
///
/// Month-first is tried before day-first, so an ambiguous `03/04/2023` reads
/// as March 4th.
const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Date-time layouts; the time of day is discarded.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Outcome of a per-cell conversion.
///
/// Cells that fail to convert become `None` and are counted so the caller can
/// report them.
#[derive(Debug, Clone)]
pub(crate) struct Conversion<T> {
    pub values: Vec<Option<T>>,
    pub failures: usize,
    pub first_failure: Option<String>,
}

impl<T> Conversion<T> {
    fn with_capacity(len: usize) -> Self {
        Self {
            values: Vec::with_capacity(len),
            failures: 0,
            first_failure: None,
        }
    }

    fn push_failure(&mut self, raw: &str) {
        self.failures += 1;
        if self.first_failure.is_none() {
            self.first_failure = Some(raw.to_string());
        }
        self.values.push(None);
    }

    /// The failures of this conversion as a row-scoped error, if any.
    pub fn parse_failure(&self, column: &str, target_type: &str) -> Option<CleaningError> {
        let value = self.first_failure.clone()?;
        Some(CleaningError::ParseFailure {
            column: column.to_string(),
            value,
            target_type: target_type.to_string(),
            count: self.failures,
        })
    }
}

/// Convert a column to `Float64` if it was read as text.
///
/// Columns of any other type are cast, with uncastable cells becoming null. Missing
/// markers such as `"N/A"` become null without counting as failures.
pub(crate) fn coerce_to_numeric(series: &Series) -> Result<Conversion<f64>> {
    if series.dtype() != &DataType::String {
        let floats = series.cast(&DataType::Float64)?;
        return Ok(Conversion {
            values: floats.f64()?.into_iter().collect(),
            failures: 0,
            first_failure: None,
        });
    }

    let str_series = series.str()?;
    let mut conversion = Conversion::with_capacity(str_series.len());

    for opt_val in str_series.into_iter() {
        match opt_val {
            Some(val) if is_missing_marker(val) => conversion.values.push(None),
            Some(val) => match parse_numeric_string(val) {
                Some(number) => conversion.values.push(Some(number)),
                None => conversion.push_failure(val),
            },
            None => conversion.values.push(None),
        }
    }

    Ok(conversion)
}

/// Parse a single date value, accepting the common date and date-time layouts.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Read a column as calendar dates.
///
/// Text is parsed with [`parse_date`]; `Date` and `Datetime` columns are read
/// directly. Anything else is rendered as text first.
pub(crate) fn column_to_dates(series: &Series) -> Result<Conversion<NaiveDate>> {
    match series.dtype() {
        DataType::Date | DataType::Datetime(_, _) => {
            let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
            let values = days
                .i32()?
                .into_iter()
                .map(|d| d.and_then(days_to_date))
                .collect();
            Ok(Conversion {
                values,
                failures: 0,
                first_failure: None,
            })
        }
        _ => {
            let text = series.cast(&DataType::String)?;
            let str_series = text.str()?;
            let mut conversion = Conversion::with_capacity(str_series.len());

            for opt_val in str_series.into_iter() {
                match opt_val {
                    Some(val) => match parse_date(val) {
                        Some(date) => conversion.values.push(Some(date)),
                        None => conversion.push_failure(val),
                    },
                    None => conversion.values.push(None),
                }
            }

            Ok(conversion)
        }
    }
}

/// Build a `Date` series from calendar dates.
pub(crate) fn dates_to_series(name: &str, dates: &[Option<NaiveDate>]) -> Result<Series> {
    let days: Vec<Option<i32>> = dates.iter().map(|d| d.map(date_to_days)).collect();
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    Ok(series)
}

fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_text_to_numeric() {
        let series = Series::new(
            "total_amount".into(),
            [Some("$1,200.50"), Some("abc"), Some("N/A"), None, Some("-10")],
        );
        let conversion = coerce_to_numeric(&series).unwrap();

        assert_eq!(
            conversion.values,
            vec![Some(1200.5), None, None, None, Some(-10.0)]
        );
        assert_eq!(conversion.failures, 1);
        assert_eq!(conversion.first_failure.as_deref(), Some("abc"));

        let issue = conversion.parse_failure("total_amount", "number").unwrap();
        assert!(issue.is_row_scoped());
        assert!(issue.to_string().contains("'abc'"));
    }

    #[test]
    fn test_coerce_numeric_passthrough() {
        let series = Series::new("quantity".into(), [Some(2i64), None, Some(5)]);
        let conversion = coerce_to_numeric(&series).unwrap();
        assert_eq!(conversion.values, vec![Some(2.0), None, Some(5.0)]);
        assert_eq!(conversion.failures, 0);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15);
        assert_eq!(parse_date("2023-01-15"), expected);
        assert_eq!(parse_date("2023/01/15"), expected);
        assert_eq!(parse_date("01/15/2023"), expected);
        assert_eq!(parse_date("15/01/2023"), expected);
        assert_eq!(parse_date("2023-01-15 13:45:00"), expected);
        assert_eq!(parse_date("2023-01-15T13:45:00Z"), expected);
        assert_eq!(parse_date("January 15, 2023"), expected);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2023-02-30"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_dates_roundtrip_through_series() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2023, 1, 15),
            None,
            NaiveDate::from_ymd_opt(1969, 12, 31),
        ];
        let series = dates_to_series("order_date", &dates).unwrap();
        assert_eq!(series.dtype(), &DataType::Date);

        let conversion = column_to_dates(&series).unwrap();
        assert_eq!(conversion.values, dates);
    }

    #[test]
    fn test_column_to_dates_counts_failures() {
        let series = Series::new(
            "order_date".into(),
            [Some("2023-03-01"), Some("soon"), None],
        );
        let conversion = column_to_dates(&series).unwrap();
        assert_eq!(conversion.failures, 1);
        assert_eq!(conversion.values[2], None);
    }
}
