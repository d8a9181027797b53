//! Type normalization for order dates, emails and phone numbers.

use super::converters::{column_to_dates, dates_to_series};
use super::sanitizers::{digits_only, is_valid_email};
use crate::columns::{CUSTOMER_EMAIL, CUSTOMER_PHONE, ORDER_DATE};
use crate::error::CleaningError;
use crate::utils::{RowMask, column_as_strings};
use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Normalizes column types and drops rows whose values cannot be normalized.
pub struct TypeNormalizer;

impl TypeNormalizer {
    /// Run date parsing, email filtering and phone normalization in order.
    ///
    /// Returns the number of rows removed.
    pub fn normalize(
        &self,
        df: &mut DataFrame,
        keep_rows_without_email: bool,
        processing_steps: &mut Vec<String>,
        issues: &mut Vec<CleaningError>,
    ) -> Result<usize> {
        let mut removed = 0;

        removed += self
            .normalize_order_dates(df, processing_steps, issues)
            .context("Failed to normalize order dates")?;
        removed += self
            .filter_invalid_emails(df, keep_rows_without_email, processing_steps)
            .context("Failed to filter emails")?;
        self.normalize_phone_numbers(df, processing_steps)
            .context("Failed to normalize phone numbers")?;

        Ok(removed)
    }

    /// Parse `order_date` into a `Date` column and drop unparseable rows.
    pub fn normalize_order_dates(
        &self,
        df: &mut DataFrame,
        processing_steps: &mut Vec<String>,
        issues: &mut Vec<CleaningError>,
    ) -> Result<usize> {
        let Ok(column) = df.column(ORDER_DATE) else {
            return Ok(0);
        };

        let conversion = column_to_dates(column.as_materialized_series())?;
        if let Some(issue) = conversion.parse_failure(ORDER_DATE, "date") {
            warn!("{}", issue);
            issues.push(issue);
        }

        let mut mask = RowMask::keep_all(df.height());
        mask.retain(conversion.values.iter().map(Option::is_some));

        df.replace(ORDER_DATE, dates_to_series(ORDER_DATE, &conversion.values)?)?;
        let removed = mask.dropped();
        *df = mask.apply(df)?;

        processing_steps.push(format!(
            "Parsed '{}' as dates, removed {} rows with invalid dates",
            ORDER_DATE, removed
        ));
        debug!("Parsed order dates, {} invalid", removed);

        Ok(removed)
    }

    /// Drop rows whose `customer_email` is not a valid address.
    ///
    /// Missing emails are treated as invalid unless `keep_missing` is set.
    pub fn filter_invalid_emails(
        &self,
        df: &mut DataFrame,
        keep_missing: bool,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        if df.column(CUSTOMER_EMAIL).is_err() {
            return Ok(0);
        }

        let emails = column_as_strings(df, CUSTOMER_EMAIL)?;
        let mut mask = RowMask::keep_all(df.height());
        mask.retain(emails.iter().map(|email| match email {
            Some(value) => is_valid_email(value),
            None => keep_missing,
        }));

        let removed = mask.dropped();
        *df = mask.apply(df)?;

        if removed > 0 {
            info!("Removed {} rows with invalid emails", removed);
        }
        processing_steps.push(format!("Removed {} rows with invalid emails", removed));

        Ok(removed)
    }

    /// Reduce `customer_phone` to digits; values without digits become missing.
    ///
    /// Returns the number of values that changed.
    pub fn normalize_phone_numbers(
        &self,
        df: &mut DataFrame,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        if df.column(CUSTOMER_PHONE).is_err() {
            return Ok(0);
        }

        let phones = column_as_strings(df, CUSTOMER_PHONE)?;
        let mut changed = 0;
        let normalized: Vec<Option<String>> = phones
            .into_iter()
            .map(|phone| {
                let digits = phone.as_deref().and_then(digits_only);
                if digits != phone {
                    changed += 1;
                }
                digits
            })
            .collect();

        df.replace(CUSTOMER_PHONE, Series::new(CUSTOMER_PHONE.into(), normalized))?;

        processing_steps.push(format!(
            "Normalized {} phone numbers to digits only",
            changed
        ));
        debug!("Normalized {} phone numbers", changed);

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::parse_date;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_order_dates_drops_invalid() {
        let mut df = df! {
            "order_id" => [1, 2, 3],
            "order_date" => ["2023-01-15", "someday", "2023-02-01"],
        }
        .unwrap();
        let mut steps = Vec::new();
        let mut issues = Vec::new();

        let removed = TypeNormalizer
            .normalize_order_dates(&mut df, &mut steps, &mut issues)
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("order_date").unwrap().dtype(), &DataType::Date);
        assert_eq!(issues.len(), 1);

        let dates = column_to_dates(df.column("order_date").unwrap().as_materialized_series())
            .unwrap()
            .values;
        assert_eq!(dates, vec![parse_date("2023-01-15"), parse_date("2023-02-01")]);
    }

    #[test]
    fn test_filter_invalid_emails() {
        let mut df = df! {
            "customer_email" => [Some("a@example.com"), Some("not-an-email"), None],
        }
        .unwrap();
        let mut steps = Vec::new();

        let removed = TypeNormalizer
            .filter_invalid_emails(&mut df, false, &mut steps)
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(
            column_as_strings(&df, "customer_email").unwrap(),
            vec![Some("a@example.com".to_string())]
        );
    }

    #[test]
    fn test_filter_invalid_emails_keeping_missing() {
        let mut df = df! {
            "customer_email" => [Some("a@example.com"), Some("bad@"), None],
        }
        .unwrap();
        let mut steps = Vec::new();

        let removed = TypeNormalizer
            .filter_invalid_emails(&mut df, true, &mut steps)
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_normalize_phone_numbers() {
        let mut df = df! {
            "customer_phone" => [Some("(555) 123-4567"), Some("ext."), None, Some("5550001111")],
        }
        .unwrap();
        let mut steps = Vec::new();

        let changed = TypeNormalizer
            .normalize_phone_numbers(&mut df, &mut steps)
            .unwrap();

        assert_eq!(changed, 2);
        assert_eq!(
            column_as_strings(&df, "customer_phone").unwrap(),
            vec![
                Some("5551234567".to_string()),
                None,
                None,
                Some("5550001111".to_string()),
            ]
        );
    }

    #[test]
    fn test_normalize_phone_numbers_from_integers() {
        let mut df = df! {
            "customer_phone" => [Some(5551234567i64), None],
        }
        .unwrap();
        let mut steps = Vec::new();

        TypeNormalizer
            .normalize_phone_numbers(&mut df, &mut steps)
            .unwrap();

        assert_eq!(df.column("customer_phone").unwrap().dtype(), &DataType::String);
        assert_eq!(
            column_as_strings(&df, "customer_phone").unwrap(),
            vec![Some("5551234567".to_string()), None]
        );
    }
}
