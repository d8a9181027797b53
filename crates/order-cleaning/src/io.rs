//! CSV loading and saving.

use crate::error::{CleaningError, Result, ResultExt};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Load a CSV file with a header row, inferring column types from the text.
///
/// Types are inferred from every row, so a stray value late in the file
/// still turns its column into text instead of failing the read. If the
/// file cannot be parsed with inferred types at all, every column is read
/// as text and left to the cleaning stages to coerce.
///
/// # Errors
///
/// [`CleaningError::SourceNotFound`] when `path` does not exist.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CleaningError::SourceNotFound(path.to_path_buf()));
    }

    let df = match read_csv(path, None) {
        Ok(df) => df,
        Err(e) => {
            debug!("Loading with inferred types failed: {}", e);
            read_csv(path, Some(0)).context(format!("Failed to read '{}'", path.display()))?
        }
    };

    info!(
        "Data loaded successfully. Shape: ({}, {})",
        df.height(),
        df.width()
    );
    Ok(df)
}

/// `infer_schema_length` of `None` scans all rows; `Some(0)` reads all text.
fn read_csv(path: &Path, infer_schema_length: Option<usize>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

/// Write a table as CSV: header first, column order preserved, missing
/// values as empty fields.
///
/// The table stays with the caller whether or not the write succeeds.
///
/// # Errors
///
/// [`CleaningError::WriteFailure`] when the file cannot be created or written.
pub fn save_dataset(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let write_failure = |reason: String| CleaningError::WriteFailure {
        path: path.to_path_buf(),
        reason,
    };

    let mut file = File::create(path).map_err(|e| write_failure(e.to_string()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .map_err(|e| write_failure(e.to_string()))?;

    info!("Cleaned data saved to: {}", path.display());
    Ok(())
}
