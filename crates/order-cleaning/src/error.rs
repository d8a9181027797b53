//! Custom error types for the order cleaning pipeline.
//!
//! This module provides the error hierarchy, built with `thiserror`, for the
//! loader, the pipeline stages and the writer.
//!
//! Errors are serializable so they can be emitted as structured diagnostics
//! alongside the validation report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// The input dataset does not exist. The pipeline never runs.
    #[error("Source file '{}' not found", .0.display())]
    SourceNotFound(PathBuf),

    /// Values of a column failed a type conversion.
    ///
    /// Row-scoped: the offending rows are dropped or the values treated as
    /// missing, so this variant is reported rather than returned from `process`.
    #[error("Failed to parse {count} value(s) in column '{column}' as {target_type} (first: '{value}')")]
    ParseFailure {
        column: String,
        value: String,
        target_type: String,
        count: usize,
    },

    /// The cleaned dataset could not be persisted.
    #[error("Failed to write '{}': {reason}", path.display())]
    WriteFailure { path: PathBuf, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A cleaning stage failed for reasons other than row-level data problems.
    #[error("Failed to clean data during {stage}: {reason}")]
    CleaningFailed { stage: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for structured reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            Self::ParseFailure { .. } => "PARSE_FAILURE",
            Self::WriteFailure { .. } => "WRITE_FAILURE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::CleaningFailed { .. } => "CLEANING_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error only affects a single row and never aborts a run.
    pub fn is_row_scoped(&self) -> bool {
        match self {
            Self::ParseFailure { .. } => true,
            Self::WithContext { source, .. } => source.is_row_scoped(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
