//! Post-cleaning validation.
//!
//! Computes the diagnostics reported after the last cleaning stage, without
//! touching the table.

mod validator;

pub use validator::DataValidator;
