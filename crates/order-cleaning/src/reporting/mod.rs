//! Report rendering module.
//!
//! Turns profiles, summaries and validation reports into console text, and
//! whole runs into a JSON [`CleaningReport`].
//!
//! # Example
//!
//! ```rust,ignore
//! use order_cleaning::reporting::ReportRenderer;
//!
//! let profile = DataProfiler::profile(&result.data)?;
//! println!("{}", ReportRenderer::render_profile(&profile));
//!
//! let report = ReportRenderer::build_report(input, Some(output), &result, &profile);
//! ReportRenderer::write_report_to_file(&report, Path::new("report.json"))?;
//! ```

mod generator;

pub use generator::{CleaningReport, ReportRenderer};
