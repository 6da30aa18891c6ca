//! Batch input and reporting for the tax engine.

pub mod loader;
pub mod report;

pub use loader::{CsvLoadError, TaxpayerRecord, load_from_file, load_from_str};
pub use report::{EstimateReport, run_batch};
