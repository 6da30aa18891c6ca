//! Australian personal income tax estimation.
//!
//! Rates for a financial year live in [`TaxYearRates`]; the [`TaxEngine`]
//! combines federal tax, the Medicare levy and surcharge, offsets and the
//! optional superannuation, bracket creep and state tax sections into one
//! [`ComprehensiveResult`].
//!
//! ```
//! use rust_decimal_macros::dec;
//! use au_tax_core::{ComprehensiveTaxInput, TaxEngine, TaxYearRates};
//!
//! let engine = TaxEngine::new(TaxYearRates::fy2024_25());
//! let simple = engine
//!     .calculate_simple(&ComprehensiveTaxInput::for_income(dec!(85000)))
//!     .unwrap();
//!
//! assert_eq!(simple.total, dec!(19792.00));
//! ```

pub mod calculations;
pub mod error;
pub mod models;
pub mod rates;

pub use calculations::{ComprehensiveResult, SimpleTaxResult, Summary, TaxEngine};
pub use error::TaxError;
pub use models::*;
pub use rates::{RatesError, RatesOverrides, TaxYearRates};
