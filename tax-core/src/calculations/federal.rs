//! Federal income tax on taxable income.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use au_tax_core::{Residency, TaxYearRates};
//! use au_tax_core::calculations::FederalTaxCalculator;
//!
//! let rates = TaxYearRates::fy2024_25();
//! let calculator = FederalTaxCalculator::new(&rates, Residency::Resident);
//!
//! let result = calculator.calculate(dec!(85000)).unwrap();
//!
//! assert_eq!(result.tax_payable, dec!(18092.00));
//! assert_eq!(result.marginal_rate, dec!(0.325));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{ratio_or_zero, round_half_up};
use crate::calculations::schedule::{BracketSlice, evaluate_schedule};
use crate::error::TaxError;
use crate::models::{Residency, TaxSchedule};
use crate::rates::TaxYearRates;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalTaxResult {
    pub taxable_income: Decimal,
    /// Tax on taxable income, rounded to the cent.
    pub tax_payable: Decimal,
    pub marginal_rate: Decimal,
    /// `tax_payable / taxable_income`, zero when there is no income.
    pub average_rate: Decimal,
    pub tax_free_threshold: Decimal,
    pub breakdown: Vec<BracketSlice>,
}

/// Calculator for income tax against one bracket table.
#[derive(Debug, Clone)]
pub struct FederalTaxCalculator<'a> {
    schedule: &'a TaxSchedule,
    tax_free_threshold: Decimal,
}

impl<'a> FederalTaxCalculator<'a> {
    /// Uses the year's schedule for `residency`. Foreign residents have no
    /// tax-free threshold.
    pub fn new(
        rates: &'a TaxYearRates,
        residency: Residency,
    ) -> Self {
        let tax_free_threshold = match residency {
            Residency::Resident => rates.tax_free_threshold,
            Residency::ForeignResident => Decimal::ZERO,
        };
        Self {
            schedule: rates.schedule_for(residency),
            tax_free_threshold,
        }
    }

    /// Uses an arbitrary schedule, such as an indexed copy of the year's
    /// table.
    pub fn with_schedule(
        schedule: &'a TaxSchedule,
        tax_free_threshold: Decimal,
    ) -> Self {
        Self {
            schedule,
            tax_free_threshold,
        }
    }

    /// Calculates tax payable on `taxable_income`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] if `taxable_income` is negative.
    pub fn calculate(
        &self,
        taxable_income: Decimal,
    ) -> Result<FederalTaxResult, TaxError> {
        let evaluation = evaluate_schedule(self.schedule, taxable_income).map_err(|_| {
            TaxError::InvalidAmount {
                field: "taxable_income",
                value: taxable_income,
            }
        })?;

        let tax_payable = round_half_up(evaluation.total);
        debug!(
            taxable_income = %taxable_income,
            bracket = evaluation.bracket_index,
            tax = %tax_payable,
            "federal tax calculated"
        );

        Ok(FederalTaxResult {
            taxable_income,
            tax_payable,
            marginal_rate: evaluation.marginal_rate,
            average_rate: ratio_or_zero(tax_payable, taxable_income),
            tax_free_threshold: self.tax_free_threshold,
            breakdown: evaluation.slices,
        })
    }

    /// Tax payable only.
    pub fn tax_payable(
        &self,
        taxable_income: Decimal,
    ) -> Result<Decimal, TaxError> {
        Ok(self.calculate(taxable_income)?.tax_payable)
    }
}
