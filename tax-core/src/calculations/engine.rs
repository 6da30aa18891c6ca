//! Runs every calculator for one taxpayer and rolls the results into a
//! summary.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use au_tax_core::{ComprehensiveTaxInput, TaxEngine, TaxYearRates};
//!
//! let engine = TaxEngine::new(TaxYearRates::fy2024_25());
//!
//! let result = engine
//!     .calculate(&ComprehensiveTaxInput::for_income(dec!(45000)))
//!     .unwrap();
//!
//! assert_eq!(result.federal.tax_payable, dec!(5092.00));
//! assert_eq!(result.summary.marginal_rate, dec!(0.19));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::bracket_creep::{BracketCreepAnalyzer, BracketCreepResult};
use crate::calculations::common::{non_negative, ratio_or_zero};
use crate::calculations::federal::{FederalTaxCalculator, FederalTaxResult};
use crate::calculations::medicare_levy::{MedicareLevyCalculator, MedicareLevyResult};
use crate::calculations::medicare_surcharge::{
    MedicareSurchargeCalculator, MedicareSurchargeResult,
};
use crate::calculations::offsets::{OffsetsCalculator, OffsetsResult};
use crate::calculations::state_tax::{StateTaxCalculator, StateTaxResult};
use crate::calculations::superannuation::{SuperannuationCalculator, SuperannuationResult};
use crate::error::{TaxError, ensure_non_negative};
use crate::models::{ComprehensiveTaxInput, FinancialYear};
use crate::rates::TaxYearRates;

/// Headline figures for the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub gross_income: Decimal,
    /// Federal tax, levy and surcharge, less applied offsets, plus state
    /// taxes. Never negative.
    pub net_tax_payable: Decimal,
    pub after_tax_income: Decimal,
    /// `net_tax_payable / gross_income`, zero when there is no income.
    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComprehensiveResult {
    pub financial_year: FinancialYear,
    pub federal: FederalTaxResult,
    pub medicare_levy: MedicareLevyResult,
    pub medicare_surcharge: MedicareSurchargeResult,
    pub offsets: OffsetsResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superannuation: Option<SuperannuationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket_creep: Option<BracketCreepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_tax: Option<StateTaxResult>,
    pub summary: Summary,
}

/// Federal tax, levy and surcharge without offsets or optional sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTaxResult {
    pub federal_tax: Decimal,
    pub medicare_levy: Decimal,
    pub medicare_surcharge: Decimal,
    pub total: Decimal,
    pub marginal_rate: Decimal,
}

/// Tax engine for one financial year.
///
/// Holds only the year's rates, so a single engine can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct TaxEngine {
    rates: TaxYearRates,
}

impl TaxEngine {
    pub fn new(rates: TaxYearRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &TaxYearRates {
        &self.rates
    }

    pub fn financial_year(&self) -> FinancialYear {
        self.rates.financial_year
    }

    /// Runs every applicable calculator for `input`.
    ///
    /// Federal tax, the Medicare levy and surcharge and offsets always run;
    /// superannuation, bracket creep and state tax run when their sections
    /// are present.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaxError`] raised by any calculator.
    pub fn calculate(
        &self,
        input: &ComprehensiveTaxInput,
    ) -> Result<ComprehensiveResult, TaxError> {
        let gross_income = ensure_non_negative("gross_income", input.gross_income)?;

        let federal = FederalTaxCalculator::new(&self.rates, input.residency)
            .calculate(input.taxable_income)?;
        let medicare_levy = MedicareLevyCalculator::new(&self.rates).calculate(input)?;
        let medicare_surcharge = MedicareSurchargeCalculator::new(&self.rates).calculate(input)?;
        let offsets =
            OffsetsCalculator::new(&self.rates).calculate(input, federal.tax_payable)?;

        let superannuation = input
            .superannuation
            .as_ref()
            .map(|s| {
                SuperannuationCalculator::new(&self.rates).calculate(
                    s,
                    input,
                    federal.marginal_rate,
                )
            })
            .transpose()?;
        let bracket_creep = input
            .bracket_creep
            .as_ref()
            .map(|b| {
                BracketCreepAnalyzer::new(&self.rates, input.residency)
                    .analyze(input.taxable_income, b)
            })
            .transpose()?;
        let state_tax = input
            .state_tax
            .as_ref()
            .map(|s| {
                StateTaxCalculator::for_jurisdiction(&self.rates, s.jurisdiction)?.calculate(s)
            })
            .transpose()?;

        let state_total = state_tax.as_ref().map_or(Decimal::ZERO, |s| s.total);
        let net_tax_payable = non_negative(
            federal.tax_payable + medicare_levy.levy + medicare_surcharge.surcharge
                - offsets.applied
                + state_total,
        );
        let summary = Summary {
            gross_income,
            net_tax_payable,
            after_tax_income: gross_income - net_tax_payable,
            effective_rate: ratio_or_zero(net_tax_payable, gross_income),
            marginal_rate: federal.marginal_rate,
        };

        debug!(
            year = %self.rates.financial_year,
            gross_income = %gross_income,
            net_tax = %summary.net_tax_payable,
            "comprehensive calculation complete"
        );

        Ok(ComprehensiveResult {
            financial_year: self.rates.financial_year,
            federal,
            medicare_levy,
            medicare_surcharge,
            offsets,
            superannuation,
            bracket_creep,
            state_tax,
            summary,
        })
    }

    /// Federal tax plus the Medicare levy and surcharge only.
    pub fn calculate_simple(
        &self,
        input: &ComprehensiveTaxInput,
    ) -> Result<SimpleTaxResult, TaxError> {
        let federal = FederalTaxCalculator::new(&self.rates, input.residency)
            .calculate(input.taxable_income)?;
        let levy = MedicareLevyCalculator::new(&self.rates).calculate(input)?.levy;
        let surcharge = MedicareSurchargeCalculator::new(&self.rates)
            .calculate(input)?
            .surcharge;

        Ok(SimpleTaxResult {
            federal_tax: federal.tax_payable,
            medicare_levy: levy,
            medicare_surcharge: surcharge,
            total: federal.tax_payable + levy + surcharge,
            marginal_rate: federal.marginal_rate,
        })
    }

    /// Runs [`TaxEngine::calculate`] for each named scenario, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first scenario that fails.
    pub fn compare_scenarios(
        &self,
        scenarios: &[(String, ComprehensiveTaxInput)],
    ) -> Result<Vec<(String, ComprehensiveResult)>, TaxError> {
        scenarios
            .iter()
            .map(|(name, input)| {
                debug!(scenario = %name, "calculating scenario");
                Ok((name.clone(), self.calculate(input)?))
            })
            .collect()
    }

    /// Calculates independent inputs; each carries its own outcome.
    pub fn calculate_batch(
        &self,
        inputs: &[ComprehensiveTaxInput],
    ) -> Vec<Result<ComprehensiveResult, TaxError>> {
        inputs.iter().map(|input| self.calculate(input)).collect()
    }
}
