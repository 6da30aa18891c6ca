//! Multi-year bracket creep projection.
//!
//! Income grows with wages each year while the bracket table stays fixed
//! (or is indexed more slowly than prices). Each year's impact is the tax
//! actually paid less the tax that would be paid had the brackets moved
//! with inflation exactly: tax on real income under the unindexed table,
//! re-inflated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{MAX_PROJECTION_YEARS, growth_factor, ratio_or_zero, round_half_up};
use crate::calculations::federal::FederalTaxCalculator;
use crate::error::{TaxError, ensure_horizon, ensure_non_negative};
use crate::models::{
    BracketCreepInput, FinancialYear, IndexationMethod, IndexationSettings, Residency,
};
use crate::rates::TaxYearRates;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyProjection {
    /// Years after the base year, starting at 1.
    pub year: u32,
    pub financial_year: FinancialYear,
    pub nominal_income: Decimal,
    pub real_income: Decimal,
    pub tax_paid: Decimal,
    /// Tax had brackets kept pace with inflation, in that year's dollars.
    pub baseline_tax: Decimal,
    pub bracket_creep_impact: Decimal,
    pub cumulative_bracket_creep: Decimal,
    pub average_rate: Decimal,
    pub real_after_tax_income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketCreepSummary {
    pub total_impact: Decimal,
    pub average_impact: Decimal,
    /// Real after-tax income in year 1 less the same in the final year.
    pub real_after_tax_decline: Decimal,
    /// Average rate in the final year less the same in year 1.
    pub average_rate_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketCreepResult {
    pub base_income: Decimal,
    pub projections: Vec<YearlyProjection>,
    pub summary: BracketCreepSummary,
}

/// State carried from one projected year to the next.
struct ProjectionState {
    inflation_index: Decimal,
    cumulative: Decimal,
}

#[derive(Debug, Clone)]
pub struct BracketCreepAnalyzer<'a> {
    rates: &'a TaxYearRates,
    residency: Residency,
}

impl<'a> BracketCreepAnalyzer<'a> {
    pub fn new(
        rates: &'a TaxYearRates,
        residency: Residency,
    ) -> Self {
        Self { rates, residency }
    }

    /// Projects `input.years` years forward from `base_income`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] if `years` is zero or the income
    /// or any rate is negative, [`TaxError::OutOfRange`] if `years` exceeds
    /// [`MAX_PROJECTION_YEARS`], and [`TaxError::Configuration`] if the
    /// indexed table cannot be built or a projected figure does not fit in a
    /// `Decimal`.
    pub fn analyze(
        &self,
        base_income: Decimal,
        input: &BracketCreepInput,
    ) -> Result<BracketCreepResult, TaxError> {
        let base_income = ensure_non_negative("taxable_income", base_income)?;
        if input.years == 0 {
            return Err(TaxError::InvalidAmount {
                field: "years",
                value: Decimal::ZERO,
            });
        }
        let years = ensure_horizon("years", input.years, MAX_PROJECTION_YEARS)?;
        let growth = ensure_non_negative("salary_growth_rate", input.salary_growth_rate)?;
        let inflation = ensure_non_negative("inflation_rate", input.inflation_rate)?;
        if let Some(indexation) = &input.indexation {
            ensure_non_negative("indexation_rate", indexation.rate)?;
        }

        let unindexed = FederalTaxCalculator::new(self.rates, self.residency);
        let mut state = ProjectionState {
            inflation_index: Decimal::ONE,
            cumulative: Decimal::ZERO,
        };
        let mut projections = Vec::new();

        for year in 1..=years {
            let nominal_income = growth_factor(growth, year)
                .and_then(|factor| base_income.checked_mul(factor))
                .map(round_half_up)
                .ok_or_else(|| overflow(year))?;
            state.inflation_index = Decimal::ONE
                .checked_add(inflation)
                .and_then(|step| state.inflation_index.checked_mul(step))
                .ok_or_else(|| overflow(year))?;
            let real_income = nominal_income / state.inflation_index;

            let tax_paid = match &input.indexation {
                Some(indexation) => self.indexed_tax(nominal_income, indexation, year)?,
                None => unindexed.tax_payable(nominal_income)?,
            };
            let baseline_tax =
                round_half_up(unindexed.tax_payable(real_income)? * state.inflation_index);
            let impact = tax_paid - baseline_tax;
            state.cumulative = state
                .cumulative
                .checked_add(impact)
                .ok_or_else(|| overflow(year))?;

            debug!(
                year,
                nominal = %nominal_income,
                tax = %tax_paid,
                impact = %impact,
                "bracket creep year projected"
            );

            projections.push(YearlyProjection {
                year,
                financial_year: self
                    .rates
                    .financial_year
                    .offset(i32::try_from(year).unwrap_or(i32::MAX)),
                nominal_income,
                real_income: round_half_up(real_income),
                tax_paid,
                baseline_tax,
                bracket_creep_impact: impact,
                cumulative_bracket_creep: state.cumulative,
                average_rate: ratio_or_zero(tax_paid, nominal_income),
                real_after_tax_income: round_half_up(
                    (nominal_income - tax_paid) / state.inflation_index,
                ),
            });
        }

        let summary = summarize(&projections);
        Ok(BracketCreepResult {
            base_income,
            projections,
            summary,
        })
    }

    /// Tax on `nominal_income` when brackets are indexed by `settings`.
    ///
    /// No indexation applies during the lag; afterwards the factor
    /// compounds from the first indexed year.
    fn indexed_tax(
        &self,
        nominal_income: Decimal,
        settings: &IndexationSettings,
        year: u32,
    ) -> Result<Decimal, TaxError> {
        let indexed_years = year.saturating_sub(settings.lag_years);
        let factor = growth_factor(settings.rate, indexed_years).ok_or_else(|| overflow(year))?;
        let schedule = self.rates.schedule_for(self.residency);

        match settings.method {
            IndexationMethod::RescaleBrackets => {
                let indexed = schedule.indexed(factor)?;
                FederalTaxCalculator::with_schedule(&indexed, indexed.zero_rate_ceiling())
                    .tax_payable(nominal_income)
            }
            IndexationMethod::DeflateReinflate => {
                let deflated = FederalTaxCalculator::new(self.rates, self.residency)
                    .tax_payable(nominal_income / factor)?;
                Ok(round_half_up(deflated * factor))
            }
        }
    }
}

fn overflow(year: u32) -> TaxError {
    TaxError::configuration(format!(
        "bracket creep projection does not fit in a decimal in year {year}"
    ))
}

fn summarize(projections: &[YearlyProjection]) -> BracketCreepSummary {
    let (Some(first), Some(last)) = (projections.first(), projections.last()) else {
        return BracketCreepSummary {
            total_impact: Decimal::ZERO,
            average_impact: Decimal::ZERO,
            real_after_tax_decline: Decimal::ZERO,
            average_rate_change: Decimal::ZERO,
        };
    };

    let total_impact = last.cumulative_bracket_creep;
    BracketCreepSummary {
        total_impact,
        average_impact: round_half_up(total_impact / Decimal::from(projections.len())),
        real_after_tax_decline: first.real_after_tax_income - last.real_after_tax_income,
        average_rate_change: last.average_rate - first.average_rate,
    }
}
