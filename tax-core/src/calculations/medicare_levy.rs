//! Medicare levy.
//!
//! Three zones by taxable income against the household's low-income
//! threshold:
//!
//! | Zone | Income | Levy |
//! |------|--------|------|
//! | exempt | `<= threshold` | 0 |
//! | phase-in | `<= threshold × (1 + band)` | `income × rate × (income − threshold) / (threshold × band)` |
//! | full | above | `income × rate` |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::round_half_up;
use crate::error::{TaxError, ensure_non_negative};
use crate::models::{ComprehensiveTaxInput, Residency};
use crate::rates::TaxYearRates;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicareLevyResult {
    pub levy: Decimal,
    pub threshold: Decimal,
    pub rate: Decimal,
    pub exempt: bool,
    pub phase_in_applied: bool,
}

impl MedicareLevyResult {
    fn exempt(
        threshold: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            levy: Decimal::ZERO,
            threshold,
            rate,
            exempt: true,
            phase_in_applied: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MedicareLevyCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> MedicareLevyCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// Calculates the levy on the input's taxable income.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] if taxable income is negative.
    pub fn calculate(
        &self,
        input: &ComprehensiveTaxInput,
    ) -> Result<MedicareLevyResult, TaxError> {
        let income = ensure_non_negative("taxable_income", input.taxable_income)?;
        let levy_rates = &self.rates.medicare_levy;
        let threshold = self.threshold_for(input);

        if input.residency == Residency::ForeignResident {
            debug!("foreign resident; medicare levy does not apply");
            return Ok(MedicareLevyResult::exempt(threshold, levy_rates.rate));
        }

        Ok(self.levy_at(income, threshold))
    }

    /// Low-income threshold for the household.
    fn threshold_for(
        &self,
        input: &ComprehensiveTaxInput,
    ) -> Decimal {
        let senior = self.rates.offsets.is_senior(input.age, input.is_pensioner);
        self.rates
            .medicare_levy
            .thresholds
            .select(input.family_status, senior, input.dependents)
    }

    fn levy_at(
        &self,
        income: Decimal,
        threshold: Decimal,
    ) -> MedicareLevyResult {
        let rate = self.rates.medicare_levy.rate;
        let band = self.rates.medicare_levy.phase_in_band;

        if income <= threshold {
            debug!(income = %income, threshold = %threshold, "income at or below levy threshold");
            return MedicareLevyResult::exempt(threshold, rate);
        }

        let phase_in_ceiling = threshold * (Decimal::ONE + band);
        if income <= phase_in_ceiling {
            let levy = income * (rate * (income - threshold) / (threshold * band));
            debug!(income = %income, threshold = %threshold, "medicare levy phasing in");
            return MedicareLevyResult {
                levy: round_half_up(levy),
                threshold,
                rate,
                exempt: false,
                phase_in_applied: true,
            };
        }

        MedicareLevyResult {
            levy: round_half_up(income * rate),
            threshold,
            rate,
            exempt: false,
            phase_in_applied: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::FamilyStatus;

    fn levy_for(input: &ComprehensiveTaxInput) -> MedicareLevyResult {
        let rates = TaxYearRates::fy2024_25();
        MedicareLevyCalculator::new(&rates).calculate(input).unwrap()
    }

    // =========================================================================
    // zone tests
    // =========================================================================

    #[test]
    fn exempt_at_threshold() {
        let result = levy_for(&ComprehensiveTaxInput::for_income(dec!(27222)));

        assert_eq!(result.levy, dec!(0));
        assert!(result.exempt);
        assert!(!result.phase_in_applied);
    }

    #[test]
    fn phases_in_just_above_threshold() {
        let result = levy_for(&ComprehensiveTaxInput::for_income(dec!(28000)));

        // 28,000 * 0.02 * 778 / 2,722.2
        assert_eq!(result.levy, dec!(160.05));
        assert!(result.phase_in_applied);
        assert!(!result.exempt);
    }

    #[test]
    fn phase_in_reaches_full_levy_at_top_of_band() {
        let income = dec!(27222) * dec!(1.1);

        let result = levy_for(&ComprehensiveTaxInput::for_income(income));

        assert_eq!(result.levy, round_half_up(income * dec!(0.02)));
        assert!(result.phase_in_applied);
    }

    #[test]
    fn full_levy_well_above_threshold() {
        let result = levy_for(&ComprehensiveTaxInput::for_income(dec!(85000)));

        assert_eq!(result.levy, dec!(1700.00));
        assert!(!result.phase_in_applied);
    }

    #[test]
    fn zero_income_owes_nothing() {
        let result = levy_for(&ComprehensiveTaxInput::for_income(dec!(0)));

        assert_eq!(result.levy, dec!(0));
    }

    #[test]
    fn negative_income_is_rejected() {
        let rates = TaxYearRates::fy2024_25();
        let input = ComprehensiveTaxInput::for_income(dec!(-5));

        let result = MedicareLevyCalculator::new(&rates).calculate(&input);

        assert!(matches!(result, Err(TaxError::InvalidAmount { .. })));
    }

    // =========================================================================
    // threshold selection tests
    // =========================================================================

    #[test]
    fn family_threshold_rises_per_dependent() {
        let input = ComprehensiveTaxInput {
            family_status: FamilyStatus::Family,
            dependents: 2,
            ..ComprehensiveTaxInput::for_income(dec!(50000))
        };

        let result = levy_for(&input);

        // 45,907 + 2 * 4,216
        assert_eq!(result.threshold, dec!(54339));
        assert!(result.exempt);
    }

    #[test]
    fn seniors_use_senior_threshold() {
        let input = ComprehensiveTaxInput {
            age: 70,
            ..ComprehensiveTaxInput::for_income(dec!(40000))
        };

        let result = levy_for(&input);

        assert_eq!(result.threshold, dec!(43020));
        assert!(result.exempt);
    }

    #[test]
    fn foreign_residents_are_not_liable() {
        let input = ComprehensiveTaxInput {
            residency: Residency::ForeignResident,
            ..ComprehensiveTaxInput::for_income(dec!(150000))
        };

        let result = levy_for(&input);

        assert_eq!(result.levy, dec!(0));
        assert!(result.exempt);
    }
}
