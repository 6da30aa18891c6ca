//! Medicare levy surcharge for households without private hospital cover.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::round_half_up;
use crate::error::{TaxError, ensure_non_negative};
use crate::models::{ComprehensiveTaxInput, FamilyStatus, Residency, SurchargeTier};
use crate::rates::TaxYearRates;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicareSurchargeResult {
    pub surcharge: Decimal,
    /// Income used to pick the tier (includes spouse income for families).
    pub surcharge_income: Decimal,
    pub tier: String,
    pub rate: Decimal,
    pub exempt: bool,
}

#[derive(Debug, Clone)]
pub struct MedicareSurchargeCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> MedicareSurchargeCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// Calculates the surcharge.
    ///
    /// The surcharge is charged on the taxpayer's own taxable income at the
    /// rate for the household's tier.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] if taxable income or spouse income
    /// is negative, and [`TaxError::Configuration`] if the tier table is
    /// empty.
    pub fn calculate(
        &self,
        input: &ComprehensiveTaxInput,
    ) -> Result<MedicareSurchargeResult, TaxError> {
        let income = ensure_non_negative("taxable_income", input.taxable_income)?;
        let spouse_income = ensure_non_negative("spouse_income", input.spouse_income_or_zero())?;

        let surcharge_income = match input.family_status {
            FamilyStatus::Single => income,
            FamilyStatus::Family => income + spouse_income,
        };

        let tiers = self
            .rates
            .medicare_surcharge
            .tiers_for(input.family_status, input.dependents);
        let tier = locate_tier(&tiers, surcharge_income)?;

        if input.residency == Residency::ForeignResident {
            debug!("foreign resident; medicare levy surcharge does not apply");
            return Ok(self.exempt(surcharge_income, tier));
        }
        if self.is_covered(input) {
            debug!("household holds hospital cover; surcharge exempt");
            return Ok(self.exempt(surcharge_income, tier));
        }

        let surcharge = round_half_up(tier.rate * income);
        debug!(
            surcharge_income = %surcharge_income,
            tier = %tier.name,
            surcharge = %surcharge,
            "medicare levy surcharge calculated"
        );

        Ok(MedicareSurchargeResult {
            surcharge,
            surcharge_income,
            tier: tier.name.clone(),
            rate: tier.rate,
            exempt: false,
        })
    }

    /// A household is covered when the taxpayer holds hospital cover and, if
    /// there is a spouse, so does the spouse.
    fn is_covered(
        &self,
        input: &ComprehensiveTaxInput,
    ) -> bool {
        let cover = &input.private_health;
        let has_spouse = input.family_status.is_family() && input.spouse_income.is_some();
        cover.has_hospital_cover && (!has_spouse || cover.spouse_has_hospital_cover)
    }

    fn exempt(
        &self,
        surcharge_income: Decimal,
        tier: &SurchargeTier,
    ) -> MedicareSurchargeResult {
        MedicareSurchargeResult {
            surcharge: Decimal::ZERO,
            surcharge_income,
            tier: tier.name.clone(),
            rate: tier.rate,
            exempt: true,
        }
    }
}

fn locate_tier(
    tiers: &[SurchargeTier],
    income: Decimal,
) -> Result<&SurchargeTier, TaxError> {
    tiers
        .iter()
        .find(|t| t.upper_bound.is_none_or(|upper| income <= upper))
        .or_else(|| tiers.last())
        .ok_or_else(|| TaxError::configuration("surcharge tier table is empty"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::PrivateHealthCover;

    fn surcharge_for(input: &ComprehensiveTaxInput) -> MedicareSurchargeResult {
        let rates = TaxYearRates::fy2024_25();
        MedicareSurchargeCalculator::new(&rates)
            .calculate(input)
            .unwrap()
    }

    fn covered() -> PrivateHealthCover {
        PrivateHealthCover {
            has_hospital_cover: true,
            spouse_has_hospital_cover: false,
            annual_premium: dec!(2000),
        }
    }

    // =========================================================================
    // single tests
    // =========================================================================

    #[test]
    fn base_tier_pays_nothing() {
        let result = surcharge_for(&ComprehensiveTaxInput::for_income(dec!(97000)));

        assert_eq!(result.surcharge, dec!(0));
        assert_eq!(result.tier, "base");
        assert!(!result.exempt);
    }

    #[test]
    fn tier_one_starts_above_base() {
        let result = surcharge_for(&ComprehensiveTaxInput::for_income(dec!(100000)));

        assert_eq!(result.surcharge, dec!(1000.00));
        assert_eq!(result.rate, dec!(0.01));
    }

    #[test]
    fn top_tier_single_without_cover() {
        let result = surcharge_for(&ComprehensiveTaxInput::for_income(dec!(200000)));

        assert_eq!(result.surcharge, dec!(3000.00));
        assert_eq!(result.tier, "tier 3");
    }

    #[test]
    fn cover_exempts_single() {
        let input = ComprehensiveTaxInput {
            private_health: covered(),
            ..ComprehensiveTaxInput::for_income(dec!(200000))
        };

        let result = surcharge_for(&input);

        assert_eq!(result.surcharge, dec!(0));
        assert!(result.exempt);
    }

    // =========================================================================
    // family tests
    // =========================================================================

    #[test]
    fn family_tier_uses_combined_income_but_charges_own_income() {
        let input = ComprehensiveTaxInput {
            family_status: FamilyStatus::Family,
            spouse_income: Some(dec!(100000)),
            ..ComprehensiveTaxInput::for_income(dec!(120000))
        };

        let result = surcharge_for(&input);

        assert_eq!(result.surcharge_income, dec!(220000));
        assert_eq!(result.rate, dec!(0.01));
        assert_eq!(result.surcharge, dec!(1200.00));
    }

    #[test]
    fn dependents_after_the_first_raise_family_tiers() {
        let input = ComprehensiveTaxInput {
            family_status: FamilyStatus::Family,
            spouse_income: Some(dec!(96000)),
            dependents: 3,
            ..ComprehensiveTaxInput::for_income(dec!(100000))
        };

        // Base tier is raised to 197,000
        let result = surcharge_for(&input);

        assert_eq!(result.surcharge_income, dec!(196000));
        assert_eq!(result.surcharge, dec!(0));
    }

    #[test]
    fn uncovered_spouse_keeps_family_liable() {
        let input = ComprehensiveTaxInput {
            family_status: FamilyStatus::Family,
            spouse_income: Some(dec!(150000)),
            private_health: covered(),
            ..ComprehensiveTaxInput::for_income(dec!(160000))
        };

        let result = surcharge_for(&input);

        assert!(!result.exempt);
        assert_eq!(result.rate, dec!(0.015));
    }

    #[test]
    fn single_parent_needs_only_own_cover() {
        let input = ComprehensiveTaxInput {
            family_status: FamilyStatus::Family,
            dependents: 1,
            private_health: covered(),
            ..ComprehensiveTaxInput::for_income(dec!(250000))
        };

        let result = surcharge_for(&input);

        assert!(result.exempt);
    }

    #[test]
    fn foreign_residents_are_not_liable() {
        let input = ComprehensiveTaxInput {
            residency: Residency::ForeignResident,
            ..ComprehensiveTaxInput::for_income(dec!(200000))
        };

        let result = surcharge_for(&input);

        assert_eq!(result.surcharge, dec!(0));
        assert!(result.exempt);
    }

    #[test]
    fn negative_spouse_income_is_rejected() {
        let rates = TaxYearRates::fy2024_25();
        let input = ComprehensiveTaxInput {
            family_status: FamilyStatus::Family,
            spouse_income: Some(dec!(-1)),
            ..ComprehensiveTaxInput::for_income(dec!(50000))
        };

        let result = MedicareSurchargeCalculator::new(&rates).calculate(&input);

        assert_eq!(
            result,
            Err(TaxError::InvalidAmount {
                field: "spouse_income",
                value: dec!(-1),
            })
        );
    }
}
