//! Non-refundable tax offsets.
//!
//! Each offset the taxpayer is eligible for is worked out on its own, then
//! the total is capped at gross federal tax. Offsets never produce a refund.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_up};
use crate::error::{TaxError, ensure_non_negative};
use crate::models::{ComprehensiveTaxInput, FamilyStatus, OffsetKind, Residency};
use crate::rates::{PrivateHealthRebateTier, TaxYearRates};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetLine {
    pub kind: OffsetKind,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetsResult {
    pub lines: Vec<OffsetLine>,
    /// Sum of every line before the cap.
    pub total: Decimal,
    /// Amount actually used against tax: `min(total, gross_tax)`.
    pub applied: Decimal,
    pub capped: bool,
}

impl OffsetsResult {
    pub fn amount_for(
        &self,
        kind: OffsetKind,
    ) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.amount)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct OffsetsCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> OffsetsCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// Works out every applicable offset and caps the total at `gross_tax`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] if taxable income, spouse income,
    /// medical expenses, the insurance premium or `gross_tax` is negative.
    pub fn calculate(
        &self,
        input: &ComprehensiveTaxInput,
        gross_tax: Decimal,
    ) -> Result<OffsetsResult, TaxError> {
        let income = ensure_non_negative("taxable_income", input.taxable_income)?;
        ensure_non_negative("spouse_income", input.spouse_income_or_zero())?;
        ensure_non_negative("medical_expenses", input.medical_expenses)?;
        ensure_non_negative("annual_premium", input.private_health.annual_premium)?;
        let gross_tax = ensure_non_negative("gross_tax", gross_tax)?;

        let mut lines = Vec::new();

        if input.residency == Residency::Resident {
            lines.push(self.low_income(income));
            if let Some(line) = self.senior(input) {
                lines.push(line);
            }
        }
        if let Some(line) = self.medical_expenses(input.medical_expenses) {
            lines.push(line);
        }
        if let Some(line) = self.private_health_rebate(input) {
            lines.push(line);
        }

        let total: Decimal = lines.iter().map(|l| l.amount).sum();
        let applied = total.min(gross_tax);
        let capped = total > gross_tax;
        if capped {
            debug!(
                total = %total,
                gross_tax = %gross_tax,
                "offsets exceed gross tax; capped"
            );
        }

        Ok(OffsetsResult {
            lines,
            total,
            applied,
            capped,
        })
    }

    /// Low income tax offset.
    fn low_income(
        &self,
        income: Decimal,
    ) -> OffsetLine {
        let rule = &self.rates.offsets.low_income;
        let amount = round_half_up(rule.entitlement(income));
        if amount.is_zero() {
            debug!(
                income = %income,
                phase_out_end = %rule.phase_out_end,
                "income at or above low income offset cut-out; offset is zero"
            );
        }
        OffsetLine {
            kind: rule.kind,
            amount,
        }
    }

    /// Seniors and pensioners offset. Couples are tested on combined income;
    /// a family with no spouse income is tested as single.
    fn senior(
        &self,
        input: &ComprehensiveTaxInput,
    ) -> Option<OffsetLine> {
        let offsets = &self.rates.offsets;
        if !offsets.is_senior(input.age, input.is_pensioner) {
            return None;
        }

        let (rule, income) = match (input.family_status, input.spouse_income) {
            (FamilyStatus::Family, Some(spouse)) => {
                (&offsets.senior_couple, input.taxable_income + spouse)
            }
            _ => (&offsets.senior_single, input.taxable_income),
        };

        let amount = round_half_up(rule.entitlement(income));
        if amount.is_zero() {
            debug!(
                income = %income,
                offset = rule.kind.as_str(),
                "senior offset fully phased out"
            );
        }
        Some(OffsetLine {
            kind: rule.kind,
            amount,
        })
    }

    fn medical_expenses(
        &self,
        expenses: Decimal,
    ) -> Option<OffsetLine> {
        if expenses.is_zero() {
            return None;
        }
        let rule = &self.rates.offsets.medical_expenses;
        let amount = round_half_up(rule.rate * non_negative(expenses - rule.threshold));
        Some(OffsetLine {
            kind: OffsetKind::MedicalExpenses,
            amount,
        })
    }

    /// Private health insurance rebate on the premium paid.
    fn private_health_rebate(
        &self,
        input: &ComprehensiveTaxInput,
    ) -> Option<OffsetLine> {
        let cover = &input.private_health;
        if !cover.has_hospital_cover || cover.annual_premium.is_zero() {
            return None;
        }

        let (income, increment) = match input.family_status {
            FamilyStatus::Single => (input.taxable_income, Decimal::ZERO),
            FamilyStatus::Family => (
                input.taxable_income + input.spouse_income_or_zero(),
                self.rates
                    .medicare_surcharge
                    .family_increment(input.dependents),
            ),
        };

        let tier = self.rebate_tier(input.family_status, income, increment)?;
        let percentage = tier.percentage_for_age(input.age);
        if percentage.is_zero() {
            debug!(
                income = %income,
                tier = %tier.name,
                "income above top rebate tier; no private health rebate"
            );
        }

        Some(OffsetLine {
            kind: OffsetKind::PrivateHealthRebate,
            amount: round_half_up(cover.annual_premium * percentage),
        })
    }

    fn rebate_tier(
        &self,
        family_status: FamilyStatus,
        income: Decimal,
        increment: Decimal,
    ) -> Option<&'a PrivateHealthRebateTier> {
        let rates: &'a TaxYearRates = self.rates;
        let tiers = &rates.offsets.private_health_rebate;
        tiers
            .iter()
            .find(|tier| {
                let upper = match family_status {
                    FamilyStatus::Single => tier.single_upper,
                    FamilyStatus::Family => tier.family_upper.map(|u| u + increment),
                };
                upper.is_none_or(|u| income <= u)
            })
            .or_else(|| tiers.last())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::PrivateHealthCover;

    fn offsets_for(
        input: &ComprehensiveTaxInput,
        gross_tax: Decimal,
    ) -> OffsetsResult {
        let rates = TaxYearRates::fy2024_25();
        OffsetsCalculator::new(&rates)
            .calculate(input, gross_tax)
            .unwrap()
    }

    fn cover(premium: Decimal) -> PrivateHealthCover {
        PrivateHealthCover {
            has_hospital_cover: true,
            spouse_has_hospital_cover: true,
            annual_premium: premium,
        }
    }

    // =========================================================================
    // low income offset tests
    // =========================================================================

    #[test]
    fn full_lito_at_low_income() {
        let result = offsets_for(&ComprehensiveTaxInput::for_income(dec!(30000)), dec!(2242));

        assert_eq!(result.amount_for(OffsetKind::LowIncome), dec!(700));
        assert_eq!(result.applied, dec!(700));
        assert!(!result.capped);
    }

    #[test]
    fn lito_tapers_through_both_stages() {
        let result = offsets_for(&ComprehensiveTaxInput::for_income(dec!(50000)), dec!(6717));

        assert_eq!(result.amount_for(OffsetKind::LowIncome), dec!(250));
    }

    #[test]
    fn lito_is_zero_above_cut_out() {
        let result = offsets_for(&ComprehensiveTaxInput::for_income(dec!(90000)), dec!(19717));

        assert_eq!(result.amount_for(OffsetKind::LowIncome), dec!(0));
        assert_eq!(result.total, dec!(0));
    }

    // =========================================================================
    // cap tests
    // =========================================================================

    #[test]
    fn applied_is_capped_at_gross_tax() {
        let result = offsets_for(&ComprehensiveTaxInput::for_income(dec!(20000)), dec!(342));

        assert_eq!(result.total, dec!(700));
        assert_eq!(result.applied, dec!(342));
        assert!(result.capped);
    }

    #[test]
    fn nothing_applied_without_tax() {
        let result = offsets_for(&ComprehensiveTaxInput::for_income(dec!(0)), dec!(0));

        assert_eq!(result.applied, dec!(0));
    }

    // =========================================================================
    // senior offset tests
    // =========================================================================

    #[test]
    fn single_senior_receives_sapto() {
        let input = ComprehensiveTaxInput {
            age: 68,
            ..ComprehensiveTaxInput::for_income(dec!(30000))
        };

        let result = offsets_for(&input, dec!(2242));

        assert_eq!(result.amount_for(OffsetKind::SeniorSingle), dec!(2230));
        assert_eq!(result.total, dec!(2930));
        assert_eq!(result.applied, dec!(2242));
    }

    #[test]
    fn couple_senior_offset_uses_combined_income() {
        let input = ComprehensiveTaxInput {
            age: 70,
            family_status: FamilyStatus::Family,
            spouse_income: Some(dec!(40000)),
            ..ComprehensiveTaxInput::for_income(dec!(30000))
        };

        let result = offsets_for(&input, dec!(2242));

        // 1,602 - 0.0625 * (70,000 - 61,988)
        assert_eq!(result.amount_for(OffsetKind::SeniorCouple), dec!(1101.25));
    }

    #[test]
    fn pensioner_below_age_receives_sapto() {
        let input = ComprehensiveTaxInput {
            age: 60,
            is_pensioner: true,
            ..ComprehensiveTaxInput::for_income(dec!(40000))
        };

        let result = offsets_for(&input, dec!(4142));

        // 2,230 - 0.125 * (40,000 - 34,919)
        assert_eq!(result.amount_for(OffsetKind::SeniorSingle), dec!(1594.88));
    }

    #[test]
    fn non_senior_has_no_sapto_line() {
        let result = offsets_for(&ComprehensiveTaxInput::for_income(dec!(30000)), dec!(2242));

        assert!(result.lines.iter().all(|l| l.kind != OffsetKind::SeniorSingle));
    }

    #[test]
    fn foreign_residents_get_no_lito_or_sapto() {
        let input = ComprehensiveTaxInput {
            age: 70,
            residency: Residency::ForeignResident,
            ..ComprehensiveTaxInput::for_income(dec!(30000))
        };

        let result = offsets_for(&input, dec!(9750));

        assert!(result.lines.is_empty());
    }

    // =========================================================================
    // medical expense and rebate tests
    // =========================================================================

    #[test]
    fn medical_expenses_over_threshold() {
        let input = ComprehensiveTaxInput {
            medical_expenses: dec!(5083),
            ..ComprehensiveTaxInput::for_income(dec!(90000))
        };

        let result = offsets_for(&input, dec!(19717));

        assert_eq!(result.amount_for(OffsetKind::MedicalExpenses), dec!(500.00));
    }

    #[test]
    fn medical_expenses_under_threshold_give_nothing() {
        let input = ComprehensiveTaxInput {
            medical_expenses: dec!(1000),
            ..ComprehensiveTaxInput::for_income(dec!(90000))
        };

        let result = offsets_for(&input, dec!(19717));

        assert_eq!(result.amount_for(OffsetKind::MedicalExpenses), dec!(0));
    }

    #[test]
    fn rebate_uses_base_tier_percentage() {
        let input = ComprehensiveTaxInput {
            private_health: cover(dec!(2000)),
            ..ComprehensiveTaxInput::for_income(dec!(90000))
        };

        let result = offsets_for(&input, dec!(19717));

        assert_eq!(
            result.amount_for(OffsetKind::PrivateHealthRebate),
            dec!(492.16)
        );
    }

    #[test]
    fn rebate_percentage_falls_with_income() {
        let low = ComprehensiveTaxInput {
            private_health: cover(dec!(2000)),
            ..ComprehensiveTaxInput::for_income(dec!(90000))
        };
        let high = ComprehensiveTaxInput {
            private_health: cover(dec!(2000)),
            ..ComprehensiveTaxInput::for_income(dec!(140000))
        };

        let low_rebate = offsets_for(&low, dec!(19717)).amount_for(OffsetKind::PrivateHealthRebate);
        let high_rebate =
            offsets_for(&high, dec!(37867)).amount_for(OffsetKind::PrivateHealthRebate);

        assert!(high_rebate < low_rebate);
        assert_eq!(high_rebate, dec!(164.04));
    }

    #[test]
    fn rebate_is_zero_above_top_tier() {
        let input = ComprehensiveTaxInput {
            private_health: cover(dec!(2000)),
            ..ComprehensiveTaxInput::for_income(dec!(200000))
        };

        let result = offsets_for(&input, dec!(60667));

        assert_eq!(result.amount_for(OffsetKind::PrivateHealthRebate), dec!(0));
    }

    #[test]
    fn negative_premium_is_rejected() {
        let rates = TaxYearRates::fy2024_25();
        let input = ComprehensiveTaxInput {
            private_health: cover(dec!(-1)),
            ..ComprehensiveTaxInput::for_income(dec!(50000))
        };

        let result = OffsetsCalculator::new(&rates).calculate(&input, dec!(6717));

        assert_eq!(
            result,
            Err(TaxError::InvalidAmount {
                field: "annual_premium",
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn negative_medical_expenses_are_rejected() {
        let rates = TaxYearRates::fy2024_25();
        let input = ComprehensiveTaxInput {
            medical_expenses: dec!(-10),
            ..ComprehensiveTaxInput::for_income(dec!(50000))
        };

        let result = OffsetsCalculator::new(&rates).calculate(&input, dec!(6717));

        assert!(matches!(
            result,
            Err(TaxError::InvalidAmount {
                field: "medical_expenses",
                ..
            })
        ));
    }
}
