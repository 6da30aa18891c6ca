//! Built-in tables for the 2024-25 financial year.

use rust_decimal_macros::dec;

use super::{
    MedicalExpenseRule, MedicareLevyRates, MedicareSurchargeRates, OffsetRates,
    PrivateHealthRebateTier, RiskProfileReturns, SpouseContributionOffsetRule,
    SuperannuationRates, TaxYearRates, states,
};
use crate::models::{
    ContributionCap, FinancialYear, OffsetKind, OffsetRule, SurchargeTier, TaperStep, TaxBracket,
    TaxSchedule, ThresholdSet,
};

impl TaxYearRates {
    /// Tables for FY 2024-25.
    ///
    /// The resident schedule is the 19% / 32.5% / 37% / 45% table (tax of
    /// $5,092 at $45,000). Load an override file to evaluate a different
    /// schedule for the same year.
    pub fn fy2024_25() -> Self {
        Self {
            financial_year: FinancialYear(2025),
            tax_free_threshold: dec!(18200),
            resident_schedule: resident_schedule(),
            foreign_resident_schedule: foreign_resident_schedule(),
            medicare_levy: medicare_levy(),
            medicare_surcharge: medicare_surcharge(),
            offsets: offsets(),
            superannuation: superannuation(),
            jurisdictions: states::fy2024_25(),
        }
    }
}

fn resident_schedule() -> TaxSchedule {
    TaxSchedule::new_unchecked(vec![
        TaxBracket::new(dec!(0), Some(dec!(18200)), dec!(0), dec!(0)),
        TaxBracket::new(dec!(18201), Some(dec!(45000)), dec!(0.19), dec!(0)),
        TaxBracket::new(dec!(45001), Some(dec!(120000)), dec!(0.325), dec!(5092)),
        TaxBracket::new(dec!(120001), Some(dec!(180000)), dec!(0.37), dec!(29467)),
        TaxBracket::new(dec!(180001), None, dec!(0.45), dec!(51667)),
    ])
}

fn foreign_resident_schedule() -> TaxSchedule {
    TaxSchedule::new_unchecked(vec![
        TaxBracket::new(dec!(0), Some(dec!(120000)), dec!(0.325), dec!(0)),
        TaxBracket::new(dec!(120001), Some(dec!(180000)), dec!(0.37), dec!(39000)),
        TaxBracket::new(dec!(180001), None, dec!(0.45), dec!(61200)),
    ])
}

fn medicare_levy() -> MedicareLevyRates {
    MedicareLevyRates {
        rate: dec!(0.02),
        phase_in_band: dec!(0.10),
        thresholds: ThresholdSet {
            single: dec!(27222),
            family: dec!(45907),
            senior_single: dec!(43020),
            senior_family: dec!(59886),
            per_dependent: dec!(4216),
        },
    }
}

fn medicare_surcharge() -> MedicareSurchargeRates {
    MedicareSurchargeRates {
        single_tiers: vec![
            SurchargeTier::new("base", dec!(0), Some(dec!(97000)), dec!(0)),
            SurchargeTier::new("tier 1", dec!(97001), Some(dec!(113000)), dec!(0.01)),
            SurchargeTier::new("tier 2", dec!(113001), Some(dec!(151000)), dec!(0.0125)),
            SurchargeTier::new("tier 3", dec!(151001), None, dec!(0.015)),
        ],
        family_tiers: vec![
            SurchargeTier::new("base", dec!(0), Some(dec!(194000)), dec!(0)),
            SurchargeTier::new("tier 1", dec!(194001), Some(dec!(226000)), dec!(0.01)),
            SurchargeTier::new("tier 2", dec!(226001), Some(dec!(302000)), dec!(0.0125)),
            SurchargeTier::new("tier 3", dec!(302001), None, dec!(0.015)),
        ],
        dependent_child_increment: dec!(1500),
    }
}

fn offsets() -> OffsetRates {
    OffsetRates {
        low_income: OffsetRule {
            kind: OffsetKind::LowIncome,
            max_amount: dec!(700),
            phase_out_start: dec!(37500),
            phase_out_end: dec!(66667),
            phase_out_rate: dec!(0.05),
            second_taper: Some(TaperStep {
                start: dec!(45000),
                rate: dec!(0.015),
            }),
        },
        senior_single: OffsetRule {
            kind: OffsetKind::SeniorSingle,
            max_amount: dec!(2230),
            phase_out_start: dec!(34919),
            phase_out_end: dec!(52759),
            phase_out_rate: dec!(0.125),
            second_taper: None,
        },
        // Combined-income form of the per-person couple rule: each partner
        // loses 12.5c per dollar of their half over $30,994.
        senior_couple: OffsetRule {
            kind: OffsetKind::SeniorCouple,
            max_amount: dec!(1602),
            phase_out_start: dec!(61988),
            phase_out_end: dec!(87620),
            phase_out_rate: dec!(0.0625),
            second_taper: None,
        },
        senior_eligibility_age: 67,
        medical_expenses: MedicalExpenseRule {
            threshold: dec!(2583),
            rate: dec!(0.20),
        },
        private_health_rebate: vec![
            PrivateHealthRebateTier {
                name: "base".to_string(),
                single_upper: Some(dec!(97000)),
                family_upper: Some(dec!(194000)),
                under_65: dec!(0.24608),
                age_65_to_69: dec!(0.28710),
                age_70_plus: dec!(0.32812),
            },
            PrivateHealthRebateTier {
                name: "tier 1".to_string(),
                single_upper: Some(dec!(113000)),
                family_upper: Some(dec!(226000)),
                under_65: dec!(0.16405),
                age_65_to_69: dec!(0.20507),
                age_70_plus: dec!(0.24608),
            },
            PrivateHealthRebateTier {
                name: "tier 2".to_string(),
                single_upper: Some(dec!(151000)),
                family_upper: Some(dec!(302000)),
                under_65: dec!(0.08202),
                age_65_to_69: dec!(0.12303),
                age_70_plus: dec!(0.16405),
            },
            PrivateHealthRebateTier {
                name: "tier 3".to_string(),
                single_upper: None,
                family_upper: None,
                under_65: dec!(0),
                age_65_to_69: dec!(0),
                age_70_plus: dec!(0),
            },
        ],
    }
}

fn superannuation() -> SuperannuationRates {
    SuperannuationRates {
        guarantee_rate: dec!(0.115),
        caps: ContributionCap {
            concessional_cap: dec!(30000),
            non_concessional_cap: dec!(120000),
            contributions_tax_rate: dec!(0.15),
        },
        division_293_threshold: dec!(250000),
        division_293_rate: dec!(0.15),
        carry_forward_balance_threshold: dec!(500000),
        carry_forward_years: 5,
        catch_up_age: 50,
        spouse_offset: SpouseContributionOffsetRule {
            max_contribution: dec!(3000),
            rate: dec!(0.18),
            income_threshold: dec!(37000),
            cut_out_income: dec!(40000),
        },
        risk_returns: RiskProfileReturns {
            conservative: dec!(0.045),
            balanced: dec!(0.065),
            growth: dec!(0.075),
            high_growth: dec!(0.085),
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn federal_schedules_pass_validation() {
        let resident = resident_schedule();
        let foreign = foreign_resident_schedule();

        assert_eq!(
            TaxSchedule::new(resident.brackets().to_vec()),
            Ok(resident.clone())
        );
        assert_eq!(
            TaxSchedule::new(foreign.brackets().to_vec()),
            Ok(foreign.clone())
        );
    }

    #[test]
    fn resident_bases_accumulate_from_lower_brackets() {
        let schedule = resident_schedule();

        for pair in schedule.brackets().windows(2) {
            assert_eq!(pair[0].tax_at_upper_bound(), Some(pair[1].base_tax));
        }
    }

    #[test]
    fn tax_free_threshold_matches_schedule() {
        let rates = TaxYearRates::fy2024_25();

        assert_eq!(
            rates.resident_schedule.zero_rate_ceiling(),
            rates.tax_free_threshold
        );
    }
}
