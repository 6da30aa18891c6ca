//! End-to-end checks of the engine against the built-in FY 2024-25 tables.

use au_tax_core::calculations::StateTaxCalculator;
use au_tax_core::{
    BracketCreepInput, ComprehensiveTaxInput, FamilyStatus, FinancialYear, Jurisdiction,
    PrivateHealthCover, PropertyPurchase, RatesOverrides, StateTaxInput, SuperannuationInput,
    TaxEngine, TaxYearRates,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn engine() -> TaxEngine {
    TaxEngine::new(TaxYearRates::fy2024_25())
}

// =============================================================================
// Federal tax
// =============================================================================

#[test]
fn published_schedule_reference_points() {
    let engine = engine();

    let at_threshold = engine
        .calculate(&ComprehensiveTaxInput::for_income(dec!(18200)))
        .unwrap();
    let at_second_bracket_top = engine
        .calculate(&ComprehensiveTaxInput::for_income(dec!(45000)))
        .unwrap();

    assert_eq!(at_threshold.federal.tax_payable, dec!(0));
    assert_eq!(at_second_bracket_top.federal.tax_payable, dec!(5092.00));
}

#[test]
fn stage_three_override_lowers_tax() {
    let overrides =
        RatesOverrides::from_toml_str(include_str!("../rates/fy2024_25_stage3.toml")).unwrap();
    let rates = TaxYearRates::fy2024_25().with_overrides(overrides).unwrap();

    let result = TaxEngine::new(rates)
        .calculate(&ComprehensiveTaxInput::for_income(dec!(45000)))
        .unwrap();

    // 0.16 * (45,000 - 18,200)
    assert_eq!(result.federal.tax_payable, dec!(4288.00));
}

// =============================================================================
// Medicare levy and surcharge
// =============================================================================

#[test]
fn levy_is_zero_at_threshold_and_flat_above_band() {
    let engine = engine();
    let threshold = engine.rates().medicare_levy.thresholds.single;

    let at_threshold = engine
        .calculate(&ComprehensiveTaxInput::for_income(threshold))
        .unwrap();
    let well_above = engine
        .calculate(&ComprehensiveTaxInput::for_income(dec!(120000)))
        .unwrap();

    assert_eq!(at_threshold.medicare_levy.levy, dec!(0));
    assert_eq!(well_above.medicare_levy.levy, dec!(2400.00));
}

#[test]
fn surcharge_depends_on_hospital_cover() {
    let engine = engine();
    let uncovered = ComprehensiveTaxInput::for_income(dec!(200000));
    let covered = ComprehensiveTaxInput {
        private_health: PrivateHealthCover {
            has_hospital_cover: true,
            ..PrivateHealthCover::default()
        },
        ..uncovered.clone()
    };

    let without_cover = engine.calculate(&uncovered).unwrap();
    let with_cover = engine.calculate(&covered).unwrap();

    assert_eq!(without_cover.medicare_surcharge.rate, dec!(0.015));
    assert_eq!(without_cover.medicare_surcharge.surcharge, dec!(3000.00));
    assert_eq!(with_cover.medicare_surcharge.surcharge, dec!(0));
}

// =============================================================================
// Summary
// =============================================================================

#[test]
fn zero_income_pays_nothing_whatever_the_circumstances() {
    let input = ComprehensiveTaxInput {
        age: 70,
        is_pensioner: true,
        family_status: FamilyStatus::Family,
        spouse_income: Some(dec!(0)),
        dependents: 2,
        medical_expenses: dec!(5000),
        private_health: PrivateHealthCover {
            has_hospital_cover: true,
            spouse_has_hospital_cover: true,
            annual_premium: dec!(3000),
        },
        ..ComprehensiveTaxInput::for_income(dec!(0))
    };

    let result = engine().calculate(&input).unwrap();

    assert_eq!(result.federal.tax_payable, dec!(0));
    assert_eq!(result.medicare_levy.levy, dec!(0));
    assert_eq!(result.medicare_surcharge.surcharge, dec!(0));
    assert_eq!(result.offsets.applied, dec!(0));
    assert_eq!(result.summary.net_tax_payable, dec!(0));
    assert_eq!(result.summary.after_tax_income, dec!(0));
}

#[test]
fn deductions_reduce_taxable_but_not_gross_income() {
    let input = ComprehensiveTaxInput {
        gross_income: dec!(95000),
        taxable_income: dec!(85000),
        ..ComprehensiveTaxInput::default()
    };

    let result = engine().calculate(&input).unwrap();

    assert_eq!(result.summary.gross_income, dec!(95000));
    assert_eq!(result.summary.net_tax_payable, dec!(19792.00));
    assert_eq!(result.summary.after_tax_income, dec!(75208.00));
}

#[test]
fn full_household_scenario_runs_every_section() {
    let mut state = StateTaxInput::new(Jurisdiction::Qld);
    state.property = Some(PropertyPurchase {
        value: dec!(650000),
        first_home_buyer: true,
        new_home: true,
    });
    let input = ComprehensiveTaxInput {
        family_status: FamilyStatus::Family,
        spouse_income: Some(dec!(30000)),
        dependents: 1,
        superannuation: Some(SuperannuationInput {
            salary: dec!(110000),
            current_balance: dec!(150000),
            voluntary_concessional: dec!(5000),
            years_to_retirement: 20,
            ..SuperannuationInput::default()
        }),
        bracket_creep: Some(BracketCreepInput {
            years: 5,
            salary_growth_rate: dec!(0.035),
            inflation_rate: dec!(0.025),
            indexation: None,
        }),
        state_tax: Some(state),
        ..ComprehensiveTaxInput::for_income(dec!(110000))
    };

    let result = engine().calculate(&input).unwrap();

    assert_eq!(result.financial_year, FinancialYear(2025));
    assert!(result.superannuation.is_some());
    assert_eq!(result.bracket_creep.map(|b| b.projections.len()), Some(5));
    let state = result.state_tax.unwrap();
    assert_eq!(state.jurisdiction, Jurisdiction::Qld);
    assert_eq!(
        state.stamp_duty.map(|d| d.first_home_grant),
        Some(dec!(30000))
    );
    assert!(result.summary.net_tax_payable > Decimal::ZERO);
}

#[test]
fn results_serialize_for_storage() {
    let result = engine()
        .calculate(&ComprehensiveTaxInput::for_income(dec!(85000)))
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let restored: au_tax_core::ComprehensiveResult = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, result);
}

// =============================================================================
// State tax
// =============================================================================

#[test]
fn nsw_first_home_buyer_concession_band() {
    let rates = TaxYearRates::fy2024_25();
    let nsw = StateTaxCalculator::for_jurisdiction(&rates, Jurisdiction::Nsw).unwrap();
    let duty = |value: Decimal| {
        nsw.stamp_duty(&PropertyPurchase {
            value,
            first_home_buyer: true,
            new_home: false,
        })
        .unwrap()
    };

    let exempt = duty(dec!(750000));
    let low = duty(dec!(850000));
    let high = duty(dec!(950000));

    assert_eq!(exempt.duty_payable, dec!(0));
    assert!(low.duty_payable > Decimal::ZERO && low.duty_payable < low.full_duty);
    assert!(high.duty_payable < high.full_duty);
    assert!(low.duty_payable < high.duty_payable);
}

// =============================================================================
// Bracket creep
// =============================================================================

#[test]
fn creep_accumulates_when_wages_track_prices() {
    let input = ComprehensiveTaxInput {
        bracket_creep: Some(BracketCreepInput {
            years: 10,
            salary_growth_rate: dec!(0.03),
            inflation_rate: dec!(0.03),
            indexation: None,
        }),
        ..ComprehensiveTaxInput::for_income(dec!(60000))
    };

    let creep = engine().calculate(&input).unwrap().bracket_creep.unwrap();

    let cumulative: Vec<_> = creep
        .projections
        .iter()
        .map(|p| p.cumulative_bracket_creep)
        .collect();
    assert!(cumulative[0] > Decimal::ZERO);
    assert!(cumulative.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn oversized_projection_fails_only_its_own_input() {
    let long_creep = ComprehensiveTaxInput {
        bracket_creep: Some(BracketCreepInput {
            years: 3000,
            salary_growth_rate: dec!(0.5),
            inflation_rate: dec!(0.03),
            indexation: None,
        }),
        ..ComprehensiveTaxInput::for_income(dec!(85000))
    };
    let long_retirement = ComprehensiveTaxInput {
        superannuation: Some(SuperannuationInput {
            salary: dec!(85000),
            years_to_retirement: 1000,
            ..SuperannuationInput::default()
        }),
        ..ComprehensiveTaxInput::for_income(dec!(85000))
    };
    let inputs = vec![
        ComprehensiveTaxInput::for_income(dec!(85000)),
        long_creep,
        long_retirement,
    ];

    let results = engine().calculate_batch(&inputs);

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_err());
}
