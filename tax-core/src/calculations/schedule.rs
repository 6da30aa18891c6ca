//! Progressive schedule evaluation.
//!
//! Every bracket table in the crate (income tax, transfer duty, land tax) is
//! evaluated the same way: find the bracket containing the amount and add
//! its marginal slice to the bracket's base amount.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use au_tax_core::TaxYearRates;
//! use au_tax_core::calculations::evaluate_schedule;
//!
//! let rates = TaxYearRates::fy2024_25();
//! let evaluation = evaluate_schedule(&rates.resident_schedule, dec!(45000)).unwrap();
//!
//! assert_eq!(evaluation.total, dec!(5092));
//! assert_eq!(evaluation.marginal_rate, dec!(0.19));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{TaxError, ensure_non_negative};
use crate::models::TaxSchedule;

/// The part of an amount that fell in one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub lower_bound: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub taxable_in_bracket: Decimal,
    pub tax_in_bracket: Decimal,
}

/// Result of evaluating a schedule. `total` is not rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvaluation {
    pub amount: Decimal,
    pub total: Decimal,
    pub marginal_rate: Decimal,
    pub bracket_index: usize,
    /// One slice per bracket up to and including the one holding `amount`.
    /// The slices sum to `total`.
    pub slices: Vec<BracketSlice>,
}

/// Evaluates `schedule` at `amount`.
///
/// # Errors
///
/// Returns [`TaxError::InvalidAmount`] if `amount` is negative.
pub fn evaluate_schedule(
    schedule: &TaxSchedule,
    amount: Decimal,
) -> Result<ScheduleEvaluation, TaxError> {
    let amount = ensure_non_negative("amount", amount)?;
    let brackets = schedule.brackets();
    let index = schedule.locate(amount);
    let located = &brackets[index];

    let marginal = (amount - located.threshold()) * located.rate;
    let total = located.base_tax + marginal;

    let mut slices = Vec::with_capacity(index + 1);
    for (j, bracket) in brackets[..index].iter().enumerate() {
        let upper = bracket.upper_bound.unwrap_or(bracket.lower_bound);
        let previous_base = if j == 0 { Decimal::ZERO } else { bracket.base_tax };
        slices.push(BracketSlice {
            lower_bound: bracket.lower_bound,
            upper_bound: bracket.upper_bound,
            rate: bracket.rate,
            taxable_in_bracket: upper - bracket.threshold(),
            tax_in_bracket: brackets[j + 1].base_tax - previous_base,
        });
    }
    slices.push(BracketSlice {
        lower_bound: located.lower_bound,
        upper_bound: located.upper_bound,
        rate: located.rate,
        taxable_in_bracket: amount - located.threshold(),
        tax_in_bracket: if index == 0 {
            located.base_tax + marginal
        } else {
            marginal
        },
    });

    Ok(ScheduleEvaluation {
        amount,
        total,
        marginal_rate: located.rate,
        bracket_index: index,
        slices,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::TaxBracket;
    use crate::rates::TaxYearRates;

    fn resident() -> TaxSchedule {
        TaxYearRates::fy2024_25().resident_schedule
    }

    fn slice_total(evaluation: &ScheduleEvaluation) -> Decimal {
        evaluation.slices.iter().map(|s| s.tax_in_bracket).sum()
    }

    // =========================================================================
    // evaluate_schedule tests
    // =========================================================================

    #[test]
    fn nothing_owed_at_tax_free_threshold() {
        let evaluation = evaluate_schedule(&resident(), dec!(18200)).unwrap();

        assert_eq!(evaluation.total, dec!(0));
        assert_eq!(evaluation.marginal_rate, dec!(0));
        assert_eq!(evaluation.bracket_index, 0);
    }

    #[test]
    fn top_of_second_bracket_matches_published_base() {
        let evaluation = evaluate_schedule(&resident(), dec!(45000)).unwrap();

        assert_eq!(evaluation.total, dec!(5092));
        assert_eq!(evaluation.bracket_index, 1);
    }

    #[test]
    fn first_dollar_of_bracket_is_taxed_at_new_rate() {
        let evaluation = evaluate_schedule(&resident(), dec!(45001)).unwrap();

        assert_eq!(evaluation.total, dec!(5092.325));
        assert_eq!(evaluation.marginal_rate, dec!(0.325));
    }

    #[test]
    fn cents_between_bounds_belong_to_upper_bracket() {
        let evaluation = evaluate_schedule(&resident(), dec!(45000.50)).unwrap();

        assert_eq!(evaluation.bracket_index, 2);
        assert_eq!(evaluation.total, dec!(5092.1625));
    }

    #[test]
    fn open_ended_bracket_applies_above_last_threshold() {
        let evaluation = evaluate_schedule(&resident(), dec!(200000)).unwrap();

        // 51,667 + 0.45 * 20,000
        assert_eq!(evaluation.total, dec!(60667));
        assert_eq!(evaluation.marginal_rate, dec!(0.45));
    }

    #[test]
    fn zero_amount_owes_nothing() {
        let evaluation = evaluate_schedule(&resident(), dec!(0)).unwrap();

        assert_eq!(evaluation.total, dec!(0));
        assert_eq!(evaluation.slices.len(), 1);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let result = evaluate_schedule(&resident(), dec!(-1));

        assert_eq!(
            result,
            Err(TaxError::InvalidAmount {
                field: "amount",
                value: dec!(-1),
            })
        );
    }

    // =========================================================================
    // breakdown tests
    // =========================================================================

    #[test]
    fn slices_cover_every_bracket_up_to_located() {
        let evaluation = evaluate_schedule(&resident(), dec!(85000)).unwrap();

        let taxable: Vec<_> = evaluation
            .slices
            .iter()
            .map(|s| s.taxable_in_bracket)
            .collect();
        assert_eq!(
            taxable,
            vec![dec!(18200), dec!(26800), dec!(40000)]
        );
        assert_eq!(evaluation.slices[1].tax_in_bracket, dec!(5092));
        assert_eq!(evaluation.slices[2].tax_in_bracket, dec!(13000));
    }

    #[test]
    fn slices_sum_to_total() {
        for amount in [dec!(0), dec!(30000), dec!(120000), dec!(250000.75)] {
            let evaluation = evaluate_schedule(&resident(), amount).unwrap();

            assert_eq!(slice_total(&evaluation), evaluation.total);
        }
    }

    #[test]
    fn slices_sum_to_total_across_threshold_jump() {
        let schedule = TaxSchedule::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(49999)), dec!(0), dec!(0)),
            TaxBracket::new(dec!(50000), Some(dec!(99999)), dec!(0), dec!(500)),
            TaxBracket::new(dec!(100000), None, dec!(0.002), dec!(975)),
        ])
        .unwrap();

        let evaluation = evaluate_schedule(&schedule, dec!(150000)).unwrap();

        // 975 + 0.002 * 50,001
        assert_eq!(evaluation.total, dec!(1075.002));
        assert_eq!(slice_total(&evaluation), evaluation.total);
    }

    #[test]
    fn base_of_first_bracket_is_kept_when_amount_falls_in_it() {
        let schedule = TaxSchedule::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0.01), dec!(20)),
            TaxBracket::new(dec!(1001), None, dec!(0.02), dec!(30)),
        ])
        .unwrap();

        let evaluation = evaluate_schedule(&schedule, dec!(500)).unwrap();

        assert_eq!(evaluation.total, dec!(25));
        assert_eq!(slice_total(&evaluation), dec!(25));
    }
}
