use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// One row of a progressive rate table.
///
/// Bounds are whole dollars and inclusive (`18_201..=45_000`). `base_tax` is
/// the amount owed at the bottom of the bracket; the rate applies to every
/// dollar over [`TaxBracket::threshold`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub base_tax: Decimal,
}

impl TaxBracket {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
        base_tax: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
            base_tax,
        }
    }

    /// The amount the rate applies *over*.
    ///
    /// Published schedules read "19c for each $1 over $18,200" for the
    /// bracket stored as `18_201..=45_000`, so the slice is measured from the
    /// previous bracket's upper bound rather than from `lower_bound`.
    pub fn threshold(&self) -> Decimal {
        if self.lower_bound > Decimal::ZERO {
            self.lower_bound - Decimal::ONE
        } else {
            Decimal::ZERO
        }
    }

    /// Whether `amount` falls at or below this bracket's upper bound.
    pub fn covers(
        &self,
        amount: Decimal,
    ) -> bool {
        self.upper_bound.is_none_or(|upper| amount <= upper)
    }

    /// Tax owed at the top of this bracket, if it has one.
    pub fn tax_at_upper_bound(&self) -> Option<Decimal> {
        self.upper_bound
            .map(|upper| self.base_tax + (upper - self.threshold()) * self.rate)
    }
}

/// A validated, ordered bracket table.
///
/// Construction checks the table invariants, so holding a `TaxSchedule`
/// means the table is ascending, contiguous, starts at zero and ends with a
/// single open-ended bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleTable", into = "ScheduleTable")]
pub struct TaxSchedule {
    brackets: Vec<TaxBracket>,
}

#[derive(Serialize, Deserialize)]
struct ScheduleTable {
    brackets: Vec<TaxBracket>,
}

impl TryFrom<ScheduleTable> for TaxSchedule {
    type Error = TaxError;

    fn try_from(table: ScheduleTable) -> Result<Self, Self::Error> {
        Self::new(table.brackets)
    }
}

impl From<TaxSchedule> for ScheduleTable {
    fn from(schedule: TaxSchedule) -> Self {
        Self {
            brackets: schedule.brackets,
        }
    }
}

impl TaxSchedule {
    /// Validates and wraps a bracket table.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] if the table is empty, does not
    /// start at zero, has gaps or overlaps, has fractional bounds, has more
    /// or fewer than one open-ended bracket, or has decreasing rates or
    /// base amounts.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, TaxError> {
        validate_brackets(&brackets)?;
        Ok(Self { brackets })
    }

    /// Wraps a compiled-in table without validating it. The built-in tables
    /// are checked by the rates tests.
    pub(crate) fn new_unchecked(brackets: Vec<TaxBracket>) -> Self {
        Self { brackets }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Index of the bracket containing `amount`.
    ///
    /// Amounts between two whole-dollar bounds (45,000.50) belong to the
    /// upper bracket.
    pub fn locate(
        &self,
        amount: Decimal,
    ) -> usize {
        self.brackets
            .iter()
            .position(|b| b.covers(amount))
            .unwrap_or(self.brackets.len() - 1)
    }

    /// Upper bound of the leading nil-rate brackets: the amount that can be
    /// earned before any tax is owed.
    pub fn zero_rate_ceiling(&self) -> Decimal {
        self.brackets
            .iter()
            .take_while(|b| b.rate.is_zero() && b.base_tax.is_zero())
            .filter_map(|b| b.upper_bound)
            .last()
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns a copy with every threshold scaled by `factor`.
    ///
    /// Thresholds are rounded to whole dollars and bounds rebuilt so the
    /// table stays contiguous. Base amounts are recomputed from the scaled
    /// widths; any step at a threshold (a base higher than the previous
    /// bracket accumulates to) is scaled and carried over.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] if `factor` is not positive, or if
    /// scaling overflows or collapses two thresholds into one.
    pub fn indexed(
        &self,
        factor: Decimal,
    ) -> Result<Self, TaxError> {
        if factor <= Decimal::ZERO {
            return Err(TaxError::configuration(format!(
                "indexation factor must be positive, got {factor}"
            )));
        }

        let scale = |amount: Decimal| {
            amount.checked_mul(factor).ok_or_else(|| {
                TaxError::configuration(format!(
                    "indexation factor {factor} overflows the bracket table"
                ))
            })
        };

        let mut scaled: Vec<TaxBracket> = Vec::with_capacity(self.brackets.len());
        for (i, bracket) in self.brackets.iter().enumerate() {
            let upper_bound = bracket
                .upper_bound
                .map(|u| scale(u).map(|v| v.round()))
                .transpose()?;

            let (lower_bound, base_tax) = match (i.checked_sub(1), scaled.last()) {
                (Some(prev_idx), Some(prev_scaled)) => {
                    let prev = &self.brackets[prev_idx];
                    let step = bracket.base_tax - prev.tax_at_upper_bound().unwrap_or_default();
                    let prev_scaled_top = prev_scaled.tax_at_upper_bound().unwrap_or_default();
                    let lower = prev_scaled.upper_bound.unwrap_or_default() + Decimal::ONE;
                    (lower, prev_scaled_top + scale(step)?)
                }
                _ => (Decimal::ZERO, scale(bracket.base_tax)?),
            };

            scaled.push(TaxBracket::new(
                lower_bound,
                upper_bound,
                bracket.rate,
                base_tax,
            ));
        }

        Self::new(scaled)
    }
}

fn validate_brackets(brackets: &[TaxBracket]) -> Result<(), TaxError> {
    let first = brackets
        .first()
        .ok_or_else(|| TaxError::configuration("bracket table is empty"))?;

    if !first.lower_bound.is_zero() {
        return Err(TaxError::configuration(format!(
            "first bracket must start at 0, starts at {}",
            first.lower_bound
        )));
    }

    let last_index = brackets.len() - 1;
    for (i, bracket) in brackets.iter().enumerate() {
        if !bracket.lower_bound.fract().is_zero() {
            return Err(TaxError::configuration(format!(
                "bracket {i} lower bound {} is not a whole dollar amount",
                bracket.lower_bound
            )));
        }
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(TaxError::configuration(format!(
                "bracket {i} rate {} is outside 0..=1",
                bracket.rate
            )));
        }
        if bracket.base_tax < Decimal::ZERO {
            return Err(TaxError::configuration(format!(
                "bracket {i} base tax {} is negative",
                bracket.base_tax
            )));
        }

        match (bracket.upper_bound, i == last_index) {
            (None, true) => {}
            (None, false) => {
                return Err(TaxError::configuration(format!(
                    "bracket {i} is open-ended but is not the last bracket"
                )));
            }
            (Some(upper), true) => {
                return Err(TaxError::configuration(format!(
                    "last bracket must be open-ended, ends at {upper}"
                )));
            }
            (Some(upper), false) => {
                if !upper.fract().is_zero() {
                    return Err(TaxError::configuration(format!(
                        "bracket {i} upper bound {upper} is not a whole dollar amount"
                    )));
                }
                if upper < bracket.lower_bound {
                    return Err(TaxError::configuration(format!(
                        "bracket {i} upper bound {upper} is below its lower bound {}",
                        bracket.lower_bound
                    )));
                }
            }
        }
    }

    for (i, pair) in brackets.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        let expected_lower = prev.upper_bound.unwrap_or_default() + Decimal::ONE;
        if next.lower_bound != expected_lower {
            return Err(TaxError::configuration(format!(
                "bracket {} starts at {} but bracket {i} ends at {}; expected {expected_lower}",
                i + 1,
                next.lower_bound,
                prev.upper_bound.unwrap_or_default(),
            )));
        }
        if next.rate < prev.rate {
            return Err(TaxError::configuration(format!(
                "bracket {} rate {} is lower than bracket {i} rate {}",
                i + 1,
                next.rate,
                prev.rate
            )));
        }
        if next.base_tax < prev.base_tax {
            return Err(TaxError::configuration(format!(
                "bracket {} base tax {} is lower than bracket {i} base tax {}",
                i + 1,
                next.base_tax,
                prev.base_tax
            )));
        }
    }

    Ok(())
}
