//! Helpers shared by the calculators: cent rounding, clamping and
//! compounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly half a cent are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use au_tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value`, or zero if it is negative.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use au_tax_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative(dec!(12.50)), dec!(12.50));
/// assert_eq!(non_negative(dec!(-3.00)), dec!(0));
/// ```
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Longest horizon, in years, the projections compound over.
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// `(1 + rate)^years`, by repeated multiplication.
///
/// Returns `None` if the factor does not fit in a [`Decimal`].
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use au_tax_core::calculations::common::growth_factor;
///
/// assert_eq!(growth_factor(dec!(0.10), 2), Some(dec!(1.2100)));
/// assert_eq!(growth_factor(dec!(0.05), 0), Some(dec!(1)));
/// assert_eq!(growth_factor(dec!(0.50), 200), None);
/// ```
pub fn growth_factor(
    rate: Decimal,
    years: u32,
) -> Option<Decimal> {
    let step = Decimal::ONE.checked_add(rate)?;
    (0..years).try_fold(Decimal::ONE, |acc, _| acc.checked_mul(step))
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn ratio_or_zero(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}
