use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Jurisdiction;

/// Errors raised by the calculators.
///
/// Every calculator validates its own inputs on entry. Clamped results
/// (an offset that phases out to nothing, a rebate that floors at zero) are
/// never reported here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    /// A monetary input that must be non-negative was negative.
    #[error("invalid amount for {field}: {value} (must not be negative)")]
    InvalidAmount { field: &'static str, value: Decimal },

    /// A projection input is beyond what the calculators can compound.
    #[error("{field} of {value} is out of range (at most {max})")]
    OutOfRange {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    /// A rate table or threshold set is malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// State tax was requested for a jurisdiction with no configured rules.
    #[error("no state tax rules configured for {0}")]
    UnsupportedJurisdiction(Jurisdiction),
}

impl TaxError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Fails with [`TaxError::InvalidAmount`] when `value` is negative.
pub(crate) fn ensure_non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, TaxError> {
    if value < Decimal::ZERO {
        return Err(TaxError::InvalidAmount { field, value });
    }
    Ok(value)
}

/// Fails with [`TaxError::OutOfRange`] when `years` exceeds `max`.
pub(crate) fn ensure_horizon(
    field: &'static str,
    years: u32,
    max: u32,
) -> Result<u32, TaxError> {
    if years > max {
        return Err(TaxError::OutOfRange {
            field,
            value: Decimal::from(years),
            max: Decimal::from(max),
        });
    }
    Ok(years)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn ensure_non_negative_accepts_zero() {
        assert_eq!(ensure_non_negative("income", dec!(0)), Ok(dec!(0)));
    }

    #[test]
    fn ensure_non_negative_rejects_negative() {
        let result = ensure_non_negative("income", dec!(-0.01));

        assert_eq!(
            result,
            Err(TaxError::InvalidAmount {
                field: "income",
                value: dec!(-0.01),
            })
        );
    }

    #[test]
    fn ensure_horizon_accepts_the_limit() {
        assert_eq!(ensure_horizon("years", 100, 100), Ok(100));
    }

    #[test]
    fn ensure_horizon_rejects_longer_projections() {
        let err = ensure_horizon("years", 3000, 100).unwrap_err();

        assert_eq!(err.to_string(), "years of 3000 is out of range (at most 100)");
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = TaxError::UnsupportedJurisdiction(Jurisdiction::Tas);

        assert_eq!(err.to_string(), "no state tax rules configured for TAS");
    }
}
