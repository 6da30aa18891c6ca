use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetKind {
    LowIncome,
    SeniorSingle,
    SeniorCouple,
    MedicalExpenses,
    PrivateHealthRebate,
}

impl OffsetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowIncome => "low income tax offset",
            Self::SeniorSingle => "seniors and pensioners tax offset (single)",
            Self::SeniorCouple => "seniors and pensioners tax offset (couple)",
            Self::MedicalExpenses => "net medical expenses tax offset",
            Self::PrivateHealthRebate => "private health insurance rebate",
        }
    }
}

/// Point past which a phase-out continues at a different rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaperStep {
    pub start: Decimal,
    pub rate: Decimal,
}

/// A linearly phasing-out entitlement.
///
/// The full `max_amount` is paid at or below `phase_out_start`, reduced by
/// `phase_out_rate` per dollar above it (switching to `second_taper.rate`
/// past `second_taper.start`), and nothing at or above `phase_out_end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetRule {
    pub kind: OffsetKind,
    pub max_amount: Decimal,
    pub phase_out_start: Decimal,
    pub phase_out_end: Decimal,
    pub phase_out_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_taper: Option<TaperStep>,
}

impl OffsetRule {
    /// Entitlement at `income`, never negative.
    pub fn entitlement(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.phase_out_start {
            return self.max_amount;
        }
        if income >= self.phase_out_end {
            return Decimal::ZERO;
        }

        let reduction = match &self.second_taper {
            Some(step) if income > step.start => {
                self.phase_out_rate * (step.start - self.phase_out_start)
                    + step.rate * (income - step.start)
            }
            _ => self.phase_out_rate * (income - self.phase_out_start),
        };

        (self.max_amount - reduction).max(Decimal::ZERO)
    }

    pub fn validate(&self) -> Result<(), TaxError> {
        if self.max_amount < Decimal::ZERO {
            return Err(TaxError::configuration(format!(
                "{} maximum must not be negative",
                self.kind.as_str()
            )));
        }
        if self.phase_out_end < self.phase_out_start {
            return Err(TaxError::configuration(format!(
                "{} phase-out ends before it starts",
                self.kind.as_str()
            )));
        }
        if let Some(step) = &self.second_taper {
            if step.start < self.phase_out_start || step.start > self.phase_out_end {
                return Err(TaxError::configuration(format!(
                    "{} second taper starts outside the phase-out range",
                    self.kind.as_str()
                )));
            }
        }
        Ok(())
    }
}
