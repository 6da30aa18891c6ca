use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FamilyStatus;
use crate::error::TaxError;

/// Named income thresholds shared by the levy, surcharge and offset rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub single: Decimal,
    pub family: Decimal,
    pub senior_single: Decimal,
    pub senior_family: Decimal,
    /// Added to the family threshold for each dependent.
    pub per_dependent: Decimal,
}

impl ThresholdSet {
    /// Picks the threshold for a household.
    ///
    /// Family thresholds (senior or not) are raised by `per_dependent` for
    /// each dependent; single thresholds are not.
    pub fn select(
        &self,
        family_status: FamilyStatus,
        senior: bool,
        dependents: u32,
    ) -> Decimal {
        match (family_status, senior) {
            (FamilyStatus::Single, false) => self.single,
            (FamilyStatus::Single, true) => self.senior_single,
            (FamilyStatus::Family, false) => {
                self.family + self.per_dependent * Decimal::from(dependents)
            }
            (FamilyStatus::Family, true) => {
                self.senior_family + self.per_dependent * Decimal::from(dependents)
            }
        }
    }
}

/// One income tier of the Medicare levy surcharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeTier {
    pub name: String,
    pub lower_bound: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl SurchargeTier {
    pub fn new(
        name: &str,
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            name: name.to_string(),
            lower_bound,
            upper_bound,
            rate,
        }
    }

    /// A copy with both cut points raised by `increment`.
    ///
    /// The base tier keeps its zero lower bound.
    pub fn raised_by(
        &self,
        increment: Decimal,
    ) -> Self {
        let lower_bound = if self.lower_bound.is_zero() {
            Decimal::ZERO
        } else {
            self.lower_bound + increment
        };
        Self {
            name: self.name.clone(),
            lower_bound,
            upper_bound: self.upper_bound.map(|u| u + increment),
            rate: self.rate,
        }
    }
}

/// Checks that surcharge tiers are ordered, contiguous and end open-ended.
pub fn validate_tiers(
    label: &str,
    tiers: &[SurchargeTier],
) -> Result<(), TaxError> {
    let first = tiers
        .first()
        .ok_or_else(|| TaxError::configuration(format!("{label} surcharge tiers are empty")))?;
    if !first.lower_bound.is_zero() {
        return Err(TaxError::configuration(format!(
            "{label} surcharge tiers must start at 0"
        )));
    }
    if tiers.last().is_some_and(|t| t.upper_bound.is_some()) {
        return Err(TaxError::configuration(format!(
            "{label} surcharge top tier must be open-ended"
        )));
    }
    for pair in tiers.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let Some(prev_upper) = prev.upper_bound else {
            return Err(TaxError::configuration(format!(
                "{label} surcharge tier '{}' is open-ended but not last",
                prev.name
            )));
        };
        if next.lower_bound != prev_upper + Decimal::ONE || next.rate < prev.rate {
            return Err(TaxError::configuration(format!(
                "{label} surcharge tier '{}' does not follow '{}'",
                next.name, prev.name
            )));
        }
    }
    Ok(())
}
