//! Rate and threshold tables for a financial year.
//!
//! Tables are plain configuration values. Built-in tables are compiled in
//! ([`TaxYearRates::fy2024_25`]); callers can load complete tables or
//! partial overrides from TOML. Every table is validated before use.

mod fy2024_25;
mod overrides;
mod states;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::TaxError;
use crate::models::{
    ContributionCap, FamilyStatus, FinancialYear, Jurisdiction, JurisdictionTaxRules, OffsetRule,
    Residency, RiskProfile, SurchargeTier, TaxSchedule, ThresholdSet, validate_tiers,
};

pub use overrides::RatesOverrides;

/// Errors raised while loading rate tables.
#[derive(Debug, Error)]
pub enum RatesError {
    #[error("failed to parse rates: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read rates file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no built-in rates for financial year {0}")]
    UnsupportedYear(FinancialYear),

    #[error(transparent)]
    Invalid(#[from] TaxError),
}

/// Section present in complete rates tables and absent from overrides.
const FULL_TABLE_KEY: &str = "medicare_levy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicareLevyRates {
    pub rate: Decimal,
    /// Width of the phase-in band as a fraction of the threshold.
    pub phase_in_band: Decimal,
    pub thresholds: ThresholdSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicareSurchargeRates {
    pub single_tiers: Vec<SurchargeTier>,
    pub family_tiers: Vec<SurchargeTier>,
    /// Added to family cut points for each dependent child after the first.
    pub dependent_child_increment: Decimal,
}

impl MedicareSurchargeRates {
    /// Tier table for a household, with family cut points raised for
    /// dependent children.
    pub fn tiers_for(
        &self,
        family_status: FamilyStatus,
        dependents: u32,
    ) -> Vec<SurchargeTier> {
        match family_status {
            FamilyStatus::Single => self.single_tiers.clone(),
            FamilyStatus::Family => {
                let increment = self.family_increment(dependents);
                self.family_tiers
                    .iter()
                    .map(|t| t.raised_by(increment))
                    .collect()
            }
        }
    }

    pub fn family_increment(
        &self,
        dependents: u32,
    ) -> Decimal {
        self.dependent_child_increment * Decimal::from(dependents.saturating_sub(1))
    }
}

/// Private health insurance rebate tier.
///
/// Percentages by age band; cut points by household type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateHealthRebateTier {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_upper: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_upper: Option<Decimal>,
    pub under_65: Decimal,
    pub age_65_to_69: Decimal,
    pub age_70_plus: Decimal,
}

impl PrivateHealthRebateTier {
    pub fn percentage_for_age(
        &self,
        age: u32,
    ) -> Decimal {
        match age {
            0..=64 => self.under_65,
            65..=69 => self.age_65_to_69,
            _ => self.age_70_plus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalExpenseRule {
    pub threshold: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetRates {
    pub low_income: OffsetRule,
    pub senior_single: OffsetRule,
    /// Tested against the couple's combined income.
    pub senior_couple: OffsetRule,
    pub senior_eligibility_age: u32,
    pub medical_expenses: MedicalExpenseRule,
    pub private_health_rebate: Vec<PrivateHealthRebateTier>,
}

impl OffsetRates {
    /// Whether the senior thresholds and SAPTO apply.
    pub fn is_senior(
        &self,
        age: u32,
        is_pensioner: bool,
    ) -> bool {
        is_pensioner || age >= self.senior_eligibility_age
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseContributionOffsetRule {
    pub max_contribution: Decimal,
    pub rate: Decimal,
    /// Spouse income at or below which the full contribution counts.
    pub income_threshold: Decimal,
    /// Spouse income at or above which nothing counts.
    pub cut_out_income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfileReturns {
    pub conservative: Decimal,
    pub balanced: Decimal,
    pub growth: Decimal,
    pub high_growth: Decimal,
}

impl RiskProfileReturns {
    pub fn rate_for(
        &self,
        profile: RiskProfile,
    ) -> Decimal {
        match profile {
            RiskProfile::Conservative => self.conservative,
            RiskProfile::Balanced => self.balanced,
            RiskProfile::Growth => self.growth,
            RiskProfile::HighGrowth => self.high_growth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperannuationRates {
    /// Superannuation guarantee rate paid by employers.
    pub guarantee_rate: Decimal,
    pub caps: ContributionCap,
    pub division_293_threshold: Decimal,
    pub division_293_rate: Decimal,
    /// Total super balance at or above which carry-forward is unavailable.
    pub carry_forward_balance_threshold: Decimal,
    pub carry_forward_years: u32,
    pub catch_up_age: u32,
    pub spouse_offset: SpouseContributionOffsetRule,
    pub risk_returns: RiskProfileReturns,
}

/// Every constant the engine needs for one financial year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearRates {
    pub financial_year: FinancialYear,
    pub tax_free_threshold: Decimal,
    pub resident_schedule: TaxSchedule,
    pub foreign_resident_schedule: TaxSchedule,
    pub medicare_levy: MedicareLevyRates,
    pub medicare_surcharge: MedicareSurchargeRates,
    pub offsets: OffsetRates,
    pub superannuation: SuperannuationRates,
    #[serde(default)]
    pub jurisdictions: BTreeMap<Jurisdiction, JurisdictionTaxRules>,
}

impl TaxYearRates {
    /// Built-in tables for `year`.
    ///
    /// # Errors
    ///
    /// Returns [`RatesError::UnsupportedYear`] when no tables are compiled in
    /// for that year.
    pub fn for_year(year: FinancialYear) -> Result<Self, RatesError> {
        match year.0 {
            2025 => Ok(Self::fy2024_25()),
            _ => Err(RatesError::UnsupportedYear(year)),
        }
    }

    /// Loads and validates a complete rates table from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, RatesError> {
        let rates: Self = toml::from_str(source)?;
        rates.validate()?;
        Ok(rates)
    }

    /// Reads a TOML file that either holds a complete table or, when it
    /// names only some sections, overrides the built-in table for its year.
    pub fn from_toml_file(path: &Path) -> Result<Self, RatesError> {
        let source = std::fs::read_to_string(path).map_err(|source| RatesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_rates_source(&source)
    }

    /// A document with a `medicare_levy` section is a complete table;
    /// anything else is read as [`RatesOverrides`].
    fn from_rates_source(source: &str) -> Result<Self, RatesError> {
        let document: toml::Table = toml::from_str(source)?;
        if document.contains_key(FULL_TABLE_KEY) {
            return Self::from_toml_str(source);
        }
        let overrides = RatesOverrides::from_toml_str(source)?;
        let base = Self::for_year(overrides.financial_year)?;
        base.with_overrides(overrides)
    }

    /// Rule set for a state, if one is configured.
    pub fn jurisdiction(
        &self,
        jurisdiction: Jurisdiction,
    ) -> Result<&JurisdictionTaxRules, TaxError> {
        self.jurisdictions
            .get(&jurisdiction)
            .ok_or(TaxError::UnsupportedJurisdiction(jurisdiction))
    }

    pub fn schedule_for(
        &self,
        residency: Residency,
    ) -> &TaxSchedule {
        match residency {
            Residency::Resident => &self.resident_schedule,
            Residency::ForeignResident => &self.foreign_resident_schedule,
        }
    }

    /// Checks every table that is not already validated by its type.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] describing the first problem.
    pub fn validate(&self) -> Result<(), TaxError> {
        let unit = |name: &str, value: Decimal| {
            if value < Decimal::ZERO || value > Decimal::ONE {
                Err(TaxError::configuration(format!(
                    "{name} {value} is outside 0..=1"
                )))
            } else {
                Ok(())
            }
        };

        unit("medicare levy rate", self.medicare_levy.rate)?;
        unit("medicare phase-in band", self.medicare_levy.phase_in_band)?;
        if self.medicare_levy.phase_in_band.is_zero() {
            return Err(TaxError::configuration("medicare phase-in band must be positive"));
        }

        validate_tiers("single", &self.medicare_surcharge.single_tiers)?;
        validate_tiers("family", &self.medicare_surcharge.family_tiers)?;

        self.offsets.low_income.validate()?;
        self.offsets.senior_single.validate()?;
        self.offsets.senior_couple.validate()?;
        unit("medical expense offset rate", self.offsets.medical_expenses.rate)?;
        validate_rebate_tiers(&self.offsets.private_health_rebate)?;

        let sup = &self.superannuation;
        unit("superannuation guarantee rate", sup.guarantee_rate)?;
        unit("contributions tax rate", sup.caps.contributions_tax_rate)?;
        unit("division 293 rate", sup.division_293_rate)?;
        unit("spouse contribution offset rate", sup.spouse_offset.rate)?;
        if sup.spouse_offset.cut_out_income < sup.spouse_offset.income_threshold {
            return Err(TaxError::configuration(
                "spouse contribution offset cuts out below its threshold",
            ));
        }

        for (key, rules) in &self.jurisdictions {
            if *key != rules.jurisdiction {
                return Err(TaxError::configuration(format!(
                    "rules for {} are filed under {key}",
                    rules.jurisdiction
                )));
            }
            rules.validate()?;
        }

        Ok(())
    }
}

fn validate_rebate_tiers(tiers: &[PrivateHealthRebateTier]) -> Result<(), TaxError> {
    if tiers.last().is_none_or(|t| t.single_upper.is_some() || t.family_upper.is_some()) {
        return Err(TaxError::configuration(
            "private health rebate table must end with an open-ended tier",
        ));
    }
    for pair in tiers.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let decreasing = next.under_65 < prev.under_65
            && next.age_65_to_69 < prev.age_65_to_69
            && next.age_70_plus < prev.age_70_plus;
        if !decreasing {
            return Err(TaxError::configuration(format!(
                "private health rebate tier '{}' must pay less than '{}'",
                next.name, prev.name
            )));
        }
    }
    if tiers.last().is_some_and(|t| {
        !t.under_65.is_zero() || !t.age_65_to_69.is_zero() || !t.age_70_plus.is_zero()
    }) {
        return Err(TaxError::configuration(
            "private health rebate top tier must pay nothing",
        ));
    }
    Ok(())
}
