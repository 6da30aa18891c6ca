use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RatesError, TaxYearRates};
use crate::models::{FinancialYear, JurisdictionTaxRules, TaxSchedule};

/// Partial rates file layered over a built-in table.
///
/// ```toml
/// financial_year = 2025
/// medicare_levy_rate = "0.02"
///
/// [resident_schedule]
/// brackets = [
///     { lower_bound = 0, upper_bound = 18200, rate = "0", base_tax = 0 },
///     { lower_bound = 18201, rate = "0.19", base_tax = 0 },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatesOverrides {
    pub financial_year: FinancialYear,
    #[serde(default)]
    pub tax_free_threshold: Option<Decimal>,
    #[serde(default)]
    pub resident_schedule: Option<TaxSchedule>,
    #[serde(default)]
    pub foreign_resident_schedule: Option<TaxSchedule>,
    #[serde(default)]
    pub medicare_levy_rate: Option<Decimal>,
    #[serde(default)]
    pub superannuation_guarantee_rate: Option<Decimal>,
    #[serde(default)]
    pub concessional_cap: Option<Decimal>,
    #[serde(default)]
    pub non_concessional_cap: Option<Decimal>,
    /// Replaces (or adds) whole jurisdiction rule sets.
    #[serde(default)]
    pub jurisdictions: Vec<JurisdictionTaxRules>,
}

impl RatesOverrides {
    /// An override for `financial_year` that changes nothing.
    pub fn for_year(financial_year: FinancialYear) -> Self {
        Self {
            financial_year,
            tax_free_threshold: None,
            resident_schedule: None,
            foreign_resident_schedule: None,
            medicare_levy_rate: None,
            superannuation_guarantee_rate: None,
            concessional_cap: None,
            non_concessional_cap: None,
            jurisdictions: Vec::new(),
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, RatesError> {
        Ok(toml::from_str(source)?)
    }
}

impl TaxYearRates {
    /// Applies `overrides` and revalidates the result.
    ///
    /// When the override replaces the resident schedule without naming a
    /// tax-free threshold, the threshold is taken from the new schedule's
    /// nil-rate band.
    pub fn with_overrides(
        mut self,
        overrides: RatesOverrides,
    ) -> Result<Self, RatesError> {
        if overrides.financial_year != self.financial_year {
            return Err(RatesError::UnsupportedYear(overrides.financial_year));
        }

        if let Some(schedule) = overrides.resident_schedule {
            debug!(year = %self.financial_year, "overriding resident schedule");
            self.tax_free_threshold = schedule.zero_rate_ceiling();
            self.resident_schedule = schedule;
        }
        if let Some(threshold) = overrides.tax_free_threshold {
            self.tax_free_threshold = threshold;
        }
        if let Some(schedule) = overrides.foreign_resident_schedule {
            self.foreign_resident_schedule = schedule;
        }
        if let Some(rate) = overrides.medicare_levy_rate {
            self.medicare_levy.rate = rate;
        }
        if let Some(rate) = overrides.superannuation_guarantee_rate {
            self.superannuation.guarantee_rate = rate;
        }
        if let Some(cap) = overrides.concessional_cap {
            self.superannuation.caps.concessional_cap = cap;
        }
        if let Some(cap) = overrides.non_concessional_cap {
            self.superannuation.caps.non_concessional_cap = cap;
        }
        for rules in overrides.jurisdictions {
            debug!(jurisdiction = %rules.jurisdiction, "overriding state rules");
            self.jurisdictions.insert(rules.jurisdiction, rules);
        }

        self.validate()?;
        Ok(self)
    }
}

impl TaxSchedule {
    /// Parses a schedule from a TOML document with a `brackets` array.
    ///
    /// # Errors
    ///
    /// Returns [`RatesError::Toml`] for malformed TOML and for tables that
    /// fail validation (the validation message is carried in the error).
    pub fn from_toml_str(source: &str) -> Result<Self, RatesError> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::Jurisdiction;

    const STAGE_THREE: &str = include_str!("../../rates/fy2024_25_stage3.toml");

    #[test]
    fn schedule_loads_from_toml() {
        let schedule = TaxSchedule::from_toml_str(
            r#"
            brackets = [
                { lower_bound = 0, upper_bound = 10000, rate = "0", base_tax = 0 },
                { lower_bound = 10001, rate = "0.2", base_tax = 0 },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(schedule.brackets().len(), 2);
        assert_eq!(schedule.brackets()[1].rate, dec!(0.2));
        assert_eq!(schedule.brackets()[1].upper_bound, None);
    }

    #[test]
    fn malformed_schedule_is_rejected_on_load() {
        let result = TaxSchedule::from_toml_str(
            r#"
            brackets = [
                { lower_bound = 0, upper_bound = 10000, rate = "0", base_tax = 0 },
                { lower_bound = 20000, rate = "0.2", base_tax = 0 },
            ]
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn stage_three_override_replaces_resident_schedule() {
        let overrides = RatesOverrides::from_toml_str(STAGE_THREE).unwrap();

        let rates = TaxYearRates::fy2024_25().with_overrides(overrides).unwrap();

        let brackets = rates.resident_schedule.brackets();
        assert_eq!(brackets[1].rate, dec!(0.16));
        assert_eq!(brackets[2].base_tax, dec!(4288));
        assert_eq!(rates.tax_free_threshold, dec!(18200));
    }

    #[test]
    fn scalar_overrides_apply() {
        let overrides = RatesOverrides {
            medicare_levy_rate: Some(dec!(0.025)),
            concessional_cap: Some(dec!(32500)),
            ..RatesOverrides::for_year(FinancialYear(2025))
        };

        let rates = TaxYearRates::fy2024_25().with_overrides(overrides).unwrap();

        assert_eq!(rates.medicare_levy.rate, dec!(0.025));
        assert_eq!(rates.superannuation.caps.concessional_cap, dec!(32500));
    }

    #[test]
    fn override_for_other_year_is_rejected() {
        let overrides = RatesOverrides::for_year(FinancialYear(2030));

        let result = TaxYearRates::fy2024_25().with_overrides(overrides);

        assert!(matches!(result, Err(RatesError::UnsupportedYear(_))));
    }

    #[test]
    fn invalid_override_fails_validation() {
        let overrides = RatesOverrides {
            medicare_levy_rate: Some(dec!(-0.02)),
            ..RatesOverrides::for_year(FinancialYear(2025))
        };

        let result = TaxYearRates::fy2024_25().with_overrides(overrides);

        assert!(matches!(result, Err(RatesError::Invalid(_))));
    }

    #[test]
    fn jurisdiction_override_adds_new_state() {
        let mut wa = TaxYearRates::fy2024_25().jurisdictions[&Jurisdiction::Nsw].clone();
        wa.jurisdiction = Jurisdiction::Wa;
        let overrides = RatesOverrides {
            jurisdictions: vec![wa],
            ..RatesOverrides::for_year(FinancialYear(2025))
        };

        let rates = TaxYearRates::fy2024_25().with_overrides(overrides).unwrap();

        assert!(rates.jurisdiction(Jurisdiction::Wa).is_ok());
    }
}
