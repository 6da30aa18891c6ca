use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TaxSchedule;
use crate::error::TaxError;

/// Australian states and territories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Jurisdiction {
    Nsw,
    Vic,
    Qld,
    Wa,
    Sa,
    Tas,
    Act,
    Nt,
}

impl Jurisdiction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nsw => "NSW",
            Self::Vic => "VIC",
            Self::Qld => "QLD",
            Self::Wa => "WA",
            Self::Sa => "SA",
            Self::Tas => "TAS",
            Self::Act => "ACT",
            Self::Nt => "NT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NSW" => Some(Self::Nsw),
            "VIC" => Some(Self::Vic),
            "QLD" => Some(Self::Qld),
            "WA" => Some(Self::Wa),
            "SA" => Some(Self::Sa),
            "TAS" => Some(Self::Tas),
            "ACT" => Some(Self::Act),
            "NT" => Some(Self::Nt),
            _ => None,
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Jurisdiction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown jurisdiction '{s}'"))
    }
}

/// First home buyer transfer duty concession.
///
/// Full exemption at or below `full_exemption_threshold`; between that and
/// `concession_ceiling` the duty payable rises linearly to the full amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstHomeConcession {
    pub full_exemption_threshold: Decimal,
    pub concession_ceiling: Decimal,
}

/// Flat grant for first home buyers purchasing a new home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstHomeGrant {
    pub amount: Decimal,
    pub property_value_cap: Decimal,
    pub new_homes_only: bool,
}

/// Additional payroll levy charged on wages above `threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollLevy {
    pub name: String,
    pub threshold: Decimal,
    pub rate: Decimal,
}

/// Rebate on payroll tax for apprentice and trainee wages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprenticeRebate {
    pub rate: Decimal,
    /// Optional fixed ceiling; the rebate never exceeds the base payroll tax
    /// regardless.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<Decimal>,
}

/// Everything needed to compute one jurisdiction's state taxes.
///
/// The three supported states differ only in this data; the calculator is
/// shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionTaxRules {
    pub jurisdiction: Jurisdiction,
    pub stamp_duty_schedule: TaxSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_home_concession: Option<FirstHomeConcession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_home_grant: Option<FirstHomeGrant>,
    pub land_tax_schedule: TaxSchedule,
    pub land_tax_threshold: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absentee_surcharge_rate: Option<Decimal>,
    pub payroll_tax_threshold: Decimal,
    pub payroll_tax_rate: Decimal,
    #[serde(default)]
    pub payroll_levies: Vec<PayrollLevy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apprentice_rebate: Option<ApprenticeRebate>,
}

impl JurisdictionTaxRules {
    /// Checks the scalar rules; schedules are validated on construction.
    pub fn validate(&self) -> Result<(), TaxError> {
        let unit_rate = |name: &str, rate: Decimal| {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                Err(TaxError::configuration(format!(
                    "{} {name} {rate} is outside 0..=1",
                    self.jurisdiction
                )))
            } else {
                Ok(())
            }
        };

        unit_rate("payroll tax rate", self.payroll_tax_rate)?;
        if let Some(rate) = self.absentee_surcharge_rate {
            unit_rate("absentee surcharge rate", rate)?;
        }
        for levy in &self.payroll_levies {
            unit_rate(&levy.name, levy.rate)?;
        }
        if let Some(rebate) = &self.apprentice_rebate {
            unit_rate("apprentice rebate rate", rebate.rate)?;
        }
        if let Some(concession) = &self.first_home_concession {
            if concession.concession_ceiling <= concession.full_exemption_threshold {
                return Err(TaxError::configuration(format!(
                    "{} first home concession ceiling {} must exceed exemption threshold {}",
                    self.jurisdiction,
                    concession.concession_ceiling,
                    concession.full_exemption_threshold
                )));
            }
        }
        if self.payroll_tax_threshold < Decimal::ZERO || self.land_tax_threshold < Decimal::ZERO {
            return Err(TaxError::configuration(format!(
                "{} thresholds must not be negative",
                self.jurisdiction
            )));
        }
        Ok(())
    }
}
