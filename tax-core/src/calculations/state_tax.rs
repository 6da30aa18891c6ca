//! State transfer duty, land tax and payroll tax.
//!
//! One calculator serves every jurisdiction; the differences between states
//! live in [`JurisdictionTaxRules`]. Each part runs only when its input is
//! present.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use au_tax_core::{Jurisdiction, PropertyPurchase, StateTaxInput, TaxYearRates};
//! use au_tax_core::calculations::StateTaxCalculator;
//!
//! let rates = TaxYearRates::fy2024_25();
//! let calculator = StateTaxCalculator::for_jurisdiction(&rates, Jurisdiction::Nsw).unwrap();
//!
//! let mut input = StateTaxInput::new(Jurisdiction::Nsw);
//! input.property = Some(PropertyPurchase {
//!     value: dec!(700000),
//!     first_home_buyer: true,
//!     new_home: false,
//! });
//!
//! let result = calculator.calculate(&input).unwrap();
//!
//! assert_eq!(result.total, dec!(0));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{non_negative, round_half_up};
use crate::calculations::schedule::evaluate_schedule;
use crate::error::{TaxError, ensure_non_negative};
use crate::models::{
    Jurisdiction, JurisdictionTaxRules, LandHolding, PayrollInput, PropertyPurchase,
    StateTaxInput,
};
use crate::rates::TaxYearRates;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampDutyResult {
    pub property_value: Decimal,
    /// Duty before any first home concession.
    pub full_duty: Decimal,
    pub concession: Decimal,
    pub duty_payable: Decimal,
    /// Paid to the buyer; not netted against duty.
    pub first_home_grant: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandTaxResult {
    pub land_value: Decimal,
    pub exempt: bool,
    pub land_tax: Decimal,
    pub absentee_surcharge: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevyLine {
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTaxResult {
    pub annual_wages: Decimal,
    pub base_tax: Decimal,
    pub levies: Vec<LevyLine>,
    pub apprentice_rebate: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxResult {
    pub jurisdiction: Jurisdiction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp_duty: Option<StampDutyResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_tax: Option<LandTaxResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payroll_tax: Option<PayrollTaxResult>,
    /// Duty plus land tax (with surcharge) plus net payroll tax.
    pub total: Decimal,
}

#[derive(Debug, Clone)]
pub struct StateTaxCalculator<'a> {
    rules: &'a JurisdictionTaxRules,
}

impl<'a> StateTaxCalculator<'a> {
    pub fn new(rules: &'a JurisdictionTaxRules) -> Self {
        Self { rules }
    }

    /// Calculator for `jurisdiction` under the year's rules.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::UnsupportedJurisdiction`] if no rules are
    /// configured for it.
    pub fn for_jurisdiction(
        rates: &'a TaxYearRates,
        jurisdiction: Jurisdiction,
    ) -> Result<Self, TaxError> {
        Ok(Self::new(rates.jurisdiction(jurisdiction)?))
    }

    /// Calculates whichever state taxes `input` asks for.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::UnsupportedJurisdiction`] if `input` names a
    /// different jurisdiction from these rules, and
    /// [`TaxError::InvalidAmount`] for negative values or wages.
    pub fn calculate(
        &self,
        input: &StateTaxInput,
    ) -> Result<StateTaxResult, TaxError> {
        if input.jurisdiction != self.rules.jurisdiction {
            return Err(TaxError::UnsupportedJurisdiction(input.jurisdiction));
        }

        let stamp_duty = input
            .property
            .as_ref()
            .map(|p| self.stamp_duty(p))
            .transpose()?;
        let land_tax = input
            .land
            .as_ref()
            .map(|l| self.land_tax(l))
            .transpose()?;
        let payroll_tax = input
            .payroll
            .as_ref()
            .map(|p| self.payroll_tax(p))
            .transpose()?;

        let total = stamp_duty.as_ref().map_or(Decimal::ZERO, |d| d.duty_payable)
            + land_tax.as_ref().map_or(Decimal::ZERO, |l| l.total)
            + payroll_tax.as_ref().map_or(Decimal::ZERO, |p| p.total);

        debug!(jurisdiction = %self.rules.jurisdiction, total = %total, "state tax calculated");

        Ok(StateTaxResult {
            jurisdiction: self.rules.jurisdiction,
            stamp_duty,
            land_tax,
            payroll_tax,
            total,
        })
    }

    /// Transfer duty on a purchase, with any first home concession and
    /// grant.
    pub fn stamp_duty(
        &self,
        purchase: &PropertyPurchase,
    ) -> Result<StampDutyResult, TaxError> {
        let value = ensure_non_negative("property_value", purchase.value)?;
        let full_duty =
            round_half_up(evaluate_schedule(&self.rules.stamp_duty_schedule, value)?.total);

        let duty_payable = match (&self.rules.first_home_concession, purchase.first_home_buyer) {
            (Some(concession), true) => {
                let exempt_to = concession.full_exemption_threshold;
                let ceiling = concession.concession_ceiling;
                if value <= exempt_to {
                    Decimal::ZERO
                } else if value <= ceiling {
                    round_half_up(full_duty * (value - exempt_to) / (ceiling - exempt_to))
                } else {
                    full_duty
                }
            }
            _ => full_duty,
        };

        let first_home_grant = self.first_home_grant(purchase, value);

        Ok(StampDutyResult {
            property_value: value,
            full_duty,
            concession: full_duty - duty_payable,
            duty_payable,
            first_home_grant,
        })
    }

    fn first_home_grant(
        &self,
        purchase: &PropertyPurchase,
        value: Decimal,
    ) -> Decimal {
        let Some(grant) = &self.rules.first_home_grant else {
            return Decimal::ZERO;
        };
        if !purchase.first_home_buyer {
            return Decimal::ZERO;
        }
        if grant.new_homes_only && !purchase.new_home {
            debug!("first home grant requires a new home");
            return Decimal::ZERO;
        }
        if value > grant.property_value_cap {
            warn!(
                value = %value,
                cap = %grant.property_value_cap,
                "property value above first home grant cap; no grant"
            );
            return Decimal::ZERO;
        }
        grant.amount
    }

    /// Annual land tax. The absentee surcharge applies to the whole land
    /// value of taxable land.
    pub fn land_tax(
        &self,
        holding: &LandHolding,
    ) -> Result<LandTaxResult, TaxError> {
        let value = ensure_non_negative("land_value", holding.value)?;

        if holding.principal_residence {
            debug!("principal place of residence; land tax exempt");
            return Ok(LandTaxResult {
                land_value: value,
                exempt: true,
                land_tax: Decimal::ZERO,
                absentee_surcharge: Decimal::ZERO,
                total: Decimal::ZERO,
            });
        }
        if value <= self.rules.land_tax_threshold {
            return Ok(LandTaxResult {
                land_value: value,
                exempt: false,
                land_tax: Decimal::ZERO,
                absentee_surcharge: Decimal::ZERO,
                total: Decimal::ZERO,
            });
        }

        let land_tax =
            round_half_up(evaluate_schedule(&self.rules.land_tax_schedule, value)?.total);
        let absentee_surcharge = match self.rules.absentee_surcharge_rate {
            Some(rate) if holding.absentee_owner => round_half_up(rate * value),
            _ => Decimal::ZERO,
        };

        Ok(LandTaxResult {
            land_value: value,
            exempt: false,
            land_tax,
            absentee_surcharge,
            total: land_tax + absentee_surcharge,
        })
    }

    /// Payroll tax on annual wages, plus levies, less the apprentice rebate.
    pub fn payroll_tax(
        &self,
        payroll: &PayrollInput,
    ) -> Result<PayrollTaxResult, TaxError> {
        let wages = ensure_non_negative("annual_wages", payroll.annual_wages)?;
        let apprentice_wages = ensure_non_negative("apprentice_wages", payroll.apprentice_wages)?;

        let base_tax = round_half_up(
            self.rules.payroll_tax_rate * non_negative(wages - self.rules.payroll_tax_threshold),
        );

        let levies: Vec<LevyLine> = self
            .rules
            .payroll_levies
            .iter()
            .map(|levy| LevyLine {
                name: levy.name.clone(),
                amount: round_half_up(levy.rate * non_negative(wages - levy.threshold)),
            })
            .collect();

        let apprentice_rebate = match &self.rules.apprentice_rebate {
            Some(rebate) => {
                let uncapped = round_half_up(rebate.rate * apprentice_wages).min(base_tax);
                rebate.cap.map_or(uncapped, |cap| uncapped.min(cap))
            }
            None => Decimal::ZERO,
        };

        let levy_total: Decimal = levies.iter().map(|l| l.amount).sum();
        Ok(PayrollTaxResult {
            annual_wages: wages,
            base_tax,
            levies,
            apprentice_rebate,
            total: base_tax + levy_total - apprentice_rebate,
        })
    }
}
