//! Superannuation contribution effects for one year, plus a balance
//! projection to retirement.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use au_tax_core::{ComprehensiveTaxInput, SuperannuationInput, TaxYearRates};
//! use au_tax_core::calculations::SuperannuationCalculator;
//!
//! let rates = TaxYearRates::fy2024_25();
//! let taxpayer = ComprehensiveTaxInput::for_income(dec!(100000));
//! let super_input = SuperannuationInput {
//!     salary: dec!(100000),
//!     voluntary_concessional: dec!(10000),
//!     ..SuperannuationInput::default()
//! };
//!
//! let result = SuperannuationCalculator::new(&rates)
//!     .calculate(&super_input, &taxpayer, dec!(0.325))
//!     .unwrap();
//!
//! assert_eq!(result.mandatory_contribution, dec!(11500.00));
//! assert_eq!(result.tax_saving, dec!(1750.00));
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{MAX_PROJECTION_YEARS, growth_factor, non_negative, round_half_up};
use crate::error::{TaxError, ensure_horizon, ensure_non_negative};
use crate::models::{
    CarryForwardEntry, CarryForwardLedger, ComprehensiveTaxInput, PriorYearContribution,
    SuperannuationInput,
};
use crate::rates::TaxYearRates;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division293Result {
    pub applies: bool,
    /// Income plus concessional contributions over the threshold.
    pub excess: Decimal,
    pub additional_tax: Decimal,
}

/// Suggestions drawn from the year's figures. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuperRecommendation {
    UseCapHeadroom { headroom: Decimal },
    ConcessionalRateSpread { spread: Decimal },
    SpouseContribution { max_offset: Decimal },
    CatchUpContributions { available_carry_forward: Decimal },
    ReduceExcessContributions { excess: Decimal },
}

impl fmt::Display for SuperRecommendation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::UseCapHeadroom { headroom } => {
                write!(f, "${headroom} of concessional cap is unused this year")
            }
            Self::ConcessionalRateSpread { spread } => write!(
                f,
                "concessional contributions are taxed {}% less than salary",
                (spread * Decimal::ONE_HUNDRED).normalize()
            ),
            Self::SpouseContribution { max_offset } => write!(
                f,
                "a contribution to your spouse's fund could earn an offset of up to ${max_offset}"
            ),
            Self::CatchUpContributions {
                available_carry_forward,
            } if available_carry_forward.is_zero() => write!(
                f,
                "unused concessional cap can be carried forward up to five years and caught up"
            ),
            Self::CatchUpContributions {
                available_carry_forward,
            } => write!(
                f,
                "${available_carry_forward} of unused cap from earlier years can be caught up"
            ),
            Self::ReduceExcessContributions { excess } => {
                write!(f, "concessional contributions exceed the cap by ${excess}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperannuationResult {
    pub mandatory_contribution: Decimal,
    pub voluntary_concessional: Decimal,
    /// Mandatory plus voluntary concessional contributions.
    pub total_concessional: Decimal,
    pub tax_saving: Decimal,
    /// Voluntary contribution less the tax it saves.
    pub net_cost: Decimal,
    /// Yearly amount reaching the fund after contributions tax.
    pub annual_contribution: Decimal,
    pub return_rate: Decimal,
    pub years_to_retirement: u32,
    pub projected_balance: Decimal,
    pub division_293: Division293Result,
    pub carry_forward: CarryForwardLedger,
    pub cap_headroom: Decimal,
    pub excess_concessional: Decimal,
    pub excess_non_concessional: Decimal,
    pub spouse_contribution_offset: Decimal,
    pub recommendations: Vec<SuperRecommendation>,
}

#[derive(Debug, Clone)]
pub struct SuperannuationCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> SuperannuationCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// Works out the year's contribution effects for `super_input`.
    ///
    /// `marginal_rate` is the taxpayer's federal marginal rate; the
    /// taxpayer supplies income, age and spouse income.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] if a salary, balance,
    /// contribution or prior-year figure is negative,
    /// [`TaxError::OutOfRange`] if `years_to_retirement` exceeds
    /// [`MAX_PROJECTION_YEARS`], and [`TaxError::Configuration`] if the
    /// projected balance does not fit in a `Decimal`.
    pub fn calculate(
        &self,
        super_input: &SuperannuationInput,
        taxpayer: &ComprehensiveTaxInput,
        marginal_rate: Decimal,
    ) -> Result<SuperannuationResult, TaxError> {
        let salary = ensure_non_negative("salary", super_input.salary)?;
        let balance = ensure_non_negative("current_balance", super_input.current_balance)?;
        let voluntary =
            ensure_non_negative("voluntary_concessional", super_input.voluntary_concessional)?;
        let non_concessional =
            ensure_non_negative("non_concessional", super_input.non_concessional)?;
        let spouse_contribution =
            ensure_non_negative("spouse_contribution", super_input.spouse_contribution)?;
        let years = ensure_horizon(
            "years_to_retirement",
            super_input.years_to_retirement,
            MAX_PROJECTION_YEARS,
        )?;

        let sup = &self.rates.superannuation;
        let caps = &sup.caps;

        let mandatory = round_half_up(salary * sup.guarantee_rate);
        let total_concessional = mandatory + voluntary;

        let tax_saving = self.tax_saving(voluntary, marginal_rate);
        let net_cost = voluntary - tax_saving;

        let annual_contribution =
            round_half_up(mandatory + voluntary * (Decimal::ONE - caps.contributions_tax_rate));
        let return_rate = sup.risk_returns.rate_for(super_input.risk_profile);
        let projected_balance =
            self.future_value(balance, annual_contribution, return_rate, years)?;

        let division_293 = self.division_293(taxpayer.taxable_income, total_concessional);

        let carry_forward = self.carry_forward_ledger(&super_input.prior_years, balance)?;
        let available = carry_forward.available_total();
        let cap_headroom = non_negative(caps.concessional_cap - total_concessional + available);
        let excess_concessional =
            non_negative(total_concessional - caps.concessional_cap - available);
        let excess_non_concessional = non_negative(non_concessional - caps.non_concessional_cap);
        if excess_concessional > Decimal::ZERO {
            warn!(
                concessional = %total_concessional,
                cap = %caps.concessional_cap,
                carry_forward = %available,
                "concessional contributions exceed cap"
            );
        }

        let spouse_income = ensure_non_negative("spouse_income", taxpayer.spouse_income_or_zero())?;
        let spouse_contribution_offset = match taxpayer.spouse_income {
            Some(_) => self.spouse_offset(spouse_contribution, spouse_income),
            None => Decimal::ZERO,
        };

        let mut result = SuperannuationResult {
            mandatory_contribution: mandatory,
            voluntary_concessional: voluntary,
            total_concessional,
            tax_saving,
            net_cost,
            annual_contribution,
            return_rate,
            years_to_retirement: years,
            projected_balance,
            division_293,
            carry_forward,
            cap_headroom,
            excess_concessional,
            excess_non_concessional,
            spouse_contribution_offset,
            recommendations: Vec::new(),
        };
        result.recommendations = self.recommendations(&result, taxpayer, marginal_rate);

        debug!(
            mandatory = %result.mandatory_contribution,
            projected_balance = %result.projected_balance,
            "superannuation calculated"
        );
        Ok(result)
    }

    /// Income tax avoided by contributing before tax, net of contributions
    /// tax. Never negative.
    fn tax_saving(
        &self,
        contribution: Decimal,
        marginal_rate: Decimal,
    ) -> Decimal {
        let contributions_tax = self.rates.superannuation.caps.contributions_tax_rate;
        let spread = non_negative(marginal_rate - contributions_tax);
        round_half_up(contribution * spread)
    }

    /// Balance after `years` of compounding with a level contribution at
    /// each year end.
    fn future_value(
        &self,
        balance: Decimal,
        annual: Decimal,
        rate: Decimal,
        years: u32,
    ) -> Result<Decimal, TaxError> {
        let overflow = || {
            TaxError::configuration(format!(
                "balance projection at {rate} over {years} years does not fit in a decimal"
            ))
        };
        let growth = growth_factor(rate, years).ok_or_else(overflow)?;
        let contributions = if rate.is_zero() {
            annual.checked_mul(Decimal::from(years))
        } else {
            annual
                .checked_mul(growth - Decimal::ONE)
                .and_then(|grown| grown.checked_div(rate))
        };
        contributions
            .and_then(|paid_in| balance.checked_mul(growth)?.checked_add(paid_in))
            .map(round_half_up)
            .ok_or_else(overflow)
    }

    fn division_293(
        &self,
        taxable_income: Decimal,
        concessional: Decimal,
    ) -> Division293Result {
        let sup = &self.rates.superannuation;
        let excess = non_negative(taxable_income + concessional - sup.division_293_threshold);
        if excess.is_zero() {
            return Division293Result {
                applies: false,
                excess,
                additional_tax: Decimal::ZERO,
            };
        }

        let additional_tax = round_half_up(sup.division_293_rate * concessional.min(excess));
        debug!(excess = %excess, additional_tax = %additional_tax, "division 293 applies");
        Division293Result {
            applies: true,
            excess,
            additional_tax,
        }
    }

    /// Builds the carry-forward ledger from earlier years' contributions.
    ///
    /// Unused cap can be used for `carry_forward_years` after the year it
    /// arose, and only while the balance is under the carry-forward balance
    /// threshold. Entries for the current or a later year are ignored.
    fn carry_forward_ledger(
        &self,
        prior_years: &[PriorYearContribution],
        balance: Decimal,
    ) -> Result<CarryForwardLedger, TaxError> {
        let sup = &self.rates.superannuation;
        let current = self.rates.financial_year;
        let balance_ok = balance < sup.carry_forward_balance_threshold;
        let window = i32::try_from(sup.carry_forward_years).unwrap_or(i32::MAX);

        let mut ledger = CarryForwardLedger::default();
        for prior in prior_years {
            let cap = ensure_non_negative("concessional_cap", prior.concessional_cap)?;
            let contributed =
                ensure_non_negative("concessional_contributed", prior.concessional_contributed)?;
            if prior.financial_year >= current {
                warn!(
                    year = %prior.financial_year,
                    "prior-year contribution is not before the current year; ignored"
                );
                continue;
            }

            let expiry_year = prior.financial_year.offset(window);
            ledger.entries.insert(
                prior.financial_year,
                CarryForwardEntry {
                    unused_cap: non_negative(cap - contributed),
                    expiry_year,
                    available: expiry_year >= current && balance_ok,
                },
            );
        }

        if !balance_ok && !ledger.is_empty() {
            warn!(
                balance = %balance,
                threshold = %sup.carry_forward_balance_threshold,
                "balance at or above carry-forward threshold; unused cap unavailable"
            );
        }
        Ok(ledger)
    }

    /// Offset for an after-tax contribution to a low-income spouse's fund.
    fn spouse_offset(
        &self,
        contribution: Decimal,
        spouse_income: Decimal,
    ) -> Decimal {
        let rule = &self.rates.superannuation.spouse_offset;
        if contribution.is_zero() {
            return Decimal::ZERO;
        }
        if spouse_income >= rule.cut_out_income {
            warn!(
                spouse_income = %spouse_income,
                cut_out = %rule.cut_out_income,
                "spouse income at or above cut-out; no spouse contribution offset"
            );
            return Decimal::ZERO;
        }

        let reduction = non_negative(spouse_income - rule.income_threshold);
        let eligible = contribution.min(non_negative(rule.max_contribution - reduction));
        round_half_up(rule.rate * eligible)
    }

    fn recommendations(
        &self,
        result: &SuperannuationResult,
        taxpayer: &ComprehensiveTaxInput,
        marginal_rate: Decimal,
    ) -> Vec<SuperRecommendation> {
        let sup = &self.rates.superannuation;
        let mut recommendations = Vec::new();

        if result.excess_concessional > Decimal::ZERO {
            recommendations.push(SuperRecommendation::ReduceExcessContributions {
                excess: result.excess_concessional,
            });
        } else if result.cap_headroom > Decimal::ZERO {
            recommendations.push(SuperRecommendation::UseCapHeadroom {
                headroom: result.cap_headroom,
            });
        }

        let spread = marginal_rate - sup.caps.contributions_tax_rate;
        if spread > Decimal::ZERO {
            recommendations.push(SuperRecommendation::ConcessionalRateSpread { spread });
        }

        if let Some(spouse_income) = taxpayer.spouse_income {
            if spouse_income < sup.spouse_offset.cut_out_income
                && result.spouse_contribution_offset.is_zero()
            {
                let reduction = non_negative(spouse_income - sup.spouse_offset.income_threshold);
                let max_offset = round_half_up(
                    sup.spouse_offset.rate
                        * non_negative(sup.spouse_offset.max_contribution - reduction),
                );
                recommendations.push(SuperRecommendation::SpouseContribution { max_offset });
            }
        }

        if taxpayer.age >= sup.catch_up_age {
            recommendations.push(SuperRecommendation::CatchUpContributions {
                available_carry_forward: result.carry_forward.available_total(),
            });
        }

        recommendations
    }
}
