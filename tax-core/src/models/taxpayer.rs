use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{FinancialYear, Jurisdiction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Residency {
    #[default]
    Resident,
    ForeignResident,
}

/// Household status for threshold selection.
///
/// `Family` covers couples and single parents with dependants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyStatus {
    #[default]
    Single,
    Family,
}

impl FamilyStatus {
    pub fn is_family(&self) -> bool {
        matches!(self, Self::Family)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateHealthCover {
    /// Holds an appropriate level of private patient hospital cover.
    pub has_hospital_cover: bool,
    pub spouse_has_hospital_cover: bool,
    /// Premium paid for the year, before any rebate.
    pub annual_premium: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Balanced,
    Growth,
    HighGrowth,
}

/// Concessional contributions made in an earlier year, used to build the
/// carry-forward ledger. Caps for earlier years come from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorYearContribution {
    pub financial_year: FinancialYear,
    pub concessional_cap: Decimal,
    pub concessional_contributed: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperannuationInput {
    /// Ordinary time earnings the guarantee is paid on.
    pub salary: Decimal,
    pub current_balance: Decimal,
    /// Salary sacrifice or personal deductible contributions this year.
    pub voluntary_concessional: Decimal,
    pub non_concessional: Decimal,
    pub years_to_retirement: u32,
    pub risk_profile: RiskProfile,
    #[serde(default)]
    pub prior_years: Vec<PriorYearContribution>,
    /// After-tax contribution made to a low-income spouse's fund.
    #[serde(default)]
    pub spouse_contribution: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexationMethod {
    /// Scale the bracket thresholds themselves each year.
    #[default]
    RescaleBrackets,
    /// Deflate income, tax it on the unindexed table, reinflate the tax.
    DeflateReinflate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexationSettings {
    pub rate: Decimal,
    /// Years before the first indexation applies.
    #[serde(default)]
    pub lag_years: u32,
    #[serde(default)]
    pub method: IndexationMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketCreepInput {
    pub years: u32,
    pub salary_growth_rate: Decimal,
    pub inflation_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexation: Option<IndexationSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyPurchase {
    pub value: Decimal,
    pub first_home_buyer: bool,
    pub new_home: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandHolding {
    pub value: Decimal,
    pub principal_residence: bool,
    pub absentee_owner: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollInput {
    pub annual_wages: Decimal,
    #[serde(default)]
    pub apprentice_wages: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxInput {
    pub jurisdiction: Jurisdiction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyPurchase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land: Option<LandHolding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payroll: Option<PayrollInput>,
}

impl StateTaxInput {
    pub fn new(jurisdiction: Jurisdiction) -> Self {
        Self {
            jurisdiction,
            property: None,
            land: None,
            payroll: None,
        }
    }
}

/// Everything the engine needs for one taxpayer and one financial year.
///
/// Optional sections switch on the matching part of the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComprehensiveTaxInput {
    pub gross_income: Decimal,
    pub taxable_income: Decimal,
    pub age: u32,
    pub residency: Residency,
    pub family_status: FamilyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_income: Option<Decimal>,
    pub dependents: u32,
    /// Receives an Australian Government pension (SAPTO eligibility).
    pub is_pensioner: bool,
    pub private_health: PrivateHealthCover,
    pub medical_expenses: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superannuation: Option<SuperannuationInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_creep: Option<BracketCreepInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_tax: Option<StateTaxInput>,
}

impl ComprehensiveTaxInput {
    /// A single resident with no deductions: taxable income equals gross.
    pub fn for_income(income: Decimal) -> Self {
        Self {
            gross_income: income,
            taxable_income: income,
            ..Self::default()
        }
    }

    pub fn spouse_income_or_zero(&self) -> Decimal {
        self.spouse_income.unwrap_or(Decimal::ZERO)
    }
}
