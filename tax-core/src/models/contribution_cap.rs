use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FinancialYear;

/// Annual superannuation contribution limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionCap {
    pub concessional_cap: Decimal,
    pub non_concessional_cap: Decimal,
    /// Flat tax on concessional contributions inside the fund.
    pub contributions_tax_rate: Decimal,
}

/// Unused concessional cap from one prior year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryForwardEntry {
    pub unused_cap: Decimal,
    /// Last financial year in which the amount can be used.
    pub expiry_year: FinancialYear,
    pub available: bool,
}

/// Carry-forward entries keyed by the year the cap went unused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryForwardLedger {
    pub entries: BTreeMap<FinancialYear, CarryForwardEntry>,
}

impl CarryForwardLedger {
    /// Total unused cap that can be drawn on this year.
    pub fn available_total(&self) -> Decimal {
        self.entries
            .values()
            .filter(|e| e.available)
            .map(|e| e.unused_cap)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
