mod contribution_cap;
mod financial_year;
mod jurisdiction;
mod offset_rule;
mod tax_bracket;
mod taxpayer;
mod thresholds;

pub use contribution_cap::{CarryForwardEntry, CarryForwardLedger, ContributionCap};
pub use financial_year::{FinancialYear, ParseFinancialYearError};
pub use jurisdiction::{
    ApprenticeRebate, FirstHomeConcession, FirstHomeGrant, Jurisdiction, JurisdictionTaxRules,
    PayrollLevy,
};
pub use offset_rule::{OffsetKind, OffsetRule, TaperStep};
pub use tax_bracket::{TaxBracket, TaxSchedule};
pub use taxpayer::{
    BracketCreepInput, ComprehensiveTaxInput, FamilyStatus, IndexationMethod, IndexationSettings,
    LandHolding, PayrollInput, PriorYearContribution, PrivateHealthCover, PropertyPurchase,
    Residency, RiskProfile, StateTaxInput, SuperannuationInput,
};
pub use thresholds::{SurchargeTier, ThresholdSet, validate_tiers};
