//! Tax calculators for Australian individuals.
//!
//! Each calculator borrows the year's [`TaxYearRates`](crate::rates::TaxYearRates)
//! and exposes a single `calculate` entry point. [`TaxEngine`] runs them in
//! order and builds the summary.

pub mod bracket_creep;
pub mod common;
pub mod engine;
pub mod federal;
pub mod medicare_levy;
pub mod medicare_surcharge;
pub mod offsets;
pub mod schedule;
pub mod state_tax;
pub mod superannuation;

pub use bracket_creep::{
    BracketCreepAnalyzer, BracketCreepResult, BracketCreepSummary, YearlyProjection,
};
pub use engine::{ComprehensiveResult, SimpleTaxResult, Summary, TaxEngine};
pub use federal::{FederalTaxCalculator, FederalTaxResult};
pub use medicare_levy::{MedicareLevyCalculator, MedicareLevyResult};
pub use medicare_surcharge::{MedicareSurchargeCalculator, MedicareSurchargeResult};
pub use offsets::{OffsetLine, OffsetsCalculator, OffsetsResult};
pub use schedule::{BracketSlice, ScheduleEvaluation, evaluate_schedule};
pub use state_tax::{
    LandTaxResult, LevyLine, PayrollTaxResult, StampDutyResult, StateTaxCalculator,
    StateTaxResult,
};
pub use superannuation::{
    Division293Result, SuperRecommendation, SuperannuationCalculator, SuperannuationResult,
};
