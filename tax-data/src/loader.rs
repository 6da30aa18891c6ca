//! CSV loader for batches of taxpayers.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter. Optional
//! columns may be left out entirely or left empty.
//!
//! | Column                   | Required | Type    | Notes                                        |
//! |--------------------------|----------|---------|----------------------------------------------|
//! | `name`                   | yes      | string  | Scenario label used in the output            |
//! | `gross_income`           | yes      | decimal |                                              |
//! | `taxable_income`         | no       | decimal | Defaults to `gross_income`                   |
//! | `age`                    | no       | integer |                                              |
//! | `residency`              | no       | string  | `resident` (default) or `foreign`            |
//! | `family_status`          | no       | string  | `single` (default) or `family`               |
//! | `spouse_income`          | no       | decimal |                                              |
//! | `dependents`             | no       | integer |                                              |
//! | `pensioner`              | no       | bool    |                                              |
//! | `hospital_cover`         | no       | bool    |                                              |
//! | `spouse_hospital_cover`  | no       | bool    |                                              |
//! | `health_premium`         | no       | decimal | Annual private health premium                |
//! | `medical_expenses`       | no       | decimal |                                              |
//! | `super_balance`          | no       | decimal | Any super column enables the super section   |
//! | `voluntary_concessional` | no       | decimal |                                              |
//! | `non_concessional`       | no       | decimal |                                              |
//! | `spouse_contribution`    | no       | decimal |                                              |
//! | `years_to_retirement`    | no       | integer |                                              |
//! | `risk_profile`           | no       | string  | `conservative`, `balanced`, `growth`, `high_growth` |
//! | `creep_years`            | no       | integer | Enables the bracket creep projection         |
//! | `salary_growth`          | no       | decimal | e.g. `0.03`                                  |
//! | `inflation`              | no       | decimal | e.g. `0.025`                                 |
//! | `state`                  | no       | string  | `NSW`, `VIC`, `QLD`; enables state tax       |
//! | `property_value`         | no       | decimal | Purchase price for transfer duty             |
//! | `first_home_buyer`       | no       | bool    |                                              |
//! | `new_home`               | no       | bool    |                                              |
//! | `land_value`             | no       | decimal | Unimproved value for land tax                |
//! | `principal_residence`    | no       | bool    |                                              |
//! | `absentee_owner`         | no       | bool    |                                              |
//! | `payroll_wages`          | no       | decimal | Annual taxable wages for payroll tax         |
//!
//! ### Minimal example
//!
//! ```csv
//! name,gross_income
//! graduate,65000
//! ```

use std::path::{Path, PathBuf};

use au_tax_core::{
    BracketCreepInput, ComprehensiveTaxInput, FamilyStatus, Jurisdiction, LandHolding,
    PayrollInput, PrivateHealthCover, PropertyPurchase, Residency, RiskProfile, StateTaxInput,
    SuperannuationInput,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    gross_income: Decimal,
    taxable_income: Option<Decimal>,
    age: Option<u32>,
    residency: Option<String>,
    family_status: Option<String>,
    spouse_income: Option<Decimal>,
    dependents: Option<u32>,
    pensioner: Option<bool>,
    hospital_cover: Option<bool>,
    spouse_hospital_cover: Option<bool>,
    health_premium: Option<Decimal>,
    medical_expenses: Option<Decimal>,
    super_balance: Option<Decimal>,
    voluntary_concessional: Option<Decimal>,
    non_concessional: Option<Decimal>,
    spouse_contribution: Option<Decimal>,
    years_to_retirement: Option<u32>,
    risk_profile: Option<String>,
    creep_years: Option<u32>,
    salary_growth: Option<Decimal>,
    inflation: Option<Decimal>,
    state: Option<String>,
    property_value: Option<Decimal>,
    first_home_buyer: Option<bool>,
    new_home: Option<bool>,
    land_value: Option<Decimal>,
    principal_residence: Option<bool>,
    absentee_owner: Option<bool>,
    payroll_wages: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting CSV data.
#[derive(Debug, Error)]
pub enum CsvLoadError {
    /// Bad structure, a missing required column or a type mismatch.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A text column held a value outside its allowed set. `row` is 1-based
    /// and does not count the header.
    #[error("unrecognised {column} '{value}' on row {row}")]
    InvalidValue {
        column: &'static str,
        value: String,
        row: usize,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One named taxpayer ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxpayerRecord {
    pub name: String,
    pub input: ComprehensiveTaxInput,
}

// ---------------------------------------------------------------------------
// Column parsers
// ---------------------------------------------------------------------------

fn invalid(
    column: &'static str,
    value: &str,
    row: usize,
) -> CsvLoadError {
    CsvLoadError::InvalidValue {
        column,
        value: value.to_string(),
        row,
    }
}

fn parse_residency(
    value: &str,
    row: usize,
) -> Result<Residency, CsvLoadError> {
    match value.to_ascii_lowercase().as_str() {
        "resident" => Ok(Residency::Resident),
        "foreign" | "foreign_resident" => Ok(Residency::ForeignResident),
        _ => Err(invalid("residency", value, row)),
    }
}

fn parse_family_status(
    value: &str,
    row: usize,
) -> Result<FamilyStatus, CsvLoadError> {
    match value.to_ascii_lowercase().as_str() {
        "single" => Ok(FamilyStatus::Single),
        "family" | "couple" => Ok(FamilyStatus::Family),
        _ => Err(invalid("family_status", value, row)),
    }
}

fn parse_risk_profile(
    value: &str,
    row: usize,
) -> Result<RiskProfile, CsvLoadError> {
    match value.to_ascii_lowercase().as_str() {
        "conservative" => Ok(RiskProfile::Conservative),
        "balanced" => Ok(RiskProfile::Balanced),
        "growth" => Ok(RiskProfile::Growth),
        "high_growth" => Ok(RiskProfile::HighGrowth),
        _ => Err(invalid("risk_profile", value, row)),
    }
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn superannuation_section(
    row: &CsvRow,
    row_number: usize,
) -> Result<Option<SuperannuationInput>, CsvLoadError> {
    let wanted = row.super_balance.is_some()
        || row.voluntary_concessional.is_some()
        || row.non_concessional.is_some()
        || row.spouse_contribution.is_some()
        || row.years_to_retirement.is_some();
    if !wanted {
        return Ok(None);
    }

    let risk_profile = match row.risk_profile.as_deref() {
        Some(value) => parse_risk_profile(value, row_number)?,
        None => RiskProfile::default(),
    };

    Ok(Some(SuperannuationInput {
        salary: row.gross_income,
        current_balance: row.super_balance.unwrap_or_default(),
        voluntary_concessional: row.voluntary_concessional.unwrap_or_default(),
        non_concessional: row.non_concessional.unwrap_or_default(),
        years_to_retirement: row.years_to_retirement.unwrap_or_default(),
        risk_profile,
        prior_years: Vec::new(),
        spouse_contribution: row.spouse_contribution.unwrap_or_default(),
    }))
}

fn state_section(
    row: &CsvRow,
    row_number: usize,
) -> Result<Option<StateTaxInput>, CsvLoadError> {
    let Some(state) = row.state.as_deref() else {
        return Ok(None);
    };
    let jurisdiction =
        Jurisdiction::parse(state).ok_or_else(|| invalid("state", state, row_number))?;

    let mut input = StateTaxInput::new(jurisdiction);
    input.property = row.property_value.map(|value| PropertyPurchase {
        value,
        first_home_buyer: row.first_home_buyer.unwrap_or(false),
        new_home: row.new_home.unwrap_or(false),
    });
    input.land = row.land_value.map(|value| LandHolding {
        value,
        principal_residence: row.principal_residence.unwrap_or(false),
        absentee_owner: row.absentee_owner.unwrap_or(false),
    });
    input.payroll = row.payroll_wages.map(|annual_wages| PayrollInput {
        annual_wages,
        apprentice_wages: Decimal::ZERO,
    });
    Ok(Some(input))
}

/// Convert a single CSV row. `row_number` is 1-based.
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<TaxpayerRecord, CsvLoadError> {
    let residency = match row.residency.as_deref() {
        Some(value) => parse_residency(value, row_number)?,
        None => Residency::default(),
    };
    let family_status = match row.family_status.as_deref() {
        Some(value) => parse_family_status(value, row_number)?,
        None => FamilyStatus::default(),
    };
    let superannuation = superannuation_section(&row, row_number)?;
    let state_tax = state_section(&row, row_number)?;
    let bracket_creep = row.creep_years.map(|years| BracketCreepInput {
        years,
        salary_growth_rate: row.salary_growth.unwrap_or_default(),
        inflation_rate: row.inflation.unwrap_or_default(),
        indexation: None,
    });

    let input = ComprehensiveTaxInput {
        gross_income: row.gross_income,
        taxable_income: row.taxable_income.unwrap_or(row.gross_income),
        age: row.age.unwrap_or_default(),
        residency,
        family_status,
        spouse_income: row.spouse_income,
        dependents: row.dependents.unwrap_or_default(),
        is_pensioner: row.pensioner.unwrap_or(false),
        private_health: PrivateHealthCover {
            has_hospital_cover: row.hospital_cover.unwrap_or(false),
            spouse_has_hospital_cover: row.spouse_hospital_cover.unwrap_or(false),
            annual_premium: row.health_premium.unwrap_or_default(),
        },
        medical_expenses: row.medical_expenses.unwrap_or_default(),
        superannuation,
        bracket_creep,
        state_tax,
    };

    Ok(TaxpayerRecord {
        name: row.name,
        input,
    })
}

/// Parse CSV text and return one record per row, in file order.
///
/// # Errors
///
/// * [`CsvLoadError::Parse`] if the CSV is structurally invalid or a
///   required field cannot be deserialised.
/// * [`CsvLoadError::InvalidValue`] if a text column holds an unknown code.
pub fn load_from_str(input: &str) -> Result<Vec<TaxpayerRecord>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1))
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<TaxpayerRecord>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}
