//! Runs a loaded batch through the engine and shapes the output.

use au_tax_core::{ComprehensiveResult, FinancialYear, TaxEngine};
use serde::Serialize;
use tracing::{info, warn};

use crate::loader::TaxpayerRecord;

/// Outcome for one named taxpayer. Exactly one of `result` and `error` is
/// set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateReport {
    pub name: String,
    pub financial_year: FinancialYear,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ComprehensiveResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EstimateReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }
}

/// Calculates every record and logs one summary line each.
///
/// A failing record does not stop the batch.
pub fn run_batch(
    engine: &TaxEngine,
    records: &[TaxpayerRecord],
) -> Vec<EstimateReport> {
    let inputs: Vec<_> = records.iter().map(|r| r.input.clone()).collect();

    records
        .iter()
        .zip(engine.calculate_batch(&inputs))
        .map(|(record, outcome)| {
            let (result, error) = match outcome {
                Ok(result) => {
                    info!(
                        name = %record.name,
                        gross = %result.summary.gross_income,
                        net_tax = %result.summary.net_tax_payable,
                        after_tax = %result.summary.after_tax_income,
                        effective_rate = %result.summary.effective_rate.round_dp(4),
                        "estimate"
                    );
                    (Some(result), None)
                }
                Err(err) => {
                    warn!(name = %record.name, error = %err, "estimate failed");
                    (None, Some(err.to_string()))
                }
            };
            EstimateReport {
                name: record.name.clone(),
                financial_year: engine.financial_year(),
                result,
                error,
            }
        })
        .collect()
}
