use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use au_tax_core::{FinancialYear, TaxEngine, TaxYearRates};
use au_tax_data::{load_from_file, run_batch};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Estimate Australian personal tax for a batch of taxpayers.
///
/// The input CSV needs at least `name` and `gross_income` columns; see the
/// loader documentation for the optional columns.
#[derive(Parser, Debug)]
#[command(name = "au-tax-estimate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file of taxpayers
    #[arg(short, long)]
    input: PathBuf,

    /// TOML file with a complete rates table or overrides for the year
    #[arg(short, long)]
    rates: Option<PathBuf>,

    /// Financial year, e.g. 2024-25
    #[arg(short, long, default_value = "2024-25")]
    year: FinancialYear,

    /// Print results as JSON on stdout
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rates(args: &Args) -> Result<TaxYearRates> {
    let rates = match &args.rates {
        Some(path) => TaxYearRates::from_toml_file(path)
            .with_context(|| format!("Failed to load rates: {}", path.display()))?,
        None => TaxYearRates::for_year(args.year)
            .with_context(|| format!("No built-in rates for {}", args.year))?,
    };
    if rates.financial_year != args.year {
        bail!(
            "rates file is for {} but {} was requested",
            rates.financial_year,
            args.year
        );
    }
    Ok(rates)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let engine = TaxEngine::new(load_rates(&args)?);

    let records = load_from_file(&args.input)
        .with_context(|| format!("Failed to load taxpayers: {}", args.input.display()))?;
    info!(count = records.len(), year = %args.year, "loaded taxpayers");

    let reports = run_batch(&engine, &records);

    if args.json {
        let json = serde_json::to_string_pretty(&reports).context("Failed to encode results")?;
        println!("{json}");
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        bail!("{failed} of {} estimates failed", reports.len());
    }
    Ok(())
}
