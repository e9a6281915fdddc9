//! Subscription Projection CLI
//!
//! Runs the seven-year projection from a JSON parameter file, an optional
//! per-year CSV table, or the stock inputs, and prints the ledger.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use subscription_projection::{
    output,
    params::{load_bundle, load_year_inputs},
    AppConfig, ParameterBundle, ProjectionEngine,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
    Chart,
}

/// Seven-year projection for a two-channel subscription business
#[derive(Parser, Debug)]
#[command(name = "subscription_projection", version, about)]
struct Cli {
    /// JSON parameter bundle (stock inputs when omitted)
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// CSV with Year,NewCustomers,DirectRetention,AffiliationRetention,AdditionalReferrals
    #[arg(short, long)]
    years: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Display title
    #[arg(long, env = "APP_TITLE")]
    title: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match cli.title {
        Some(title) => AppConfig { title },
        None => AppConfig::from_env(),
    };

    let mut params = match &cli.params {
        Some(path) => load_bundle(path)
            .with_context(|| format!("Unable to load parameters from {}", path.display()))?,
        None => ParameterBundle::default_inputs(),
    };

    if let Some(path) = &cli.years {
        let years = load_year_inputs(path)
            .with_context(|| format!("Unable to load year inputs from {}", path.display()))?;
        years.apply_to(&mut params);
    }

    let engine = ProjectionEngine::default();
    let result = engine.compute(&params).context("Projection failed")?;
    info!("Computed {} year records", result.records.len());

    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Unable to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match cli.format {
        OutputFormat::Table => {
            writer.write_all(output::format_table(&config.title, &result).as_bytes())?;
            let summary = result.summary();
            writeln!(writer)?;
            writeln!(writer, "Summary:")?;
            writeln!(writer, "  Total Revenue:    ${:.2}", summary.total_revenue)?;
            writeln!(writer, "  Total Expenses:   ${:.2}", summary.total_expenses)?;
            writeln!(writer, "  Total Net Profit: ${:.2}", summary.total_net_profit)?;
            writeln!(writer, "  Final Cash:       ${:.2}", summary.final_cumulative_cash)?;
            if let Some(year) = summary.min_cash_year {
                writeln!(
                    writer,
                    "  Lowest Cash:      ${:.2} (Year {})",
                    summary.min_cumulative_cash, year
                )?;
            }
            match summary.first_profitable_year {
                Some(year) => writeln!(writer, "  First Profitable Year: {}", year)?,
                None => writeln!(writer, "  No profitable year in horizon")?,
            }
        }
        OutputFormat::Csv => output::write_csv(&result, &mut writer)?,
        OutputFormat::Json => {
            output::write_json(&config.title, &result, &mut writer)?;
            writeln!(writer)?;
        }
        OutputFormat::Chart => output::write_chart_csv(&result, &mut writer)?,
    }

    writer.flush()?;
    if let Some(path) = &cli.output {
        println!("Results written to: {}", path.display());
    }
    Ok(())
}
