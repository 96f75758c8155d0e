//! Growth Projection CLI
//!
//! Computes ETF price metrics from a CSV of adjusted closes and writes the
//! compounding scenario tables to the results directory.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use growth_projection::{
    metrics::{self, MetricsRecord},
    prices::{CsvPriceSource, PriceSource},
    scenario::dca_returns_from_metrics,
    AppConfig, ResultsWriter, ScenarioRunner,
};
use log::{debug, warn};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for result tables (overrides the config file)
    #[arg(short, long, global = true)]
    results_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute CAGR, volatility, drawdown and Sharpe for each symbol
    Metrics {
        /// CSV of adjusted closing prices (Date column plus one column per symbol)
        #[arg(short, long)]
        prices: PathBuf,
    },
    /// Write the compounding scenario tables
    Compound,
    /// Project dollar-cost averaging into single ETFs
    Dca {
        /// Price CSV used to derive historical CAGRs when the config has none
        #[arg(short, long)]
        prices: Option<PathBuf>,
    },
    /// Run metrics, compounding and DCA together
    All {
        #[arg(short, long)]
        prices: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(dir) = cli.results_dir {
        config.results_dir = dir;
    }
    debug!("Config: {config:#?}");

    let writer = ResultsWriter::new(&config.results_dir).with_context(|| {
        format!("Failed to create results directory: {}", config.results_dir.display())
    })?;

    match cli.command {
        Commands::Metrics { prices } => {
            run_metrics(&config, &writer, &prices)?;
        }
        Commands::Compound => run_compounding(&config, &writer)?,
        Commands::Dca { prices } => {
            let records = match prices {
                Some(path) => run_metrics(&config, &writer, &path)?,
                None => Vec::new(),
            };
            run_dca(&config, &writer, &records)?;
        }
        Commands::All { prices } => {
            run_compounding(&config, &writer)?;
            let records = run_metrics(&config, &writer, &prices)?;
            run_dca(&config, &writer, &records)?;
        }
    }

    println!("Done. See CSV files in {}", writer.dir().display());
    Ok(())
}

fn run_compounding(config: &AppConfig, writer: &ResultsWriter) -> Result<()> {
    println!("Creating compounding tables...");

    let runner = ScenarioRunner::with_defaults(config.projection);
    let grid = &config.scenarios;

    let early_late = runner.start_early_vs_late(&grid.early_late_ages, &grid.monthly_levels)?;
    writer.write_paths("early_vs_late_200mo.csv", &early_late)?;

    let catch_up = runner.catch_up(&grid.catch_up)?;
    writer.write_paths("early_small_vs_late_big.csv", &catch_up)?;

    let ages = grid.needed_ages();
    let needed = runner.monthly_needed_by_return(&ages, &[config.projection.annual_return])?;
    writer.write_monthly_needed("monthly_needed_to_1M.csv", &needed)?;

    let multi = runner.monthly_needed_by_return(&ages, &grid.multi_returns)?;
    writer.write_monthly_needed("monthly_to_1M_multi_returns.csv", &multi)?;

    println!(
        "  Target ${:.0} by age {} at {:.0}% annual return",
        config.projection.target,
        config.projection.end_age,
        config.projection.annual_return * 100.0
    );
    for row in needed.iter().flat_map(|t| t.table.rows()).step_by(5) {
        match row.monthly {
            Some(monthly) => println!("  Start {:>2}: ${:>10.2}/mo", row.start_age, monthly),
            None => println!("  Start {:>2}: N/A", row.start_age),
        }
    }

    Ok(())
}

fn run_metrics(config: &AppConfig, writer: &ResultsWriter, prices: &Path) -> Result<Vec<MetricsRecord>> {
    println!("Loading prices and computing metrics...");

    let table = CsvPriceSource::new(prices)
        .load()
        .with_context(|| format!("Failed to load prices: {}", prices.display()))?;
    let (table, missing) = table.restrict(&config.tickers, config.start_date);
    for symbol in &missing {
        warn!("No prices for {} in {}", symbol, prices.display());
    }
    if table.is_empty() {
        bail!("No price series to analyze in {}", prices.display());
    }

    writer.write_prices("prices.csv", &table)?;

    let records: Vec<MetricsRecord> = metrics::compute_all(&table, config.risk_free_annual)
        .iter()
        .map(|r| r.rounded(4))
        .collect();
    writer.write_metrics("metrics.csv", &records)?;

    let rebased = table.rebased(100.0)?;
    writer.write_prices("etf_growth_rebased.csv", &rebased)?;

    let fmt = |v: Option<f64>| v.map_or("N/A".to_string(), |x| format!("{x:.4}"));
    println!(
        "{:<8} {:>10} {:>10} {:>10} {:>10}",
        "Ticker", "CAGR", "AnnVol", "MaxDD", "Sharpe"
    );
    println!("{}", "-".repeat(52));
    for r in &records {
        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>10}",
            r.symbol,
            fmt(r.cagr),
            fmt(r.annual_volatility),
            fmt(r.max_drawdown),
            fmt(r.sharpe)
        );
    }

    Ok(records)
}

fn run_dca(config: &AppConfig, writer: &ResultsWriter, records: &[MetricsRecord]) -> Result<()> {
    let dca = &config.dca;
    println!(
        "Simulating ${}/month DCA into single ETFs ({} to {})...",
        dca.monthly, dca.start_age, dca.end_age
    );

    let returns = if dca.returns.is_empty() {
        dca_returns_from_metrics(records)
    } else {
        dca.returns.clone()
    };
    if returns.is_empty() {
        warn!("No DCA returns configured and no historical CAGRs available; pass --prices");
        return Ok(());
    }

    let runner = ScenarioRunner::with_defaults(config.projection);
    let paths = runner.dca_by_symbol(&returns, dca)?;
    writer.write_paths(&format!("dca_{}_single_etf.csv", dca.monthly), &paths)?;

    for p in &paths {
        println!(
            "  {:<6} {:>6.2}% -> ${:.0} at age {}",
            p.label,
            p.path.annual_rate * 100.0,
            p.path.final_balance(),
            dca.end_age
        );
    }

    Ok(())
}
