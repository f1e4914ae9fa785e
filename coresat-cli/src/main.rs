//! Coresat CLI - run, config, and synthetic data commands.
//!
//! Commands:
//! - `run` - simulate a core/satellite run from a TOML config plus flag overrides
//! - `config` - print the default run configuration as TOML
//! - `generate` - write synthetic `<SYMBOL>.csv` price files usable by `run`

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use coresat_core::data::SyntheticProvider;
use coresat_core::domain::PriceSeries;
use coresat_core::{RebalanceInterval, RebalanceMode};
use coresat_runner::export::save_artifacts;
use coresat_runner::{run_from_config, write_price_csv, BacktestResult, RunConfig};

#[derive(Parser)]
#[command(
    name = "coresat",
    about = "Coresat CLI - core/satellite strategy simulator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and save its artifacts.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Core ticker (overrides the config).
        #[arg(long)]
        core: Option<String>,

        /// Satellite ticker (overrides the config).
        #[arg(long)]
        satellite: Option<String>,

        /// Directory holding `<SYMBOL>.csv` price files.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Capital-management regime: snowball or fixed-weight.
        #[arg(long)]
        mode: Option<String>,

        /// Rebalance interval: none, quarterly, semi-annual, annual.
        #[arg(long)]
        interval: Option<String>,

        /// Satellite leverage multiplier.
        #[arg(long)]
        leverage: Option<f64>,

        /// Generate prices instead of reading CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Print the default run configuration as TOML.
    Config,
    /// Write synthetic price CSVs.
    Generate {
        /// Symbols to generate (e.g., VOO QQQ).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 2015-01-01.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to 2024-12-31.
        #[arg(long)]
        end: Option<String>,

        /// Output directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        out: PathBuf,
    },
}

/// Flag overrides applied on top of the loaded configuration.
struct RunOverrides {
    core: Option<String>,
    satellite: Option<String>,
    data_dir: Option<PathBuf>,
    mode: Option<String>,
    interval: Option<String>,
    leverage: Option<f64>,
    synthetic: bool,
    start: Option<String>,
    end: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            core,
            satellite,
            data_dir,
            mode,
            interval,
            leverage,
            synthetic,
            start,
            end,
            output_dir,
        } => run_cmd(
            config,
            RunOverrides {
                core,
                satellite,
                data_dir,
                mode,
                interval,
                leverage,
                synthetic,
                start,
                end,
            },
            &output_dir,
        ),
        Commands::Config => run_config_cmd(),
        Commands::Generate {
            symbols,
            start,
            end,
            out,
        } => run_generate(&symbols, start, end, &out),
    }
}

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
    })
    .transpose()
}

fn build_config(config_path: Option<&Path>, overrides: RunOverrides) -> Result<RunConfig> {
    let mut config = match config_path {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(core) = overrides.core {
        config.run.core_symbol = core;
    }
    if let Some(satellite) = overrides.satellite {
        config.run.satellite_symbol = satellite;
    }
    if let Some(dir) = overrides.data_dir {
        config.run.data_dir = dir;
    }
    if overrides.synthetic {
        config.run.synthetic = true;
    }
    if let Some(start) = parse_date(overrides.start.as_deref())? {
        config.run.start = Some(start);
    }
    if let Some(end) = parse_date(overrides.end.as_deref())? {
        config.run.end = Some(end);
    }
    if let Some(mode) = overrides.mode {
        config.params.mode = mode.parse::<RebalanceMode>()?;
    }
    if let Some(interval) = overrides.interval {
        config.params.interval = interval.parse::<RebalanceInterval>()?;
    }
    if let Some(leverage) = overrides.leverage {
        config.params.leverage = leverage;
    }

    config.validate()?;
    Ok(config)
}

fn run_cmd(config_path: Option<PathBuf>, overrides: RunOverrides, output_dir: &Path) -> Result<()> {
    let config = build_config(config_path.as_deref(), overrides)?;
    let result = run_from_config(&config)?;

    if result.is_empty() {
        match &result.no_data {
            Some(reason) => println!("no data: {reason}"),
            None => println!("no data"),
        }
        return Ok(());
    }

    print_summary(&result);

    let run_dir = save_artifacts(&result, output_dir)?;
    tracing::info!(run_id = %result.run_id, dir = %run_dir.display(), "artifacts saved");
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn run_config_cmd() -> Result<()> {
    let toml = RunConfig::default().to_toml()?;
    print!("{toml}");
    Ok(())
}

fn run_generate(
    symbols: &[String],
    start: Option<String>,
    end: Option<String>,
    out: &Path,
) -> Result<()> {
    let provider = SyntheticProvider::default();
    let start = parse_date(start.as_deref())?.unwrap_or(provider.default_start);
    let end = parse_date(end.as_deref())?.unwrap_or(provider.default_end);
    if start > end {
        bail!("start date {start} is after end date {end}");
    }

    std::fs::create_dir_all(out)
        .with_context(|| format!("creating output directory {}", out.display()))?;

    for symbol in symbols {
        let series = PriceSeries::new(symbol, provider.generate(symbol, start, end))?;
        let path = out.join(format!("{symbol}.csv"));
        write_price_csv(&path, &series)?;
        println!("{symbol}: {} days -> {}", series.len(), path.display());
    }

    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let summary = result.summary();
    let params = &result.config.params;

    println!();
    println!("=== Core/Satellite Result ===");
    println!(
        "Tickers:        {} (core) / {} (satellite)",
        summary.core_symbol, summary.satellite_symbol
    );
    if let (Some(start), Some(end)) = (result.start_date, result.end_date) {
        println!("Period:         {start} to {end}");
    }
    println!(
        "Mode:           {} (rebalance {}, leverage {:.1}x)",
        params.mode, params.interval, params.leverage
    );
    println!("Final Equity:   {:.2}", summary.final_equity);
    println!();
    println!(
        "{:<16} {:>12} {:>12} {:>10}",
        "", "Strategy", "Buy & Hold", "Delta"
    );
    println!("{}", "-".repeat(53));
    println!(
        "{:<16} {:>11.2}% {:>11.2}% {:>9.2}%",
        "Total Return",
        summary.strategy.total_return * 100.0,
        summary.benchmark.total_return * 100.0,
        summary.excess_return() * 100.0
    );
    println!(
        "{:<16} {:>11.2}% {:>11.2}% {:>9.2}%",
        "CAGR",
        summary.strategy.cagr * 100.0,
        summary.benchmark.cagr * 100.0,
        (summary.strategy.cagr - summary.benchmark.cagr) * 100.0
    );
    println!(
        "{:<16} {:>11.2}% {:>11.2}% {:>9.2}%",
        "Max Drawdown",
        summary.strategy.max_drawdown * 100.0,
        summary.benchmark.max_drawdown * 100.0,
        summary.drawdown_delta() * 100.0
    );

    if !summary.recent_years.is_empty() {
        println!();
        println!("{:<6} {:>12} {:>12}", "Year", "Strategy", "Buy & Hold");
        for y in &summary.recent_years {
            println!(
                "{:<6} {:>11.2}% {:>11.2}%",
                y.year,
                y.strategy * 100.0,
                y.benchmark * 100.0
            );
        }
    }

    println!();
    println!(
        "Satellite:      {} batches closed, {:.1}% winners, net {:.2}",
        result.trade_stats.count,
        result.trade_stats.win_rate * 100.0,
        result.trade_stats.net_profit
    );
    println!(
        "Core:           {} installments, {:.2} bought ({:.2} reinvested), {} rebalances",
        result.simulation.installments_made,
        result.simulation.core_purchased,
        result.simulation.core_reinvested,
        result.simulation.rebalances.len()
    );
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    if result.simulation.drift_warnings > 0 {
        println!(
            "WARNING: {} days failed the cash conservation check",
            result.simulation.drift_warnings
        );
    }
}
