//! Run orchestration - wires together loading, the engine and metrics.
//!
//! Two entry points:
//! - `run_from_config()`: loads prices per the config, then runs. Used by the CLI.
//! - `run_from_data()`: takes pre-loaded prices. No I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coresat_core::{run_simulation, SimulationError, SimulationResult};

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::{load_prices, LoadError, LoadOptions, LoadOutcome, LoadedData};
use crate::metrics::{
    annual_breakdown, benchmark_equity, last_years, AnnualReturn, PerformanceMetrics, RunSummary,
    TradeStats, SUMMARY_YEARS,
};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Load(#[from] LoadError),
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: RunConfig,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    /// Set when the engine had nothing to simulate.
    pub no_data: Option<String>,
    pub simulation: SimulationResult,
    pub benchmark_equity: Vec<f64>,
    pub metrics: PerformanceMetrics,
    pub benchmark_metrics: PerformanceMetrics,
    pub annual_returns: Vec<AnnualReturn>,
    pub trade_stats: TradeStats,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    /// Empty result for a run with no usable prices.
    pub fn no_data(config: &RunConfig, reason: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: config.run_id(),
            config: config.clone(),
            start_date: None,
            end_date: None,
            dataset_hash: String::new(),
            has_synthetic: config.run.synthetic,
            no_data: Some(reason.into()),
            simulation: SimulationResult::empty(),
            benchmark_equity: Vec::new(),
            metrics: PerformanceMetrics::default(),
            benchmark_metrics: PerformanceMetrics::default(),
            annual_returns: Vec::new(),
            trade_stats: TradeStats::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.simulation.is_empty()
    }

    pub fn final_equity(&self) -> f64 {
        self.simulation.final_equity().unwrap_or(0.0)
    }

    /// Aggregate metrics and the recent-years breakdown only.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            core_symbol: self.config.run.core_symbol.clone(),
            satellite_symbol: self.config.run.satellite_symbol.clone(),
            final_equity: self.final_equity(),
            strategy: self.metrics,
            benchmark: self.benchmark_metrics,
            recent_years: last_years(&self.annual_returns, SUMMARY_YEARS),
        }
    }
}

/// Load prices as configured and run.
///
/// A missing ticker or an empty window is not an error: the result is empty
/// and carries the reason in `no_data`.
pub fn run_from_config(config: &RunConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let opts = LoadOptions {
        start: config.run.start,
        end: config.run.end,
        synthetic: config.run.synthetic,
    };
    match load_prices(
        &config.run.core_symbol,
        &config.run.satellite_symbol,
        &config.run.data_dir,
        &opts,
    )? {
        LoadOutcome::Loaded(loaded) => run_from_data(config, &loaded),
        LoadOutcome::NoData { reason } => Ok(BacktestResult::no_data(config, reason)),
    }
}

/// Run on pre-loaded prices - no I/O.
pub fn run_from_data(config: &RunConfig, loaded: &LoadedData) -> Result<BacktestResult, RunError> {
    let run_id = config.run_id();
    tracing::info!(%run_id, dataset = %loaded.dataset_hash, "run started");

    let simulation = run_simulation(&loaded.prices, &config.params)?;
    if simulation.is_empty() {
        let mut result = BacktestResult::no_data(config, "fewer than two aligned trading days");
        result.dataset_hash = loaded.dataset_hash.clone();
        result.has_synthetic = loaded.has_synthetic;
        return Ok(result);
    }

    // Records start at day 1; the benchmark uses the same dates
    let dates = simulation.dates();
    let equity = simulation.equity_curve();
    let core_on_record_dates = &loaded.prices.core()[1..];
    let benchmark = benchmark_equity(core_on_record_dates, config.params.initial_capital);

    let metrics = PerformanceMetrics::compute(&dates, &equity);
    let benchmark_metrics = PerformanceMetrics::compute(&dates, &benchmark);
    let annual_returns = annual_breakdown(&dates, &equity, &benchmark);
    let trade_stats = TradeStats::compute(&simulation.trades);

    if simulation.drift_warnings > 0 {
        tracing::warn!(
            days = simulation.drift_warnings,
            "cash conservation drift flagged; check input data"
        );
    }
    tracing::info!(
        total_return = metrics.total_return,
        cagr = metrics.cagr,
        max_drawdown = metrics.max_drawdown,
        benchmark_return = benchmark_metrics.total_return,
        "run finished"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        config: config.clone(),
        start_date: dates.first().copied(),
        end_date: dates.last().copied(),
        dataset_hash: loaded.dataset_hash.clone(),
        has_synthetic: loaded.has_synthetic,
        no_data: None,
        simulation,
        benchmark_equity: benchmark,
        metrics,
        benchmark_metrics,
        annual_returns,
        trade_stats,
    })
}
