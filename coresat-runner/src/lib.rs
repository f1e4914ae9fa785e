//! Coresat Runner - run orchestration, price loading, metrics and export.
//!
//! This crate builds on `coresat-core` to provide:
//! - TOML run configuration with a content-hash run id
//! - CSV price loading with a synthetic fallback
//! - Performance metrics, buy-and-hold benchmark and annual breakdown
//! - JSON, CSV and Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{ConfigError, RunConfig, RunId, RunSection};
pub use data_loader::{
    load_pair, load_prices, write_price_csv, CsvProvider, LoadError, LoadOptions, LoadOutcome,
    LoadedData,
};
pub use metrics::{AnnualReturn, PerformanceMetrics, RunSummary, TradeStats};
pub use runner::{run_from_config, run_from_data, BacktestResult, RunError, SCHEMA_VERSION};
