//! Price loading for the runner.
//!
//! Resolves the core and satellite series from a provider and aligns them.
//! Fallback policy:
//! 1. `synthetic = true` → generate both series (tagged as synthetic)
//! 2. Otherwise read `<data_dir>/<SYMBOL>.csv`
//! 3. A missing or empty ticker yields "no data", not an error
//!
//! Malformed files (bad header, unparseable rows, non-positive closes,
//! unsorted dates) are errors.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coresat_core::data::{
    align_pair, AlignedPrices, DataError, DataSource, PriceProvider, SyntheticProvider,
};
use coresat_core::domain::{PricePoint, PriceSeries};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Options controlling how prices are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Generate prices instead of reading files.
    pub synthetic: bool,
}

/// Aligned prices plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub prices: AlignedPrices,
    pub source: DataSource,
    /// BLAKE3 over symbols, dates and closes.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Outcome of a load: data, or the reason there is none.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(LoadedData),
    NoData { reason: String },
}

// ─── CSV provider ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    #[serde(alias = "adj_close", alias = "Close", alias = "Adj Close")]
    close: f64,
}

#[derive(Debug, Serialize)]
struct CsvRowOut {
    date: NaiveDate,
    close: f64,
}

/// Reads `<dir>/<SYMBOL>.csv` files with a `date,close` header.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl PriceProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> DataSource {
        DataSource::Csv
    }

    fn fetch(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| DataError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut points = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| DataError::Malformed {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;
            points.push(PricePoint::new(row.date, row.close));
        }

        Ok(PriceSeries::new(symbol, points)?.slice(start, end))
    }
}

/// Write a series as a `date,close` CSV file readable by `CsvProvider`.
pub fn write_price_csv(path: &Path, series: &PriceSeries) -> Result<(), LoadError> {
    let write_err = |reason: String| LoadError::Write {
        path: path.to_path_buf(),
        reason,
    };
    let mut writer = csv::Writer::from_path(path).map_err(|e| write_err(e.to_string()))?;
    for p in series.points() {
        writer
            .serialize(CsvRowOut {
                date: p.date,
                close: p.close,
            })
            .map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))?;
    Ok(())
}

// ─── Loading ────────────────────────────────────────────────────────

/// Load and align a core/satellite pair from `provider`.
pub fn load_pair(
    core_symbol: &str,
    satellite_symbol: &str,
    provider: &dyn PriceProvider,
    opts: &LoadOptions,
) -> Result<LoadOutcome, LoadError> {
    let mut series = Vec::with_capacity(2);
    for symbol in [core_symbol, satellite_symbol] {
        match provider.fetch(symbol, opts.start, opts.end) {
            Ok(s) if s.is_empty() => {
                tracing::warn!(symbol, provider = provider.name(), "no prices in range");
                return Ok(LoadOutcome::NoData {
                    reason: format!("no prices for {symbol} in the requested range"),
                });
            }
            Ok(s) => series.push(s),
            Err(DataError::SymbolNotFound { symbol }) => {
                tracing::warn!(%symbol, provider = provider.name(), "ticker not found");
                return Ok(LoadOutcome::NoData {
                    reason: format!("ticker {symbol} not found"),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    let prices = align_pair(&series[0], &series[1]);
    if prices.is_empty() {
        tracing::warn!(core_symbol, satellite_symbol, "tickers share no trading dates");
        return Ok(LoadOutcome::NoData {
            reason: format!("{core_symbol} and {satellite_symbol} share no trading dates"),
        });
    }

    let source = provider.source();
    tracing::info!(
        core = core_symbol,
        satellite = satellite_symbol,
        provider = provider.name(),
        days = prices.len(),
        "prices loaded"
    );
    Ok(LoadOutcome::Loaded(LoadedData {
        dataset_hash: prices.dataset_hash(),
        has_synthetic: source == DataSource::Synthetic,
        source,
        prices,
    }))
}

/// Load a pair using the options' fallback policy: synthetic prices when
/// requested, otherwise CSV files under `data_dir`.
pub fn load_prices(
    core_symbol: &str,
    satellite_symbol: &str,
    data_dir: &Path,
    opts: &LoadOptions,
) -> Result<LoadOutcome, LoadError> {
    if opts.synthetic {
        tracing::warn!("generating synthetic prices; results will be tagged as synthetic");
        load_pair(core_symbol, satellite_symbol, &SyntheticProvider::default(), opts)
    } else {
        load_pair(core_symbol, satellite_symbol, &CsvProvider::new(data_dir), opts)
    }
}
